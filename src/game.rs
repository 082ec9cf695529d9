//! Game controller: gravity, input sequencing, scoring, piece queue

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::board::Cell;
use crate::state::{BoardAction, BoardState, SPAWN_COLUMN, SPAWN_ROW};
use crate::tetromino::{random_kind, BlockKind};
use crate::timer::IntervalTimer;

/// Upcoming-piece queue length, constant during play
pub const UPCOMING_LEN: usize = 3;

/// Cadence of the horizontal move repeat, independent of gravity
const MOVE_REPEAT_PERIOD: Duration = Duration::from_millis(100);

/// Gravity cadences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSpeed {
    /// Regular falling
    Normal,
    /// Fast re-checks while a piece rests on an obstruction, so a nudge
    /// can still free it before it locks
    Sliding,
    /// Soft drop while the down key is held
    Fast,
}

impl TickSpeed {
    pub fn period(&self) -> Duration {
        match self {
            TickSpeed::Normal => Duration::from_millis(800),
            TickSpeed::Sliding => Duration::from_millis(100),
            TickSpeed::Fast => Duration::from_millis(50),
        }
    }
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No session yet; only `start` leaves this
    #[default]
    Idle,
    /// The piece descends one row per gravity tick
    Falling,
    /// The piece rests on an obstruction; the next tick either frees it
    /// or commits it
    Locking,
    /// Spawn position was occupied; terminal until the next `start`
    GameOver,
}

/// Keys the controller understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKey {
    Left,
    Right,
    SoftDrop,
    Rotate,
}

/// Press/release messages from the input adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Press(GameKey),
    Release(GameKey),
}

/// Direction keys currently held
#[derive(Debug, Clone, Copy, Default)]
struct HeldKeys {
    left: bool,
    right: bool,
    down: bool,
}

/// Read-only view for the presentation layer, recomputed per call
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Deep copy of the board with the falling piece stamped on top
    /// (only while playing)
    pub board: Vec<Vec<Cell>>,
    pub is_playing: bool,
    pub score: u32,
    /// Front first: index 0 is the most recently generated kind; the
    /// back is the next to spawn
    pub upcoming: Vec<BlockKind>,
}

/// The game controller
pub struct Game {
    state: BoardState,
    phase: Phase,
    score: u32,
    upcoming: VecDeque<BlockKind>,
    speed: TickSpeed,
    gravity: IntervalTimer,
    move_repeat: IntervalTimer,
    held: HeldKeys,
    rng: ChaCha8Rng,
}

impl Game {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a game with a fixed RNG seed (deterministic piece order)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: BoardState::new(),
            phase: Phase::Idle,
            score: 0,
            upcoming: VecDeque::with_capacity(UPCOMING_LEN),
            speed: TickSpeed::Normal,
            gravity: IntervalTimer::stopped(TickSpeed::Normal.period()),
            move_repeat: IntervalTimer::stopped(MOVE_REPEAT_PERIOD),
            held: HeldKeys::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Falling | Phase::Locking)
    }

    /// Begin a session, discarding any previous one
    pub fn start(&mut self, now: Instant) {
        self.score = 0;
        self.upcoming.clear();
        for _ in 0..UPCOMING_LEN {
            let kind = random_kind(&mut self.rng);
            self.upcoming.push_back(kind);
        }
        self.held = HeldKeys::default();
        self.move_repeat.stop();
        self.set_speed(TickSpeed::Normal, now);

        let kind = random_kind(&mut self.rng);
        self.state = self.state.reduce(BoardAction::Start { kind });
        self.phase = Phase::Falling;
        tracing::info!(?kind, "session started");
    }

    /// Advance the clocks; call once per frame
    pub fn update(&mut self, now: Instant) {
        if !self.is_playing() {
            return;
        }
        if self.move_repeat.poll(now) {
            self.dispatch_horizontal();
        }
        if self.gravity.poll(now) {
            self.gravity_tick(now);
        }
    }

    /// Apply a press/release message; ignored outside of play
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        if !self.is_playing() {
            return;
        }
        match event {
            InputEvent::Press(GameKey::SoftDrop) => {
                if !self.held.down {
                    self.held.down = true;
                    self.set_speed(TickSpeed::Fast, now);
                }
            }
            InputEvent::Release(GameKey::SoftDrop) => {
                if self.held.down {
                    self.held.down = false;
                    self.set_speed(TickSpeed::Normal, now);
                }
            }
            InputEvent::Press(GameKey::Rotate) => {
                self.state = self.state.reduce(BoardAction::Move {
                    rotate: true,
                    left: false,
                    right: false,
                });
            }
            InputEvent::Release(GameKey::Rotate) => {}
            InputEvent::Press(GameKey::Left) => {
                if !self.held.left {
                    self.held.left = true;
                    self.restart_move_repeat(now);
                }
            }
            InputEvent::Release(GameKey::Left) => {
                self.held.left = false;
                self.restart_move_repeat(now);
            }
            InputEvent::Press(GameKey::Right) => {
                if !self.held.right {
                    self.held.right = true;
                    self.restart_move_repeat(now);
                }
            }
            InputEvent::Release(GameKey::Right) => {
                self.held.right = false;
                self.restart_move_repeat(now);
            }
        }
    }

    /// Produce the render view: authoritative board plus the in-flight
    /// piece. The authoritative board itself never contains the piece.
    pub fn snapshot(&self) -> Snapshot {
        let mut board = self.state.board.clone();
        if self.is_playing() {
            board.place_shape(
                self.state.dropping_kind,
                &self.state.dropping_shape,
                self.state.dropping_row,
                self.state.dropping_column,
            );
        }
        Snapshot {
            board: board.rows().to_vec(),
            is_playing: self.is_playing(),
            score: self.score,
            upcoming: self.upcoming.iter().copied().collect(),
        }
    }

    /// One gravity tick
    fn gravity_tick(&mut self, now: Instant) {
        match self.phase {
            Phase::Falling => {
                if self.collides_below() {
                    self.phase = Phase::Locking;
                    self.set_speed(TickSpeed::Sliding, now);
                } else {
                    self.state = self.state.reduce(BoardAction::Drop);
                }
            }
            Phase::Locking => self.commit_position(now),
            Phase::Idle | Phase::GameOver => {}
        }
    }

    /// Lock-or-release decision, then the commit itself
    fn commit_position(&mut self, now: Instant) {
        if !self.collides_below() {
            // A nudge freed the piece; resume falling
            self.phase = Phase::Falling;
            self.set_speed(TickSpeed::Normal, now);
            return;
        }

        let mut board = self.state.board.clone();
        board.place_shape(
            self.state.dropping_kind,
            &self.state.dropping_shape,
            self.state.dropping_row,
            self.state.dropping_column,
        );
        let cleared = board.clear_full_rows();
        self.score += clear_points(cleared);
        if cleared > 0 {
            tracing::debug!(cleared, score = self.score, "rows cleared");
        }

        let next = self
            .upcoming
            .pop_back()
            .expect("upcoming queue is never empty during play");
        let fresh = random_kind(&mut self.rng);
        self.upcoming.push_front(fresh);

        if board.has_collision(&next.base_shape(), SPAWN_ROW, SPAWN_COLUMN) {
            self.phase = Phase::GameOver;
            self.gravity.stop();
            self.move_repeat.stop();
            self.held = HeldKeys::default();
            self.speed = TickSpeed::Normal;
            tracing::info!(score = self.score, "game over");
        } else {
            self.phase = Phase::Falling;
            self.set_speed(TickSpeed::Normal, now);
        }

        self.state = self.state.reduce(BoardAction::Commit { board, kind: next });
    }

    fn collides_below(&self) -> bool {
        self.state.board.has_collision(
            &self.state.dropping_shape,
            self.state.dropping_row + 1,
            self.state.dropping_column,
        )
    }

    /// Swap the gravity cadence; the clock is always re-armed so the old
    /// deadline cannot fire.
    fn set_speed(&mut self, speed: TickSpeed, now: Instant) {
        self.speed = speed;
        self.gravity.restart(self.speed.period(), now);
    }

    /// Immediate move plus a restarted repeat clock, mirroring the
    /// press/release protocol for the direction keys.
    fn restart_move_repeat(&mut self, now: Instant) {
        self.dispatch_horizontal();
        self.move_repeat.restart(MOVE_REPEAT_PERIOD, now);
    }

    fn dispatch_horizontal(&mut self) {
        self.state = self.state.reduce(BoardAction::Move {
            rotate: false,
            left: self.held.left,
            right: self.held.right,
        });
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Points for clearing `rows` rows in one commit
fn clear_points(rows: usize) -> u32 {
    match rows {
        0 => 0,
        1 => 100,
        2 => 300,
        3 => 500,
        4 => 800,
        _ => panic!("cleared {rows} rows in a single commit"),
    }
}
