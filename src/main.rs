//! BLOCKFALL - a terminal falling-block puzzle

mod board;
mod game;
mod input;
mod settings;
mod state;
mod tetromino;
mod timer;
mod ui;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::{Game, Phase};
use input::InputHandler;
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

fn main() -> io::Result<()> {
    // Setup tracing to a log file (the terminal is busy drawing)
    let log_dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::never(&log_dir, "blockfall.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!("blockfall starting up, log={}", log_dir.join("blockfall.log").display());

    let settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run app and capture result
    let result = run_app(&mut terminal, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    // Write the settings file so the bindings are discoverable
    if let Err(e) = settings.save() {
        eprintln!("Warning: could not save settings: {}", e);
    }

    if let Ok(Some(score)) = &result {
        println!("Thanks for playing! Final score: {}", score);
    }

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
) -> io::Result<Option<u32>> {
    let mut game = Game::new();
    let mut input = InputHandler::from_settings(settings);

    loop {
        let snapshot = game.snapshot();
        terminal.draw(|frame| ui::render(frame, &snapshot, game.phase(), settings))?;

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                let now = Instant::now();
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        // Ctrl+C always quits
                        if key.modifiers.contains(KeyModifiers::CONTROL)
                            && key.code == KeyCode::Char('c')
                        {
                            return Ok(final_score(&game));
                        }

                        if snapshot.is_playing {
                            if input.is_quit(key.code) {
                                return Ok(final_score(&game));
                            }
                            for ev in input.key_down(key, now) {
                                game.handle_input(ev, now);
                            }
                        } else {
                            match key.code {
                                KeyCode::Enter => {
                                    input.clear();
                                    game.start(now);
                                }
                                KeyCode::Char('q') | KeyCode::Esc => {
                                    return Ok(final_score(&game));
                                }
                                _ => {}
                            }
                        }
                    }
                    KeyEventKind::Release => {
                        for ev in input.key_up(key) {
                            game.handle_input(ev, now);
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        for ev in input.update(now) {
            game.handle_input(ev, now);
        }
        game.update(now);
    }
}

/// Score to report on exit; None if no session was ever started
fn final_score(game: &Game) -> Option<u32> {
    match game.phase() {
        Phase::Idle => None,
        _ => Some(game.score()),
    }
}
