//! Falling-piece state machine
//!
//! A pure reducer over the board-plus-piece record. The game controller
//! is the only caller; it replaces its held state with each result.

use crate::board::{Board, BOARD_HEIGHT};
use crate::tetromino::{BlockKind, Shape};

/// Anchor where every fresh piece appears
pub const SPAWN_ROW: i32 = 0;
pub const SPAWN_COLUMN: i32 = 3;

/// Authoritative board plus the active falling piece
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub board: Board,
    pub dropping_row: i32,
    pub dropping_column: i32,
    pub dropping_kind: BlockKind,
    pub dropping_shape: Shape,
}

/// Transitions applied by the controller
#[derive(Debug, Clone)]
pub enum BoardAction {
    /// Discard everything and spawn `kind` over a fresh empty board
    Start { kind: BlockKind },
    /// Advance the piece one row.
    ///
    /// The caller must already have verified there is no collision one
    /// row below; the reducer does not re-check.
    Drop,
    /// Install the caller-computed post-clear board and spawn `kind`
    Commit { board: Board, kind: BlockKind },
    /// Nudge and/or rotate the piece; silently rejected on collision
    Move {
        rotate: bool,
        left: bool,
        right: bool,
    },
}

impl BoardState {
    /// Initial state before any session has started
    pub fn new() -> Self {
        Self::spawn(Board::empty(BOARD_HEIGHT), BlockKind::I)
    }

    /// `kind` at the spawn anchor over `board`
    fn spawn(board: Board, kind: BlockKind) -> Self {
        Self {
            board,
            dropping_row: SPAWN_ROW,
            dropping_column: SPAWN_COLUMN,
            dropping_kind: kind,
            dropping_shape: kind.base_shape(),
        }
    }

    /// Apply one action, yielding the next state
    pub fn reduce(&self, action: BoardAction) -> BoardState {
        match action {
            BoardAction::Start { kind } => Self::spawn(Board::empty(BOARD_HEIGHT), kind),
            BoardAction::Drop => BoardState {
                dropping_row: self.dropping_row + 1,
                ..self.clone()
            },
            BoardAction::Commit { mut board, kind } => {
                board.pad_to_height(BOARD_HEIGHT);
                Self::spawn(board, kind)
            }
            BoardAction::Move {
                rotate,
                left,
                right,
            } => {
                let shape = if rotate {
                    self.dropping_shape.rotate_cw()
                } else {
                    self.dropping_shape.clone()
                };
                // Sequential overwrite: right wins when both are held
                let mut offset = 0;
                if left {
                    offset = -1;
                }
                if right {
                    offset = 1;
                }
                let column = self.dropping_column + offset;
                if self.board.has_collision(&shape, self.dropping_row, column) {
                    self.clone()
                } else {
                    BoardState {
                        dropping_column: column,
                        dropping_shape: shape,
                        ..self.clone()
                    }
                }
            }
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn test_start_resets_everything() {
        let mut state = BoardState::new();
        state = state.reduce(BoardAction::Drop);
        state = state.reduce(BoardAction::Drop);

        let state = state.reduce(BoardAction::Start {
            kind: BlockKind::T,
        });
        assert_eq!(state.dropping_row, SPAWN_ROW);
        assert_eq!(state.dropping_column, SPAWN_COLUMN);
        assert_eq!(state.dropping_kind, BlockKind::T);
        assert_eq!(state.dropping_shape, BlockKind::T.base_shape());
        assert_eq!(state.board, Board::empty(BOARD_HEIGHT));
    }

    #[test]
    fn test_drop_increments_row() {
        let state = BoardState::new();
        let dropped = state.reduce(BoardAction::Drop);
        assert_eq!(dropped.dropping_row, state.dropping_row + 1);
        assert_eq!(dropped.dropping_column, state.dropping_column);
    }

    #[test]
    fn test_move_left_and_right() {
        let state = BoardState::new();
        let left = state.reduce(BoardAction::Move {
            rotate: false,
            left: true,
            right: false,
        });
        assert_eq!(left.dropping_column, SPAWN_COLUMN - 1);

        let right = state.reduce(BoardAction::Move {
            rotate: false,
            left: false,
            right: true,
        });
        assert_eq!(right.dropping_column, SPAWN_COLUMN + 1);
    }

    #[test]
    fn test_right_wins_when_both_directions_held() {
        let state = BoardState::new();
        let moved = state.reduce(BoardAction::Move {
            rotate: false,
            left: true,
            right: true,
        });
        assert_eq!(moved.dropping_column, SPAWN_COLUMN + 1);
    }

    #[test]
    fn test_rotate_replaces_shape() {
        let state = BoardState::new();
        let rotated = state.reduce(BoardAction::Move {
            rotate: true,
            left: false,
            right: false,
        });
        assert_eq!(rotated.dropping_shape, state.dropping_shape.rotate_cw());
        assert_eq!(rotated.dropping_column, state.dropping_column);
    }

    #[test]
    fn test_rejected_move_leaves_state_unchanged() {
        // Walk the piece into the left wall, then push once more
        let mut state = BoardState::new();
        for _ in 0..SPAWN_COLUMN {
            state = state.reduce(BoardAction::Move {
                rotate: false,
                left: true,
                right: false,
            });
        }
        assert_eq!(state.dropping_column, 0);

        let rejected = state.reduce(BoardAction::Move {
            rotate: false,
            left: true,
            right: false,
        });
        assert_eq!(rejected, state);
    }

    #[test]
    fn test_blocked_rotation_is_a_no_op() {
        // A flat bar resting on the floor cannot stand upright: the
        // rotated footprint reaches three rows past the bottom
        let state = BoardState {
            board: Board::empty(BOARD_HEIGHT),
            dropping_row: (BOARD_HEIGHT - 1) as i32,
            dropping_column: 3,
            dropping_kind: BlockKind::I,
            dropping_shape: BlockKind::I.base_shape(),
        };
        let after = state.reduce(BoardAction::Move {
            rotate: true,
            left: false,
            right: false,
        });
        assert_eq!(after, state);
    }

    #[test]
    fn test_commit_installs_board_and_spawns() {
        let mut cleared = Board::empty(BOARD_HEIGHT);
        cleared.place_shape(BlockKind::L, &BlockKind::L.base_shape(), 21, 5);

        let state = BoardState::new().reduce(BoardAction::Drop);
        let committed = state.reduce(BoardAction::Commit {
            board: cleared.clone(),
            kind: BlockKind::S,
        });
        assert_eq!(committed.board, cleared);
        assert_eq!(committed.dropping_row, SPAWN_ROW);
        assert_eq!(committed.dropping_column, SPAWN_COLUMN);
        assert_eq!(committed.dropping_kind, BlockKind::S);
        assert_eq!(committed.dropping_shape, BlockKind::S.base_shape());
    }

    #[test]
    fn test_commit_pads_short_board_to_full_height() {
        let short = Board::empty(BOARD_HEIGHT - 3);
        let committed = BoardState::new().reduce(BoardAction::Commit {
            board: short,
            kind: BlockKind::Z,
        });
        assert_eq!(committed.board.height(), BOARD_HEIGHT);
        assert!(committed.board.rows()[0].iter().all(Cell::is_empty));
    }
}
