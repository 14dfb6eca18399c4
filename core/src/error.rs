//! Error types for building games and parsing actions.
//!
//! Playing a game never fails: moves, spawns and queries are total over
//! on-board coordinates and the four actions. Errors only arise when a caller
//! hands in a configuration or a position that breaks the board invariants.

/// Smallest supported board side.
pub const MIN_BOARD_SIZE: usize = 2;
/// Largest supported board side.
pub const MAX_BOARD_SIZE: usize = 16;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(
        "board size {0} is outside the supported range {min}..={max}",
        min = MIN_BOARD_SIZE,
        max = MAX_BOARD_SIZE
    )]
    InvalidBoardSize(usize),
    #[error("expected {expected} tiles for the board, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile value {value} at index {index} is not 0 or a power of two >= 2")]
    InvalidTileValue { index: usize, value: u32 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown action '{0}' (expected one of U, D, L, R or up, down, left, right)")]
pub struct ParseActionError(pub String);
