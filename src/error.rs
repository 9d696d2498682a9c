// bingo/src/error.rs
// Error taxonomy for the bingo rules engine and its in-memory game shell.

use std::fmt;

use thiserror::Error;

use crate::defs::Number;

/// What is wrong with a card handed to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardDefect {
    WrongRowCount(usize),
    WrongRowLength { row: usize, len: usize },
    FreeCellMissing,
    FreeCellMisplaced { row: usize, col: usize },
    OutOfBand { row: usize, col: usize, value: Number },
    DuplicateNumber(Number),
}

impl fmt::Display for CardDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardDefect::WrongRowCount(n) => write!(f, "expected 5 rows, found {n}"),
            CardDefect::WrongRowLength { row, len } => {
                write!(f, "row {row} has {len} cells, expected 5")
            }
            CardDefect::FreeCellMissing => write!(f, "free cell missing at (2,2)"),
            CardDefect::FreeCellMisplaced { row, col } => {
                write!(f, "free cell found at ({row},{col}), only (2,2) may be free")
            }
            CardDefect::OutOfBand { row, col, value } => {
                write!(f, "value {value} at ({row},{col}) is outside its column band")
            }
            CardDefect::DuplicateNumber(n) => write!(f, "number {n} appears more than once"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkRejection {
    NotOnCard,
    NotDrawn,
}

impl fmt::Display for MarkRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkRejection::NotOnCard => write!(f, "not on the card"),
            MarkRejection::NotDrawn => write!(f, "not drawn yet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BingoError {
    #[error("malformed card: {0}")]
    MalformedCard(CardDefect),

    #[error("cannot mark {number}: {reason}")]
    InvalidMark { number: Number, reason: MarkRejection },

    #[error("number {0} is outside the 1-75 range")]
    NumberOutOfRange(Number),

    #[error("number {0} has already been drawn")]
    DuplicateDraw(Number),

    #[error("all numbers have been drawn")]
    PouchEmpty,

    #[error("game has already started, joining is closed")]
    GameAlreadyStarted,

    #[error("game is not in progress")]
    GameNotInProgress,

    #[error("player '{0}' has no card in this game")]
    UnknownPlayer(String),

    #[error("near-winner threshold must be at least 1")]
    InvalidThreshold,

    #[error("failed to acquire {0} lock")]
    LockPoisoned(&'static str),
}
