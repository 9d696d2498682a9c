// bingo/src/evaluator.rs
// Win detection: decides whether a card is complete under the game's win mode.
//
// Everything here is a pure function over snapshots. Two cards may both be
// reported complete on the same draw; picking the single winner is done by
// the store's conditional claim (see `game::GameStore::set_winner_if_none`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::defs::{FREE_CELL, GRID_SIZE, Number, column_letter};
use crate::drawn::DrawnSet;
use crate::error::BingoError;
use crate::marks::MarkedSet;
use crate::ranker::{NearWinnerStrategy, near_signal};

/// Which pattern wins a game. Stored per game, never guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinMode {
    /// Any complete row, column or diagonal.
    Line,
    /// Every cell of the card.
    #[default]
    Full,
}

impl FromStr for WinMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(WinMode::Line),
            "full" => Ok(WinMode::Full),
            other => Err(format!("unknown win mode '{other}', expected 'line' or 'full'")),
        }
    }
}

impl fmt::Display for WinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinMode::Line => write!(f, "line"),
            WinMode::Full => write!(f, "full"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Line {
    Row(usize),
    Column(usize),
    MainDiagonal,
    AntiDiagonal,
}

impl Line {
    pub const ALL: [Line; 2 * GRID_SIZE + 2] = [
        Line::Row(0),
        Line::Row(1),
        Line::Row(2),
        Line::Row(3),
        Line::Row(4),
        Line::Column(0),
        Line::Column(1),
        Line::Column(2),
        Line::Column(3),
        Line::Column(4),
        Line::MainDiagonal,
        Line::AntiDiagonal,
    ];

    /// Coordinates (row, col) of the five cells on this line.
    pub fn cells(self) -> [(usize, usize); GRID_SIZE] {
        std::array::from_fn(|i| match self {
            Line::Row(r) => (r, i),
            Line::Column(c) => (i, c),
            Line::MainDiagonal => (i, i),
            Line::AntiDiagonal => (i, GRID_SIZE - 1 - i),
        })
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Row(r) => write!(f, "row {}", r + 1),
            Line::Column(c) => write!(f, "column {}", column_letter(*c)),
            Line::MainDiagonal => write!(f, "main diagonal"),
            Line::AntiDiagonal => write!(f, "anti diagonal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    NotClose,
    Near { missing: Vec<Number> },
    Complete,
}

impl Verdict {
    pub fn is_complete(&self) -> bool {
        matches!(self, Verdict::Complete)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NotClose => write!(f, "not close"),
            Verdict::Near { missing } => {
                let list: Vec<String> = missing.iter().map(Number::to_string).collect();
                write!(f, "near (missing {})", list.join(", "))
            }
            Verdict::Complete => write!(f, "BINGO"),
        }
    }
}

/// Per-game evaluation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub mode: WinMode,
    pub threshold: usize,
    pub strategy: NearWinnerStrategy,
}

impl Rules {
    pub fn new(mode: WinMode, threshold: usize, strategy: NearWinnerStrategy) -> Result<Self, BingoError> {
        if threshold == 0 {
            return Err(BingoError::InvalidThreshold);
        }
        Ok(Rules { mode, threshold, strategy })
    }
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            mode: WinMode::default(),
            threshold: 3,
            strategy: NearWinnerStrategy::default(),
        }
    }
}

fn pattern_complete<F>(card: &Card, mode: WinMode, covered: F) -> bool
where
    F: Fn(Number) -> bool,
{
    let satisfied = |(row, col): (usize, usize)| {
        let value = card.cell(row, col);
        value == FREE_CELL || covered(value)
    };

    match mode {
        WinMode::Line => Line::ALL
            .iter()
            .any(|line| line.cells().into_iter().all(|cell| satisfied(cell))),
        WinMode::Full => (0..GRID_SIZE)
            .all(|row| (0..GRID_SIZE).all(|col| satisfied((row, col)))),
    }
}

/// Administrator's view: a cell counts once its number has been drawn.
pub fn evaluate(card: &Card, drawn: &DrawnSet, mode: WinMode) -> Verdict {
    if pattern_complete(card, mode, |n| drawn.contains(n)) {
        Verdict::Complete
    } else {
        Verdict::NotClose
    }
}

/// Player's claim: a cell counts only when drawn and marked by the player.
pub fn evaluate_claim(card: &Card, marked: &MarkedSet, drawn: &DrawnSet, mode: WinMode) -> Verdict {
    if pattern_complete(card, mode, |n| drawn.contains(n) && marked.contains(n)) {
        Verdict::Complete
    } else {
        Verdict::NotClose
    }
}

/// Every line fully covered by drawn numbers.
pub fn winning_lines(card: &Card, drawn: &DrawnSet) -> Vec<Line> {
    Line::ALL
        .into_iter()
        .filter(|line| {
            line.cells().into_iter().all(|(row, col)| {
                let value = card.cell(row, col);
                value == FREE_CELL || drawn.contains(value)
            })
        })
        .collect()
}

/// Full three-way verdict for one card under `rules`.
pub fn classify(card: &Card, marked: &MarkedSet, drawn: &DrawnSet, rules: &Rules) -> Verdict {
    if evaluate(card, drawn, rules.mode).is_complete() {
        return Verdict::Complete;
    }
    match near_signal(card, marked, drawn, rules) {
        Some(near) => Verdict::Near { missing: near.missing },
        None => Verdict::NotClose,
    }
}
