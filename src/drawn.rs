// bingo/src/drawn.rs
// The append-only history of numbers called in a game.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::defs::{FIRSTNUMBER, LASTNUMBER, Number, TOTALNUMBERS};
use crate::error::BingoError;

/// Numbers drawn so far, in draw order. It only grows; a reset replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Number>", into = "Vec<Number>")]
pub struct DrawnSet {
    history: Vec<Number>,
    index: HashSet<Number>,
}

impl DrawnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted draw history, rejecting anything a real draw
    /// could not have produced.
    pub fn from_numbers<I: IntoIterator<Item = Number>>(numbers: I) -> Result<Self, BingoError> {
        let mut drawn = Self::new();
        for number in numbers {
            drawn.push(number)?;
        }
        Ok(drawn)
    }

    pub fn push(&mut self, number: Number) -> Result<(), BingoError> {
        if !(FIRSTNUMBER..=LASTNUMBER).contains(&number) {
            return Err(BingoError::NumberOutOfRange(number));
        }
        if !self.index.insert(number) {
            return Err(BingoError::DuplicateDraw(number));
        }
        self.history.push(number);
        Ok(())
    }

    pub fn contains(&self, number: Number) -> bool {
        self.index.contains(&number)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// True once all 75 numbers have been called.
    pub fn is_complete(&self) -> bool {
        self.history.len() == TOTALNUMBERS
    }

    pub fn last(&self) -> Option<Number> {
        self.history.last().copied()
    }

    pub fn history(&self) -> &[Number] {
        &self.history
    }

    /// Up to `n` numbers called before the last one, most recent first.
    pub fn recent(&self, n: usize) -> Vec<Number> {
        if self.history.len() <= 1 {
            return Vec::new();
        }
        let previous = &self.history[..self.history.len() - 1];
        previous.iter().rev().take(n).copied().collect()
    }

    pub fn sorted(&self) -> Vec<Number> {
        let mut numbers = self.history.clone();
        numbers.sort_unstable();
        numbers
    }
}

impl TryFrom<Vec<Number>> for DrawnSet {
    type Error = BingoError;

    fn try_from(numbers: Vec<Number>) -> Result<Self, Self::Error> {
        DrawnSet::from_numbers(numbers)
    }
}

impl From<DrawnSet> for Vec<Number> {
    fn from(drawn: DrawnSet) -> Self {
        drawn.history
    }
}
