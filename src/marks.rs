// bingo/src/marks.rs
// Tracking which numbers a player has covered on a card.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::defs::Number;
use crate::drawn::DrawnSet;
use crate::error::{BingoError, MarkRejection};

/// Numbers a player has flagged on their card, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkedSet(BTreeSet<Number>);

impl MarkedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, number: Number) -> bool {
        self.0.contains(&number)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Number> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Number> for MarkedSet {
    fn from_iter<I: IntoIterator<Item = Number>>(iter: I) -> Self {
        MarkedSet(iter.into_iter().collect())
    }
}

/// Why `number` may not be marked on `card`, if anything.
pub fn mark_rejection(card: &Card, drawn: &DrawnSet, number: Number) -> Option<MarkRejection> {
    if !card.contains(number) {
        Some(MarkRejection::NotOnCard)
    } else if !drawn.contains(number) {
        Some(MarkRejection::NotDrawn)
    } else {
        None
    }
}

pub fn can_mark(card: &Card, drawn: &DrawnSet, number: Number) -> bool {
    mark_rejection(card, drawn, number).is_none()
}

/// Flip `number` in a copy of `marked`. No validation happens here.
pub fn toggle_mark(marked: &MarkedSet, number: Number) -> MarkedSet {
    let mut next = marked.0.clone();
    if !next.remove(&number) {
        next.insert(number);
    }
    MarkedSet(next)
}

/// Validated toggle: rejects numbers that are off the card or not yet drawn
/// and leaves `marked` untouched in that case.
pub fn apply_mark(
    card: &Card,
    drawn: &DrawnSet,
    marked: &MarkedSet,
    number: Number,
) -> Result<MarkedSet, BingoError> {
    match mark_rejection(card, drawn, number) {
        Some(reason) => Err(BingoError::InvalidMark { number, reason }),
        None => Ok(toggle_mark(marked, number)),
    }
}
