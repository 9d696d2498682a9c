// bingo/src/ranker.rs
// Near-winner detection. The default metric is marking lag: numbers that are
// on the card and already drawn but that the player has not covered yet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::defs::{FREE_CELL, Number};
use crate::drawn::DrawnSet;
use crate::evaluator::{Line, Rules, WinMode, evaluate};
use crate::marks::MarkedSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearWinnerStrategy {
    /// Drawn but unmarked numbers on the card.
    #[default]
    MarkingLag,
    /// Undrawn numbers still needed to finish the closest pattern.
    Structural,
}

impl FromStr for NearWinnerStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "marking_lag" | "marking-lag" | "lag" => Ok(NearWinnerStrategy::MarkingLag),
            "structural" => Ok(NearWinnerStrategy::Structural),
            other => Err(format!(
                "unknown near-winner strategy '{other}', expected 'marking_lag' or 'structural'"
            )),
        }
    }
}

impl fmt::Display for NearWinnerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NearWinnerStrategy::MarkingLag => write!(f, "marking_lag"),
            NearWinnerStrategy::Structural => write!(f, "structural"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearWinner {
    pub missing: Vec<Number>,
}

/// A player's card as seen at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCard {
    pub player: String,
    pub card: Card,
    pub marked: MarkedSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearWinnerReport {
    pub player: String,
    pub card_id: String,
    pub missing: Vec<Number>,
}

fn within_threshold(mut missing: Vec<Number>, threshold: usize) -> Option<NearWinner> {
    if missing.is_empty() || missing.len() > threshold {
        return None;
    }
    missing.sort_unstable();
    Some(NearWinner { missing })
}

/// Marking-lag signal: `drawn ∩ card \ marked`, reported when it holds
/// between 1 and `threshold` numbers.
pub fn rank(card: &Card, marked: &MarkedSet, drawn: &DrawnSet, threshold: usize) -> Option<NearWinner> {
    let owed: Vec<Number> = card
        .numbers()
        .filter(|&n| drawn.contains(n) && !marked.contains(n))
        .collect();
    within_threshold(owed, threshold)
}

/// Structural signal: the undrawn numbers needed for the closest line (first
/// in `Line::ALL` order on ties) or, in full mode, for the whole card.
pub fn rank_structural(card: &Card, drawn: &DrawnSet, mode: WinMode, threshold: usize) -> Option<NearWinner> {
    let needed: Vec<Number> = match mode {
        WinMode::Full => card.numbers().filter(|&n| !drawn.contains(n)).collect(),
        WinMode::Line => Line::ALL
            .iter()
            .map(|line| {
                line.cells()
                    .into_iter()
                    .map(|(row, col)| card.cell(row, col))
                    .filter(|&n| n != FREE_CELL && !drawn.contains(n))
                    .collect::<Vec<Number>>()
            })
            .min_by_key(Vec::len)
            .unwrap_or_default(),
    };
    within_threshold(needed, threshold)
}

pub fn near_signal(card: &Card, marked: &MarkedSet, drawn: &DrawnSet, rules: &Rules) -> Option<NearWinner> {
    match rules.strategy {
        NearWinnerStrategy::MarkingLag => rank(card, marked, drawn, rules.threshold),
        NearWinnerStrategy::Structural => rank_structural(card, drawn, rules.mode, rules.threshold),
    }
}

/// Near winners among `entries`, fewest missing first, then by player and
/// card id. Cards that already complete the pattern are left out.
pub fn find_near_winners(entries: &[PlayerCard], drawn: &DrawnSet, rules: &Rules) -> Vec<NearWinnerReport> {
    let mut reports: Vec<NearWinnerReport> = entries
        .iter()
        .filter(|entry| !evaluate(&entry.card, drawn, rules.mode).is_complete())
        .filter_map(|entry| {
            near_signal(&entry.card, &entry.marked, drawn, rules).map(|near| NearWinnerReport {
                player: entry.player.clone(),
                card_id: entry.card.id(),
                missing: near.missing,
            })
        })
        .collect();

    reports.sort_by(|a, b| {
        a.missing
            .len()
            .cmp(&b.missing.len())
            .then_with(|| a.player.cmp(&b.player))
            .then_with(|| a.card_id.cmp(&b.card_id))
    });
    reports
}
