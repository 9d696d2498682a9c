// bingo/src/card.rs
// Card representation, boundary validation and random card generation.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

use rand::seq::SliceRandom;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};

use crate::defs::{FREE_CELL, FREE_POSITION, GRID_SIZE, Number, column_band};
use crate::error::{BingoError, CardDefect};
use crate::logging::log_warning;

pub type Grid = [[Number; GRID_SIZE]; GRID_SIZE];

/// A validated 5×5 card. The only way to obtain one is through the generator
/// or `Card::from_rows`, so every `Card` has its free cell at (2,2) and 24
/// distinct numbers inside their column bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Number>>", into = "Vec<Vec<Number>>")]
pub struct Card {
    grid: Grid,
}

impl Card {
    pub fn from_rows(rows: Vec<Vec<Number>>) -> Result<Self, BingoError> {
        if rows.len() != GRID_SIZE {
            return Err(BingoError::MalformedCard(CardDefect::WrongRowCount(rows.len())));
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != GRID_SIZE {
                return Err(BingoError::MalformedCard(CardDefect::WrongRowLength {
                    row,
                    len: cells.len(),
                }));
            }
        }

        let mut grid = [[FREE_CELL; GRID_SIZE]; GRID_SIZE];
        let mut seen = HashSet::new();
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                let is_free_position = (row, col) == FREE_POSITION;
                if value == FREE_CELL {
                    if !is_free_position {
                        return Err(BingoError::MalformedCard(CardDefect::FreeCellMisplaced {
                            row,
                            col,
                        }));
                    }
                } else if is_free_position {
                    return Err(BingoError::MalformedCard(CardDefect::FreeCellMissing));
                } else if !column_band(col).contains(&value) {
                    return Err(BingoError::MalformedCard(CardDefect::OutOfBand {
                        row,
                        col,
                        value,
                    }));
                } else if !seen.insert(value) {
                    return Err(BingoError::MalformedCard(CardDefect::DuplicateNumber(value)));
                }
                grid[row][col] = value;
            }
        }

        Ok(Card { grid })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, row: usize, col: usize) -> Number {
        self.grid[row][col]
    }

    pub fn to_rows(&self) -> Vec<Vec<Number>> {
        self.grid.iter().map(|row| row.to_vec()).collect()
    }

    /// The 24 non-free numbers in row-major order.
    pub fn numbers(&self) -> impl Iterator<Item = Number> + '_ {
        self.grid
            .iter()
            .flat_map(|row| row.iter().copied())
            .filter(|&n| n != FREE_CELL)
    }

    pub fn contains(&self, number: Number) -> bool {
        number != FREE_CELL && self.numbers().any(|n| n == number)
    }

    pub fn position_of(&self, number: Number) -> Option<(usize, usize)> {
        if number == FREE_CELL {
            return None;
        }
        self.grid.iter().enumerate().find_map(|(row, cells)| {
            cells.iter().position(|&n| n == number).map(|col| (row, col))
        })
    }

    /// Stable 16 hex digit identifier derived from the card contents.
    pub fn id(&self) -> String {
        let mut hasher = DefaultHasher::new();
        for row in &self.grid {
            for &cell in row {
                hasher.write_u8(cell);
            }
        }
        format!("{:016X}", hasher.finish())
    }
}

impl TryFrom<Vec<Vec<Number>>> for Card {
    type Error = BingoError;

    fn try_from(rows: Vec<Vec<Number>>) -> Result<Self, Self::Error> {
        Card::from_rows(rows)
    }
}

impl From<Card> for Vec<Vec<Number>> {
    fn from(card: Card) -> Self {
        card.to_rows()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardGenerator;

impl CardGenerator {
    const MAX_RETRIES: usize = 100;

    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self) -> Card {
        self.generate_with(&mut rng())
    }

    /// Deal a card from the given random source. Each column draws 5 of its
    /// 15 band numbers without replacement, then the centre is freed.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Card {
        let mut grid = [[FREE_CELL; GRID_SIZE]; GRID_SIZE];

        for col in 0..GRID_SIZE {
            let mut band: Vec<Number> = column_band(col).collect();
            band.shuffle(rng);
            for (row, &number) in band.iter().take(GRID_SIZE).enumerate() {
                grid[row][col] = number;
            }
        }

        let (free_row, free_col) = FREE_POSITION;
        grid[free_row][free_col] = FREE_CELL;

        Card { grid }
    }

    /// Generate `count` cards with pairwise distinct ids.
    pub fn generate_many(&self, count: usize) -> Vec<Card> {
        let mut cards = Vec::with_capacity(count);
        let mut seen_ids = HashSet::new();
        let mut total_regenerations = 0;

        while cards.len() < count {
            let mut attempt = 0;
            let card = loop {
                attempt += 1;
                let card = self.generate();
                if !seen_ids.contains(&card.id()) || attempt >= Self::MAX_RETRIES {
                    break card;
                }
                total_regenerations += 1;
            };
            seen_ids.insert(card.id());
            cards.push(card);
        }

        if total_regenerations > 0 {
            log_warning(&format!(
                "Total card regenerations due to duplicate ids: {total_regenerations}"
            ));
        }

        cards
    }
}
