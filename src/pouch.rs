// bingo/src/pouch.rs
// The pouch of numbers still waiting to be called.

use serde::{Deserialize, Serialize};

use crate::defs::{FIRSTNUMBER, LASTNUMBER, Number};
use crate::drawn::DrawnSet;
use crate::error::BingoError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pouch {
    pub numbers: Vec<Number>,
}

impl Pouch {
    pub fn new() -> Self {
        Pouch {
            numbers: (FIRSTNUMBER..=LASTNUMBER).collect(),
        }
    }

    /// Refill from persisted history: everything not yet drawn.
    pub fn from_drawn(drawn: &DrawnSet) -> Self {
        Pouch {
            numbers: (FIRSTNUMBER..=LASTNUMBER).filter(|&n| !drawn.contains(n)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn extract(&mut self) -> Result<Number, BingoError> {
        if self.is_empty() {
            return Err(BingoError::PouchEmpty);
        }
        let random_index = rand::random_range(0..self.len());
        Ok(self.numbers.swap_remove(random_index))
    }

    /// Remove a specific number, as when a draw arrives from outside.
    pub fn take(&mut self, number: Number) -> Result<Number, BingoError> {
        if !(FIRSTNUMBER..=LASTNUMBER).contains(&number) {
            return Err(BingoError::NumberOutOfRange(number));
        }
        match self.numbers.iter().position(|&n| n == number) {
            Some(index) => Ok(self.numbers.swap_remove(index)),
            None => Err(BingoError::DuplicateDraw(number)),
        }
    }
}

impl Default for Pouch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_pouch_is_full() {
        let pouch = Pouch::new();
        assert_eq!(pouch.len(), 75);
        assert!(!pouch.is_empty());
    }

    #[test]
    fn test_extract_everything_once() {
        let mut pouch = Pouch::new();
        let mut seen = HashSet::new();
        while !pouch.is_empty() {
            let n = pouch.extract().unwrap();
            assert!((FIRSTNUMBER..=LASTNUMBER).contains(&n));
            assert!(seen.insert(n), "{n} extracted twice");
        }
        assert_eq!(seen.len(), 75);
        assert_eq!(pouch.extract(), Err(BingoError::PouchEmpty));
    }

    #[test]
    fn test_take_specific_number() {
        let mut pouch = Pouch::new();
        assert_eq!(pouch.take(5), Ok(5));
        assert_eq!(pouch.len(), 74);
        assert_eq!(pouch.take(5), Err(BingoError::DuplicateDraw(5)));
        assert_eq!(pouch.take(0), Err(BingoError::NumberOutOfRange(0)));
        assert_eq!(pouch.take(76), Err(BingoError::NumberOutOfRange(76)));
        assert_eq!(pouch.len(), 74);
    }

    #[test]
    fn test_from_drawn_excludes_history() {
        let drawn = DrawnSet::from_numbers([1, 2, 75]).unwrap();
        let pouch = Pouch::from_drawn(&drawn);
        assert_eq!(pouch.len(), 72);
        assert!(!pouch.numbers.contains(&1));
        assert!(!pouch.numbers.contains(&75));
        assert!(pouch.numbers.contains(&3));
    }
}
