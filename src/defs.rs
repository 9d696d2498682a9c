// bingo/src/defs.rs
// Shared constants and small helpers for the 75-ball bingo game.

use std::ops::RangeInclusive;

pub type Number = u8;

pub const GRID_SIZE: usize = 5; // rows and columns in a card
pub const BAND_SIZE: Number = 15; // numbers available to each column
pub const FIRSTNUMBER: Number = 1;
pub const LASTNUMBER: Number = FIRSTNUMBER + BAND_SIZE * GRID_SIZE as Number - 1;
pub const TOTALNUMBERS: usize = (LASTNUMBER - FIRSTNUMBER + 1) as usize;

// The centre cell is always covered
pub const FREE_CELL: Number = 0;
pub const FREE_POSITION: (usize, usize) = (2, 2);
pub const NUMBERSPERCARD: usize = GRID_SIZE * GRID_SIZE - 1;

pub const COLUMN_LETTERS: [char; GRID_SIZE] = ['B', 'I', 'N', 'G', 'O'];

/// Range of numbers allowed in column `col` (B:1-15, I:16-30, N:31-45, G:46-60, O:61-75).
pub fn column_band(col: usize) -> RangeInclusive<Number> {
    let start = FIRSTNUMBER + col as Number * BAND_SIZE;
    start..=start + BAND_SIZE - 1
}

pub fn column_letter(col: usize) -> char {
    COLUMN_LETTERS[col]
}

/// Column whose band holds `number`, if any.
pub fn column_of(number: Number) -> Option<usize> {
    if (FIRSTNUMBER..=LASTNUMBER).contains(&number) {
        Some(((number - FIRSTNUMBER) / BAND_SIZE) as usize)
    } else {
        None
    }
}

/// Caller-facing label such as "B-7" or "O-68".
pub fn call_label(number: Number) -> String {
    match column_of(number) {
        Some(col) => format!("{}-{}", column_letter(col), number),
        None => number.to_string(),
    }
}
