// lib.rs
// Library modules for the bingo game

pub mod defs;
pub mod error;
pub mod logging;
pub mod card;
pub mod drawn;
pub mod pouch;
pub mod marks;
pub mod evaluator;
pub mod ranker;
pub mod game;
pub mod config;
pub mod terminal;
