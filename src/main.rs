// src/main.rs
// Command line entry point: generate cards, check a card against the drawn
// numbers, or run a local game where simulated players mark with a lag.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bingo::card::{Card, CardGenerator};
use bingo::config::GameConfig;
use bingo::defs::Number;
use bingo::drawn::DrawnSet;
use bingo::evaluator::{Rules, Verdict, WinMode, classify, evaluate_claim, winning_lines};
use bingo::game::{Game, GameStatus, GameStore};
use bingo::logging::{log_error_stderr, log_info};
use bingo::marks::MarkedSet;
use bingo::terminal;

#[derive(Parser)]
#[command(name = env!("CARGO_BIN_NAME"))]
#[command(about = "Bingo - 75-ball card generator, win checker and local game")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate new cards
    Card {
        /// Number of cards to generate
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Print the cards as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a JSON card against a list of drawn numbers
    Check {
        /// Path to a JSON file holding the 5x5 grid, 0 for the free cell
        #[arg(long)]
        card: PathBuf,
        /// Drawn numbers, comma separated, in draw order
        #[arg(long, value_delimiter = ',')]
        drawn: Vec<Number>,
        /// Numbers the player has marked, comma separated
        #[arg(long, value_delimiter = ',')]
        marked: Vec<Number>,
        /// Win mode (line or full), defaults to the configured one
        #[arg(long)]
        mode: Option<WinMode>,
        /// Near-winner threshold, defaults to the configured one
        #[arg(long)]
        threshold: Option<usize>,
    },
    /// Play a local game with simulated players
    Play {
        /// Number of players, defaults to the configured one
        #[arg(long)]
        players: Option<usize>,
        /// Win mode (line or full), defaults to the configured one
        #[arg(long)]
        mode: Option<WinMode>,
        /// Draw without waiting for a key press
        #[arg(long)]
        auto: bool,
    },
}

fn main() {
    let args = Args::parse();
    let result = match args.command {
        Command::Card { count, json } => run_card(count, json),
        Command::Check { card, drawn, marked, mode, threshold } => {
            run_check(card, drawn, marked, mode, threshold)
        }
        Command::Play { players, mode, auto } => run_play(players, mode, auto),
    };

    if let Err(e) = result {
        log_error_stderr(&e.to_string());
        std::process::exit(1);
    }
}

fn run_card(count: usize, json: bool) -> Result<(), Box<dyn Error>> {
    let cards = CardGenerator::new().generate_many(count);
    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    let nothing_drawn = DrawnSet::new();
    let nothing_marked = MarkedSet::new();
    for (i, card) in cards.iter().enumerate() {
        println!("=== CARD {} (ID: {}) ===", i + 1, card.id());
        println!("{}", terminal::render_card(card, &nothing_drawn, &nothing_marked));
    }
    Ok(())
}

fn run_check(
    card_path: PathBuf,
    drawn: Vec<Number>,
    marked: Vec<Number>,
    mode: Option<WinMode>,
    threshold: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let config = GameConfig::load_or_default();
    let rules = Rules::new(
        mode.unwrap_or(config.mode),
        threshold.unwrap_or(config.near_threshold),
        config.near_strategy,
    )?;

    let content = fs::read_to_string(&card_path)?;
    let card: Card = serde_json::from_str(&content)?;
    let drawn = DrawnSet::from_numbers(drawn)?;
    let marked: MarkedSet = marked.into_iter().collect();

    println!("{}", terminal::render_card(&card, &drawn, &marked));
    let verdict = classify(&card, &marked, &drawn, &rules);
    println!("Mode: {}  Threshold: {}  Strategy: {}", rules.mode, rules.threshold, rules.strategy);
    terminal::show_verdict(&card.id(), &verdict);

    if verdict.is_complete() && rules.mode == WinMode::Line {
        let lines: Vec<String> = winning_lines(&card, &drawn).iter().map(ToString::to_string).collect();
        println!("Winning lines: {}", lines.join(", "));
    }
    if !marked.is_empty() {
        match evaluate_claim(&card, &marked, &drawn, rules.mode) {
            Verdict::Complete => println!("The player's marks support a BINGO claim"),
            _ => println!("The player's marks do not support a BINGO claim yet"),
        }
    }
    Ok(())
}

fn run_play(players: Option<usize>, mode: Option<WinMode>, auto: bool) -> Result<(), Box<dyn Error>> {
    let mut config = GameConfig::load_or_default();
    if let Some(players) = players {
        config.players = players;
    }
    if let Some(mode) = mode {
        config.mode = mode;
    }
    let rules = config.rules()?;

    let game = Game::new(config.mode);
    let names: Vec<String> = (1..=config.players).map(|i| format!("Player {i}")).collect();
    for name in &names {
        game.join(name)?;
    }
    game.start()?;
    log_info(&game.game_info()?);

    loop {
        if !auto && terminal::hitkey()? {
            break;
        }
        if game.status()? != GameStatus::InProgress {
            break;
        }

        game.draw()?;
        let drawn = game.drawn_numbers()?;

        // Simulated players cover everything except the latest `marking_lag` calls
        let settled = drawn.len().saturating_sub(config.marking_lag);
        for name in &names {
            let entry = game.card_of(name)?;
            for &number in &drawn.history()[..settled] {
                if entry.card.contains(number) && !entry.marked.contains(number) {
                    game.mark(name, number)?;
                }
            }
        }

        terminal::show_draw(&drawn, game.pouch_len()?);
        terminal::show_near_winners(&game.near_winners(&rules)?);

        if let Some(winner) = game.check_winners()? {
            let entry = game.card_of(&winner.player)?;
            println!("\n{}", terminal::render_card(&entry.card, &drawn, &entry.marked));
            terminal::show_verdict(&winner.player, &Verdict::Complete);
            break;
        }
    }

    if game.status()? == GameStatus::Finished && game.winner()?.is_none() {
        println!("All numbers drawn, nobody completed a card.");
    }
    log_info(&game.game_info()?);
    Ok(())
}
