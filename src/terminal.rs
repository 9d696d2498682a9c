// bingo/src/terminal.rs
// Terminal output for cards and the draw board, plus the key wait used
// between draws.

use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode},
};

use crate::card::Card;
use crate::defs::{COLUMN_LETTERS, FREE_CELL, GRID_SIZE, Number, call_label, column_band};
use crate::drawn::DrawnSet;
use crate::evaluator::Verdict;
use crate::marks::MarkedSet;
use crate::ranker::NearWinnerReport;

const GREEN: &str = "\x1b[1;32m";
const YELLOW: &str = "\x1b[1;33m";
const RESET: &str = "\x1b[0m";

/// Render a card as text. Marked numbers are green, drawn but unmarked ones
/// yellow, the free cell shows as `**`.
pub fn render_card(card: &Card, drawn: &DrawnSet, marked: &MarkedSet) -> String {
    let mut out = String::new();
    for letter in COLUMN_LETTERS {
        out.push_str(&format!("  {letter} "));
    }
    out.push('\n');

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let value = card.cell(row, col);
            let cell = if value == FREE_CELL {
                format!(" {GREEN}**{RESET} ")
            } else if marked.contains(value) {
                format!(" {GREEN}{value:2}{RESET} ")
            } else if drawn.contains(value) {
                format!(" {YELLOW}{value:2}{RESET} ")
            } else {
                format!(" {value:2} ")
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    out
}

/// One line per column letter with the numbers called so far, the last one
/// highlighted.
pub fn render_board(drawn: &DrawnSet) -> String {
    let last = drawn.last();
    let mut out = String::new();
    for (col, letter) in COLUMN_LETTERS.iter().enumerate() {
        out.push_str(&format!("{letter} |"));
        for number in column_band(col) {
            if Some(number) == last {
                out.push_str(&format!(" {GREEN}{number:2}{RESET}"));
            } else if drawn.contains(number) {
                out.push_str(&format!(" {number:2}"));
            } else {
                out.push_str("  .");
            }
        }
        out.push('\n');
    }
    out
}

pub fn show_draw(drawn: &DrawnSet, remaining: usize) {
    if let Some(last) = drawn.last() {
        println!("Last number: {GREEN}{}{RESET}", call_label(last));
    }
    let recent: Vec<String> = drawn.recent(4).into_iter().map(call_label).collect();
    println!("Previous numbers: {}", recent.join(" "));
    println!("\n{}", render_board(drawn));
    match remaining {
        0 => println!("The pouch is empty!"),
        n => println!("Remaining in pouch: {n}"),
    }
}

pub fn show_near_winners(reports: &[NearWinnerReport]) {
    if reports.is_empty() {
        return;
    }
    println!("\n{YELLOW}Players close to winning{RESET}");
    for report in reports {
        let missing: Vec<String> = report.missing.iter().map(Number::to_string).collect();
        println!("  {} (card {}): still to mark {}", report.player, report.card_id, missing.join(", "));
    }
}

pub fn show_verdict(player: &str, verdict: &Verdict) {
    match verdict {
        Verdict::Complete => println!("{GREEN}{player}: BINGO!!!{RESET}"),
        other => println!("{player}: {other}"),
    }
}

/// Wait for a key press. Returns true when ESC was pressed.
pub fn hitkey() -> std::io::Result<bool> {
    println!("\nPress any key to draw the next number or ESC to exit");

    enable_raw_mode()?;

    // Drop anything typed while the previous draw was shown
    while event::poll(std::time::Duration::from_millis(0))? {
        event::read()?;
    }

    let result = loop {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == event::KeyEventKind::Press {
                break key_event.code == KeyCode::Esc;
            }
        }
    };

    disable_raw_mode()?;
    print!("\x1Bc");

    Ok(result)
}
