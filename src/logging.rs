// bingo/src/logging.rs
// Timestamped line logging for the game shell and the CLI.

use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

fn format_line(at: DateTime<Local>, level: LogLevel, message: &str) -> String {
    format!("{} - {} - {}", at.format("%Y-%m-%d %H:%M:%S"), level.as_str(), message)
}

pub fn log_message(level: LogLevel, message: &str) {
    println!("{}", format_line(Local::now(), level, message));
}

pub fn log_info(message: &str) {
    log_message(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_message(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_message(LogLevel::Error, message);
}

/// Same format as `log_error`, written to stderr.
pub fn log_error_stderr(message: &str) {
    eprintln!("{}", format_line(Local::now(), LogLevel::Error, message));
}
