use colored::Colorize;

use crate::core::models::log_entry::LogLevel;
use crate::core::traits::console::ConsoleSink;

/// Writes log lines to stderr so they never mix with command output.
pub struct StderrConsole;

impl StderrConsole {
    /// Color the level tag of a formatted line, leaving the rest as is.
    fn colorize(line: &str) -> String {
        let Some((stamp, rest)) = line.split_once("] ") else {
            return line.to_string();
        };
        let Some((tag, message)) = rest.split_once(':') else {
            return line.to_string();
        };
        let colored_tag = match tag.parse::<LogLevel>() {
            Ok(LogLevel::Debug) => tag.dimmed(),
            Ok(LogLevel::Info) => tag.blue(),
            Ok(LogLevel::Warn) => tag.yellow(),
            Ok(LogLevel::Error) => tag.red().bold(),
            Err(_) => return line.to_string(),
        };
        format!("{}] {colored_tag}:{message}", stamp.dimmed())
    }
}

impl ConsoleSink for StderrConsole {
    fn emit(&self, line: &str) {
        eprintln!("{}", Self::colorize(line));
    }

    fn warn(&self, message: &str) {
        eprintln!("  {} {}", "⚠".yellow(), message);
    }
}
