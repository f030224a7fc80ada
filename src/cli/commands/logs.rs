use std::path::Path;

use colored::Colorize;
use serde_json::json;

use crate::cli::context::AppContext;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::log_entry::{LogEntry, LogLevel, iso_millis};
use crate::core::services::logger::{Logger, meta};

/// Execute `verse logs show`.
///
/// Lists the buffered entries, including those restored from earlier runs,
/// or the entries of a file written by `verse logs export`.
pub fn show(
    ctx: &AppContext,
    file: Option<&Path>,
    level: Option<LogLevel>,
    last: Option<usize>,
) -> Result<()> {
    let source = match file {
        Some(path) => Logger::parse_export(&std::fs::read_to_string(path)?)?,
        None => ctx.logger.logs(),
    };
    let entries = select(source, level, last);

    if entries.is_empty() {
        output::header("verse logs");
        output::warning("No log entries found");
        if level.is_some() {
            println!("  Try removing --level to see all entries.");
        }
        return Ok(());
    }

    output::header(&format!("verse logs ({} entries)", entries.len()));
    println!();
    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

/// Execute `verse logs export`.
pub fn export(ctx: &AppContext, output_path: Option<&Path>) -> Result<()> {
    let count = ctx.logger.len();
    let text = ctx.logger.export();

    match output_path {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))?;
            ctx.logger.info(
                "Logs exported",
                meta(json!({ "path": path.display().to_string(), "entries": count })),
            );
            output::success(&format!("Exported {count} entries to {}", path.display()));
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Execute `verse logs clear`.
pub fn clear(ctx: &AppContext) -> Result<()> {
    if ctx.logger.is_empty() {
        output::warning("No log entries to clear");
        return Ok(());
    }
    let count = ctx.logger.len();
    ctx.logger.clear();
    output::success(&format!("Cleared {count} log entries"));
    Ok(())
}

/// Keep entries at or above `level`, then the newest `last` of those.
fn select(entries: Vec<LogEntry>, level: Option<LogLevel>, last: Option<usize>) -> Vec<LogEntry> {
    let mut selected: Vec<LogEntry> = match level {
        Some(min) => entries.into_iter().filter(|e| e.level >= min).collect(),
        None => entries,
    };
    if let Some(n) = last {
        let skip = selected.len().saturating_sub(n);
        selected.drain(..skip);
    }
    selected
}

fn print_entry(entry: &LogEntry) {
    let level = match entry.level {
        LogLevel::Debug => entry.level.as_str().dimmed(),
        LogLevel::Info => entry.level.as_str().blue(),
        LogLevel::Warn => entry.level.as_str().yellow(),
        LogLevel::Error => entry.level.as_str().red(),
    };
    let metadata = entry
        .metadata
        .as_ref()
        .map(|m| serde_json::Value::Object(m.clone()).to_string())
        .unwrap_or_default();

    println!(
        "  {} {} {:<5} {} {}",
        iso_millis::format(&entry.timestamp).dimmed(),
        "│".dimmed(),
        level,
        entry.message,
        metadata.dimmed(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<LogEntry> {
        vec![
            LogEntry::now(LogLevel::Debug, "a", None),
            LogEntry::now(LogLevel::Info, "b", None),
            LogEntry::now(LogLevel::Error, "c", None),
            LogEntry::now(LogLevel::Warn, "d", None),
        ]
    }

    fn messages(entries: &[LogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn select_without_filters_keeps_everything() {
        assert_eq!(messages(&select(entries(), None, None)), ["a", "b", "c", "d"]);
    }

    #[test]
    fn select_by_level() {
        let picked = select(entries(), Some(LogLevel::Warn), None);
        assert_eq!(messages(&picked), ["c", "d"]);
    }

    #[test]
    fn select_last_after_level() {
        let picked = select(entries(), Some(LogLevel::Info), Some(2));
        assert_eq!(messages(&picked), ["c", "d"]);
    }

    #[test]
    fn select_last_larger_than_len() {
        assert_eq!(select(entries(), None, Some(10)).len(), 4);
    }
}
