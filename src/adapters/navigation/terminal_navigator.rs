use colored::Colorize;

use crate::core::services::request_pipeline::LOGIN_PATH;
use crate::core::traits::navigator::Navigator;

/// Navigator for a terminal session: there is no view to switch to, so
/// the user is told which command opens the requested one.
pub struct TerminalNavigator;

impl TerminalNavigator {
    fn command_for(path: &str) -> String {
        match path {
            LOGIN_PATH => "verse login --email <you@example.com>".to_string(),
            other => format!("verse {}", other.trim_start_matches('/')),
        }
    }

    fn message_for(path: &str) -> String {
        let command = Self::command_for(path);
        match path {
            LOGIN_PATH => format!("Please sign in again: {command}"),
            _ => format!("Continue with: {command}"),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn redirect_to(&self, path: &str) {
        eprintln!("  {} {}", "→".cyan(), Self::message_for(path).bold());
    }
}
