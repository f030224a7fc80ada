pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::models::agent::Workflow;
use crate::core::models::log_entry::LogLevel;
use crate::core::models::poetry::SearchType;

/// Terminal client for the poetry agent chat service.
#[derive(Parser, Debug)]
#[command(name = "verse", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.toml, the stored session and log archive
    #[arg(long, global = true, env = "VERSE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000/api
    #[arg(long, global = true, env = "VERSE_API_BASE")]
    pub base_url: Option<String>,

    /// Minimum level for application logs (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Verbose output: show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: keep logs off the console
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show the signed-in user
    Me,

    /// Update the signed-in user's profile
    Profile {
        #[arg(long)]
        nickname: String,
    },

    /// Browse and run agents
    Agents {
        #[command(subcommand)]
        action: AgentsAction,
    },

    /// Manage conversations
    Conversations {
        #[command(subcommand)]
        action: ConversationsAction,
    },

    /// Show a single message
    Message {
        /// Message id
        id: i64,
    },

    /// Search the poetry collection
    Search {
        /// Search text
        query: String,
        /// Search strategy
        #[arg(long = "type", value_enum)]
        search_type: Option<SearchType>,
        /// Maximum number of results
        #[arg(long)]
        top_k: Option<u32>,
    },

    /// Inspect the application log
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },

    /// Show data directory, backend address and session state
    Status,
}

#[derive(Subcommand, Debug)]
pub enum AgentsAction {
    /// List available agents
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one agent
    Show {
        /// Agent id
        id: i64,
    },
    /// Send input to an agent within a conversation
    Run {
        /// Agent id
        id: i64,
        /// Conversation the exchange belongs to
        #[arg(long)]
        conversation: i64,
        /// Text sent to the agent
        #[arg(long)]
        input: String,
        #[arg(long, value_enum)]
        workflow: Option<Workflow>,
        /// How many earlier messages the agent sees
        #[arg(long)]
        history_limit: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConversationsAction {
    /// Start a conversation with an agent
    Create {
        #[arg(long)]
        agent: i64,
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete a conversation
    Delete {
        /// Conversation id
        id: i64,
    },
    /// List conversations with an agent
    List {
        #[arg(long)]
        agent: i64,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show the messages of a conversation
    Messages {
        /// Conversation id
        id: i64,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogsAction {
    /// Print buffered log entries
    Show {
        /// Read entries from an exported file instead of the buffer
        #[arg(long)]
        file: Option<PathBuf>,
        /// Only entries at or above this level
        #[arg(long)]
        level: Option<LogLevel>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
    },
    /// Write the log as JSON to a file or stdout
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete every buffered and archived entry
    Clear,
}
