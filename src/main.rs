mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use crate::cli::context::AppContext;
use crate::cli::{AgentsAction, Cli, Commands, ConversationsAction, LogsAction};
use crate::core::errors::Result;
use crate::core::services::logger::meta;

fn main() {
    let args = Cli::parse();

    if let Err(e) = run(&args) {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Build the context and dispatch. The context is dropped before `main`
/// exits, which flushes the log archive.
fn run(args: &Cli) -> Result<()> {
    let ctx = AppContext::build(args)?;

    let result = dispatch(&ctx, &args.command);
    if let Err(e) = &result {
        ctx.logger.error(
            "Command failed",
            meta(serde_json::json!({ "error": e.to_string() })),
        );
    }
    result
}

fn dispatch(ctx: &AppContext, command: &Commands) -> Result<()> {
    use crate::cli::commands::{agents, auth, conversations, logs, messages, search, status};

    match command {
        Commands::Login { email, password } => auth::login(ctx, email, password.as_deref()),
        Commands::Register {
            email,
            password,
            nickname,
        } => auth::register(ctx, email, password.as_deref(), nickname.as_deref()),
        Commands::Logout => auth::logout(ctx),
        Commands::Me => auth::me(ctx),
        Commands::Profile { nickname } => auth::update_profile(ctx, nickname),
        Commands::Agents { action } => match action {
            AgentsAction::List { limit } => agents::list(ctx, *limit),
            AgentsAction::Show { id } => agents::show(ctx, *id),
            AgentsAction::Run {
                id,
                conversation,
                input,
                workflow,
                history_limit,
            } => agents::run(ctx, *id, *conversation, input, *workflow, *history_limit),
        },
        Commands::Conversations { action } => match action {
            ConversationsAction::Create { agent, title } => {
                conversations::create(ctx, *agent, title.as_deref())
            }
            ConversationsAction::Delete { id } => conversations::delete(ctx, *id),
            ConversationsAction::List {
                agent,
                limit,
                offset,
            } => conversations::list(ctx, *agent, *limit, *offset),
            ConversationsAction::Messages { id, limit } => {
                conversations::messages(ctx, *id, *limit)
            }
        },
        Commands::Message { id } => messages::show(ctx, *id),
        Commands::Search {
            query,
            search_type,
            top_k,
        } => search::execute(ctx, query, *search_type, *top_k),
        Commands::Logs { action } => match action {
            LogsAction::Show { file, level, last } => {
                logs::show(ctx, file.as_deref(), *level, *last)
            }
            LogsAction::Export { output } => logs::export(ctx, output.as_deref()),
            LogsAction::Clear => logs::clear(ctx),
        },
        Commands::Status => status::execute(ctx),
    }
}
