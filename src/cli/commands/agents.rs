use colored::Colorize;
use serde_json::json;

use crate::cli::commands::{preview, with_spinner};
use crate::cli::context::AppContext;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::agent::{
    AgentItem, AgentListRequest, AgentListResponse, AgentRunRequest, AgentRunResponse, Workflow,
};
use crate::core::services::logger::meta;

/// Execute `verse agents list`.
pub fn list(ctx: &AppContext, limit: Option<u32>) -> Result<()> {
    ctx.require_session()?;

    let request = AgentListRequest { limit };
    let response = with_spinner(ctx, "Loading agents...", ctx.api.list_agents(&request))?;
    let page: AgentListResponse = response.envelope()?;

    if page.agents.is_empty() {
        output::header("Agents");
        output::warning("No agents available");
        return Ok(());
    }

    output::header(&format!("Agents ({} of {})", page.agents.len(), page.total));
    println!();
    for agent in &page.agents {
        print_row(agent);
    }
    Ok(())
}

/// Execute `verse agents show <id>`.
pub fn show(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.require_session()?;

    let response = with_spinner(ctx, "Loading agent...", ctx.api.get_agent(id))?;
    let agent: AgentItem = response.envelope()?;

    output::header(&format!("{} (#{})", agent.name, agent.id));
    println!("  {:<10} {}", "code".dimmed(), agent.code);
    println!("  {:<10} {}", "workflow".dimmed(), agent.workflow_key);
    println!("  {:<10} {}", "active".dimmed(), agent.is_active);
    if !agent.description.is_empty() {
        println!("\n  {}", agent.description);
    }
    Ok(())
}

/// Execute `verse agents run`.
pub fn run(
    ctx: &AppContext,
    id: i64,
    conversation_id: i64,
    input: &str,
    workflow: Option<Workflow>,
    history_limit: Option<u32>,
) -> Result<()> {
    ctx.require_session()?;

    let request = AgentRunRequest {
        user_input: input.to_string(),
        conversation_id,
        workflow,
        history_limit,
    };
    let response = with_spinner(ctx, "Waiting for the agent...", ctx.api.run_agent(id, &request))?;
    let reply = response.envelope::<AgentRunResponse>()?.into_message();

    ctx.logger.info(
        "Agent run completed",
        meta(json!({
            "agent_id": id,
            "conversation_id": conversation_id,
            "reply_chars": reply.chars().count(),
        })),
    );
    println!("{reply}");
    Ok(())
}

fn print_row(agent: &AgentItem) {
    let marker = if agent.is_active {
        "•".green()
    } else {
        "•".dimmed()
    };
    println!(
        "  {} {:>4} {:<20} {}",
        marker,
        agent.id,
        agent.name,
        preview(&agent.description, 50).dimmed(),
    );
}
