use colored::Colorize;
use serde_json::json;

use crate::cli::commands::{preview, with_spinner};
use crate::cli::context::AppContext;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::conversation::{
    ConversationCreateRequest, ConversationCreateResponse, ConversationListRequest,
    ConversationListResponse,
};
use crate::core::models::message::{MessageItem, MessageListRequest, MessageListResponse, Role};
use crate::core::services::logger::meta;

/// Execute `verse conversations create`.
pub fn create(ctx: &AppContext, agent_id: i64, title: Option<&str>) -> Result<()> {
    ctx.require_session()?;

    let request = ConversationCreateRequest {
        title: title.map(str::to_string),
        agent_id,
    };
    let response = with_spinner(
        ctx,
        "Creating conversation...",
        ctx.api.create_conversation(&request),
    )?;
    let id = response.envelope::<ConversationCreateResponse>()?.id();

    ctx.logger.info(
        "Conversation created",
        meta(json!({ "conversation_id": id, "agent_id": agent_id })),
    );
    output::success(&format!("Conversation {} created", id.to_string().cyan()));
    Ok(())
}

/// Execute `verse conversations delete <id>`.
pub fn delete(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.require_session()?;

    let response = with_spinner(
        ctx,
        "Deleting conversation...",
        ctx.api.delete_conversation(id),
    )?;
    response.envelope_message()?;

    ctx.logger
        .info("Conversation deleted", meta(json!({ "conversation_id": id })));
    output::success(&format!("Conversation {id} deleted"));
    Ok(())
}

/// Execute `verse conversations list`.
pub fn list(ctx: &AppContext, agent_id: i64, limit: Option<u32>, offset: Option<u32>) -> Result<()> {
    ctx.require_session()?;

    let request = ConversationListRequest {
        agent_id,
        limit,
        offset,
    };
    let response = with_spinner(
        ctx,
        "Loading conversations...",
        ctx.api.list_conversations(&request),
    )?;
    let page = response.envelope::<ConversationListResponse>()?;
    let total = page.total();
    let conversations = page.into_items();

    output::header(&format!(
        "Conversations with agent {agent_id} ({} of {total})",
        conversations.len()
    ));
    if conversations.is_empty() {
        output::warning("No conversations yet");
        println!("  Run 'verse conversations create --agent {agent_id}' to start one.");
        return Ok(());
    }

    println!();
    for conversation in &conversations {
        let title = conversation.title.as_deref().unwrap_or("(untitled)");
        println!(
            "  {:>5} {} {:<30} {}",
            conversation.id,
            "│".dimmed(),
            preview(title, 30),
            conversation.updated_at.dimmed(),
        );
    }
    Ok(())
}

/// Execute `verse conversations messages <id>`.
pub fn messages(ctx: &AppContext, id: i64, limit: Option<u32>) -> Result<()> {
    ctx.require_session()?;

    let request = MessageListRequest {
        conversation_id: id,
        limit,
    };
    let response = with_spinner(ctx, "Loading messages...", ctx.api.list_messages(id, &request))?;
    let page = response.envelope::<MessageListResponse>()?;
    let total = page.total();
    let messages = page.into_messages();

    output::header(&format!(
        "Conversation {id} ({} of {total} messages)",
        messages.len()
    ));
    println!();
    for message in &messages {
        print_message(message);
    }
    Ok(())
}

/// Print one message with a colored role label.
pub(crate) fn print_message(message: &MessageItem) {
    let role = match message.role {
        Role::User => "you".cyan(),
        Role::Assistant => "agent".green(),
        Role::System => "system".dimmed(),
    };
    println!("  {} {} {}", role.bold(), "│".dimmed(), message.created_at.dimmed());
    for line in message.content.lines() {
        println!("    {line}");
    }
    println!();
}
