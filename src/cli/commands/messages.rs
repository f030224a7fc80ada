use crate::cli::commands::conversations::print_message;
use crate::cli::commands::with_spinner;
use crate::cli::context::AppContext;
use crate::core::errors::Result;
use crate::core::models::message::MessageItem;

/// Execute `verse message <id>`.
pub fn show(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.require_session()?;

    let response = with_spinner(ctx, "Loading message...", ctx.api.get_message(id))?;
    let message: MessageItem = response.envelope()?;
    println!();
    print_message(&message);
    Ok(())
}
