pub mod agents;
pub mod auth;
pub mod conversations;
pub mod logs;
pub mod messages;
pub mod search;
pub mod status;

use std::future::Future;

use crate::cli::context::AppContext;
use crate::cli::output;

/// Drive a backend call with a spinner showing `msg`.
pub(crate) fn with_spinner<F: Future>(ctx: &AppContext, msg: &str, future: F) -> F::Output {
    let pb = output::spinner(msg);
    let result = ctx.block_on(future);
    output::finish_spinner(&pb);
    result
}

/// Shorten `text` to `max` characters for one-line listings.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let kept: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
