use colored::Colorize;
use serde_json::json;

use crate::cli::commands::with_spinner;
use crate::cli::context::AppContext;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::poetry::{
    PoetrySearchItem, PoetrySearchRequest, PoetrySearchResponse, SearchType,
};
use crate::core::services::logger::meta;

/// Execute `verse search <query>`.
///
/// Search is public on the backend; the token is still sent when one is
/// stored.
pub fn execute(
    ctx: &AppContext,
    query: &str,
    search_type: Option<SearchType>,
    top_k: Option<u32>,
) -> Result<()> {
    let request = PoetrySearchRequest {
        query: query.to_string(),
        search_type,
        top_k,
    };
    let response = with_spinner(ctx, "Searching...", ctx.api.search_poetry(&request))?;
    let results: PoetrySearchResponse = response.envelope()?;

    ctx.logger.info(
        "Poetry search",
        meta(json!({ "query": query, "total": results.total })),
    );

    if results.items.is_empty() {
        output::header(&format!("No poems match '{query}'"));
        return Ok(());
    }

    output::header(&format!("{} results for '{query}'", results.total));
    for item in &results.items {
        print_item(item);
    }
    Ok(())
}

fn print_item(item: &PoetrySearchItem) {
    let score = item
        .score
        .map(|s| format!("{s:.2}"))
        .unwrap_or_default();
    println!(
        "\n  {} {} {} {}",
        item.title.bold(),
        format!("[{}] {}", item.dynasty, item.writer).dimmed(),
        score.dimmed(),
        format!("#{}", item.id).dimmed(),
    );
    for line in item.content.lines() {
        println!("    {line}");
    }
}
