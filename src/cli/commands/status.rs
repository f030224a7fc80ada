use colored::Colorize;

use crate::cli::context::AppContext;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::services::logger::LOG_CAPACITY;

/// Execute `verse status`.
///
/// Local state only; nothing is sent to the backend.
pub fn execute(ctx: &AppContext) -> Result<()> {
    output::header(&format!("verse v{}", env!("CARGO_PKG_VERSION")));
    println!("  Data dir: {}", ctx.data_dir.display().to_string().cyan());
    println!("  Backend:  {}", ctx.base_url.cyan());

    println!("\n{}", "  Session".bold());
    if ctx.api.pipeline().has_session() {
        output::success("Token stored");
    } else {
        output::warning("Not logged in");
        println!("  Run 'verse login --email <you@example.com>' to sign in.");
    }

    println!("\n{}", "  Logs".bold());
    println!(
        "  {} {} of {} entries buffered (level {})",
        "•".dimmed(),
        ctx.logger.len(),
        LOG_CAPACITY,
        ctx.logger.level(),
    );

    ctx.logger.flush();
    let failures = ctx.logger.failures();
    match failures.last() {
        None => output::success("Log archive up to date"),
        Some(last) => {
            output::warning(&format!(
                "{} archive write(s) failed, last at {}",
                failures.len(),
                last.at.format("%Y-%m-%d %H:%M:%S"),
            ));
            println!("  {}", last.detail.dimmed());
        }
    }

    Ok(())
}
