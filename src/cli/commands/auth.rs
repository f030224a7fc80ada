use std::io::{BufRead, IsTerminal, Write};

use colored::Colorize;
use serde_json::json;

use crate::cli::commands::with_spinner;
use crate::cli::context::AppContext;
use crate::cli::output;
use crate::core::errors::{Result, VerseError};
use crate::core::models::user::{
    UserItem, UserLoginRequest, UserLoginResponse, UserRegisterRequest, UserRegisterResponse,
    UserUpdateRequest,
};
use crate::core::services::logger::meta;

/// Execute `verse login`.
///
/// Stores the returned token so later commands are authenticated.
pub fn login(ctx: &AppContext, email: &str, password: Option<&str>) -> Result<()> {
    let password = resolve_password(password)?;
    let request = UserLoginRequest {
        email: email.to_string(),
        password,
    };

    let response = with_spinner(ctx, "Signing in...", ctx.api.login(&request))?;
    let login: UserLoginResponse = response.envelope()?;
    ctx.api.pipeline().establish_session(&login.access_token)?;

    ctx.logger.info(
        "User logged in",
        meta(json!({ "email": email, "token_type": login.token_type })),
    );
    output::success(&format!("Logged in as {}", email.cyan()));
    Ok(())
}

/// Execute `verse register`.
pub fn register(
    ctx: &AppContext,
    email: &str,
    password: Option<&str>,
    nickname: Option<&str>,
) -> Result<()> {
    let password = resolve_password(password)?;
    let request = UserRegisterRequest {
        email: email.to_string(),
        password,
        nickname: nickname.map(str::to_string),
    };

    let response = with_spinner(ctx, "Creating account...", ctx.api.register(&request))?;
    let user: UserRegisterResponse = response.envelope()?;

    ctx.logger.info(
        "User registered",
        meta(json!({ "id": user.id, "email": email })),
    );
    let registered_email = user.email.as_deref().unwrap_or(email);
    output::success(&format!(
        "Account {} created for {}",
        user.id,
        registered_email.cyan()
    ));
    if let Some(nickname) = &user.nickname {
        println!("  Nickname: {nickname}");
    }
    println!("  Run 'verse login --email {email}' to sign in.");
    Ok(())
}

/// Execute `verse logout`.
pub fn logout(ctx: &AppContext) -> Result<()> {
    if !ctx.api.pipeline().has_session() {
        output::warning("No stored session");
        return Ok(());
    }
    ctx.api.pipeline().end_session()?;
    ctx.logger.info("User logged out", None);
    output::success("Logged out");
    Ok(())
}

/// Execute `verse me`.
pub fn me(ctx: &AppContext) -> Result<()> {
    ctx.require_session()?;

    let response = with_spinner(ctx, "Loading profile...", ctx.api.get_me())?;
    let user: UserItem = response.envelope()?;
    print_user(&user);
    Ok(())
}

/// Execute `verse profile --nickname`.
pub fn update_profile(ctx: &AppContext, nickname: &str) -> Result<()> {
    ctx.require_session()?;

    let request = UserUpdateRequest {
        nickname: nickname.to_string(),
    };
    let response = with_spinner(ctx, "Updating profile...", ctx.api.update_profile(&request))?;
    let user: UserItem = response.envelope()?;

    ctx.logger
        .info("Profile updated", meta(json!({ "id": user.id })));
    output::success(&format!("Nickname set to {}", user.nickname.cyan()));
    Ok(())
}

fn print_user(user: &UserItem) {
    output::header(&user.nickname);
    println!("  {:<10} {}", "id".dimmed(), user.id);
    println!("  {:<10} {}", "email".dimmed(), user.email);
    println!("  {:<10} {}", "joined".dimmed(), user.created_at);
}

/// Use the flag value, or read one line from stdin.
fn resolve_password(flag: Option<&str>) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password.to_string());
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("  Password: ");
        std::io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();

    if password.is_empty() {
        return Err(VerseError::InvalidInput {
            detail: "Password is empty. Pass --password or pipe it on stdin.".into(),
        });
    }
    Ok(password)
}
