use std::error::Error;
use std::io::BufRead;

use super::{CmdResult, Context};
use crate::api::AuthApi;
use crate::cli::commands::{LoginArgs, SignupArgs};
use crate::cli::output::{SignupJson, WhoamiJson};
use crate::io::lock::FileLock;
use crate::io::{cache_io, session_io};
use crate::model::session::Session;

/// Use `--password` when given, else read one line from stdin
fn read_password(arg: Option<String>) -> Result<String, Box<dyn Error>> {
    let password = match arg {
        Some(p) => p,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    Ok(password)
}

pub async fn cmd_login(ctx: &Context, args: LoginArgs) -> CmdResult {
    ctx.require_online("login")?;
    let password = read_password(args.password)?;
    let resp = ctx.api().login(args.email.trim(), &password).await?;

    let _lock = FileLock::acquire_default(&ctx.home)?;
    // Cached projects belong to whoever was logged in before
    let previous = session_io::read_session(&ctx.home).and_then(|s| s.user);
    if previous.is_some_and(|u| u.id != resp.user.id) {
        cache_io::clear_store(&ctx.home)?;
    }
    let session = Session::new(resp.token, Some(resp.user));
    session_io::write_session(&ctx.home, &session)?;
    tracing::debug!(user = session.username(), "session stored");

    if ctx.json {
        let out = WhoamiJson {
            logged_in: true,
            user: session.user.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match resp.message {
            Some(message) => println!("{}", message),
            None => println!("logged in as {}", session.username().unwrap_or("?")),
        }
    }
    Ok(())
}

pub async fn cmd_signup(ctx: &Context, args: SignupArgs) -> CmdResult {
    ctx.require_online("signup")?;
    let password = read_password(args.password)?;
    let resp = ctx
        .api()
        .signup(args.username.trim(), args.email.trim(), &password)
        .await?;

    if ctx.json {
        let out = SignupJson {
            message: resp.message.as_deref(),
            user_id: resp.user_id.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "{}",
            resp.message.as_deref().unwrap_or("account created; run `devsync login`")
        );
    }
    Ok(())
}

pub fn cmd_logout(ctx: &Context) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.home)?;
    let had_session = session_io::clear_session(&ctx.home)?;
    cache_io::clear_store(&ctx.home)?;
    if !ctx.json {
        println!("{}", if had_session { "logged out" } else { "not logged in" });
    }
    Ok(())
}

pub fn cmd_whoami(ctx: &Context) -> CmdResult {
    let session = session_io::read_session(&ctx.home);
    if ctx.json {
        let out = WhoamiJson {
            logged_in: session.is_some(),
            user: session.as_ref().and_then(|s| s.user.as_ref()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    match session.as_ref().and_then(|s| s.user.as_ref()) {
        Some(user) if !user.email.is_empty() => println!("{} <{}>", user.username, user.email),
        Some(user) => println!("{}", user.username),
        None if session.is_some() => println!("logged in (unknown user)"),
        None => println!("not logged in"),
    }
    Ok(())
}
