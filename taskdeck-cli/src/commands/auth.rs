//! Auth commands - sign in, sign up, sign out, whoami

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use taskdeck_core::services::view::sanitize_terminal;
use taskdeck_core::services::EntryPoint;
use taskdeck_core::{AppController, Outcome, SignUpRequest};

use super::{finish, get_context, get_logger, print_notices, with_spinner};
use crate::output;

/// Sign-up fields; anything missing is prompted for
#[derive(Default, clap::Args)]
pub struct SignUpArgs {
    /// Username
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

fn prompt_or(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}

/// Password from `TASKDECK_PASSWORD` or a hidden prompt
fn read_password(confirm: bool) -> Result<String> {
    if let Ok(password) = std::env::var("TASKDECK_PASSWORD") {
        return Ok(password);
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

/// Prompt for credentials and sign in; shared with the shell
pub fn sign_in_flow(controller: &mut AppController, username: Option<String>) -> Result<Outcome> {
    let username = prompt_or(username, "Username")?;
    let password = read_password(false)?;
    Ok(with_spinner("Signing in...", || {
        controller.sign_in(&username, &password)
    }))
}

/// Prompt for a new account and register it; shared with the shell
pub fn sign_up_flow(controller: &mut AppController, args: SignUpArgs) -> Result<Outcome> {
    let request = SignUpRequest {
        username: prompt_or(args.username, "Username")?,
        email: prompt_or(args.email, "Email")?,
        first_name: prompt_or(args.first_name, "First name")?,
        last_name: prompt_or(args.last_name, "Last name")?,
        password: read_password(true)?,
    };
    Ok(with_spinner("Creating account...", || controller.sign_up(&request)))
}

pub fn print_welcome(controller: &AppController) {
    if let Some(welcome) = controller.welcome() {
        println!("{}", sanitize_terminal(&welcome).bold());
    }
}

pub fn run_sign_in(username: Option<String>) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = ctx.controller();

    let outcome = sign_in_flow(&mut controller, username)?;
    let authenticated = controller.is_authenticated();
    finish(&mut controller, outcome, &logger, "signin");

    if authenticated {
        print_welcome(&controller);
        println!(
            "  {} task(s) loaded",
            controller.tasks().len().to_string().cyan()
        );
    }
    Ok(())
}

pub fn run_sign_up(args: SignUpArgs) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = ctx.controller();

    let outcome = sign_up_flow(&mut controller, args)?;
    finish(&mut controller, outcome, &logger, "signup");
    Ok(())
}

pub fn run_sign_out() -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context()?;
    let mut controller = ctx.controller();
    controller.restore_session();

    let outcome = controller.sign_out();
    finish(&mut controller, outcome, &logger, "signout");
    Ok(())
}

pub fn run_whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let mut controller = ctx.controller();
    controller.restore_session();
    print_notices(&mut controller);

    let Some(session) = controller.session() else {
        if json {
            println!("{}", serde_json::json!({ "signedIn": false }));
        } else {
            output::warning("Not signed in");
        }
        return Ok(());
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "signedIn": true,
                "user": session.user,
                "apiUrl": ctx.config.base_url,
            })
        );
    } else {
        print_user(&ctx.config.base_url, &session.user);
    }
    Ok(())
}

fn print_user(api_url: &str, user: &taskdeck_core::UserProfile) {
    println!("{}", "Signed in".green().bold());
    println!("  Username: {}", sanitize_terminal(&user.username));
    println!("  Email:    {}", sanitize_terminal(&user.email));
    println!("  User ID:  {}", user.id);
    println!("  Server:   {}", api_url.dimmed());
}
