use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{Input, Password};
use marquee_core::ApiClient;
use marquee_core::model::{Credentials, Registration, Session};
use tracing::debug;

/// How session commands authenticate. Anything missing is prompted for.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    #[arg(long, global = true, env = "MARQUEE_USERNAME")]
    pub username: Option<String>,
    #[arg(long, global = true, env = "MARQUEE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Reuse an existing session token instead of logging in
    #[arg(
        long,
        global = true,
        env = "MARQUEE_SESSION_TOKEN",
        hide_env_values = true
    )]
    pub token: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    pub dob: Option<String>,
}

fn username(args: &SessionArgs) -> Result<String> {
    match args.username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Ok(Input::<String>::new().with_prompt("Username").interact_text()?),
    }
}

fn password(args: &SessionArgs, confirm: bool) -> Result<String> {
    if let Some(password) = args.password.clone().filter(|p| !p.is_empty()) {
        return Ok(password);
    }
    let prompt = Password::new().with_prompt("Password");
    let prompt = if confirm {
        prompt.with_confirmation("Repeat password", "Passwords do not match")
    } else {
        prompt
    };
    Ok(prompt.interact()?)
}

pub async fn login(client: &ApiClient, args: &SessionArgs) -> Result<Session> {
    let credentials = Credentials {
        username: username(args)?,
        password: password(args, false)?,
    };
    client.login(&credentials).await.context("login failed")
}

/// Attach a session to `client`, from `--token` when given.
pub async fn sign_in(client: &ApiClient, args: &SessionArgs) -> Result<()> {
    if let Some(token) = args.token.clone().filter(|t| !t.trim().is_empty()) {
        debug!("using session token from arguments");
        client.set_token(Some(token)).await;
        return Ok(());
    }
    login(client, args).await.map(|_| ())
}

pub async fn register(
    client: &ApiClient,
    session: &SessionArgs,
    args: RegisterArgs,
) -> Result<Option<String>> {
    let username = username(session)?;
    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let registration = Registration {
        username,
        email,
        password: password(session, true)?,
        phone: args.phone,
        dob: args.dob,
    };
    client
        .register(&registration)
        .await
        .context("registration failed")
}
