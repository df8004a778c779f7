use super::prompts::{or_prompt, prompt_password};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviebox_client::Moviebox;
use moviebox_models::{LoginRequest, RegisterRequest};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_register(
    client: &Moviebox,
    email: Option<String>,
    username: Option<String>,
    output: &Output,
) -> Result<()> {
    let email = or_prompt(email, "Email")?;
    let username = or_prompt(username, "Username")?;
    let password = prompt_password("Password")?;
    if password.is_empty() {
        return Err(eyre!("Password cannot be empty"));
    }
    if prompt_password("Confirm password")? != password {
        return Err(eyre!("Passwords do not match"));
    }

    let identity = client
        .auth
        .register_and_login(&RegisterRequest { email, password, username })
        .await?;
    output.success(format!("Registered and logged in as {}", identity.username));
    Ok(())
}

pub async fn run_login(client: &Moviebox, email: Option<String>, output: &Output) -> Result<()> {
    let email = or_prompt(email, "Email")?;
    let password = prompt_password("Password")?;

    let identity = client.auth.login(&LoginRequest { email, password }).await?;
    output.success(format!("Logged in as {}", identity.username));
    Ok(())
}

pub fn run_logout(client: &Moviebox, output: &Output) -> Result<()> {
    if !client.session().is_authenticated() {
        output.info("Not logged in");
        return Ok(());
    }
    client.auth.logout();
    output.success("Logged out");
    Ok(())
}

pub fn run_whoami(client: &Moviebox, output: &Output) -> Result<()> {
    let identity = client.session().identity();
    output.emit(&json!({ "identity": &identity, "api": client.base_url().as_str() }), || match &identity {
        Some(identity) => println!(
            "{} {} <{}>",
            "Logged in as".bright_white(),
            identity.username.bright_cyan().bold(),
            identity.email
        ),
        None => println!("{}", "Not logged in".dimmed()),
    });
    Ok(())
}
