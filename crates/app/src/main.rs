mod client;
mod commands;
mod config;
mod error;
mod render;

use std::process::ExitCode;

use clap::Parser;

use crate::{client::Client, commands::Cli, error::Result};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::load(cli.overrides())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finnance={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let mut client = Client::new(&settings.base_url)?;
    if cli.command.needs_server() {
        match settings.password.as_deref() {
            Some(password) if !settings.username.is_empty() => {
                client.login(&settings.username, password).await?;
            }
            _ => tracing::debug!("no credentials configured, requests are anonymous"),
        }
    }

    let now = chrono::Local::now().naive_local();
    commands::run(cli.command, &mut client, now).await
}
