//! Terminal client for the todo service.
//!
//! Widgets print to stdout; the prompt reads commands from stdin and turns
//! them into intents. Logs go to stderr, filtered by `RUST_LOG`.

mod command;
mod widgets;

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use command::{Command, ParseError};
use todo_core::{intent_channel, AppCoordinator, ClientConfig, HttpTodoService, ReqwestTransport, TodoClient};
use widgets::TermFactory;

#[derive(Parser, Debug)]
#[command(name = "todo-term", version, about = "Terminal client for the todo service")]
struct Cli {
    /// JSON config file; when absent, TODO_* environment variables are used.
    /// The user selected at exit is saved back to it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the todo service.
    #[arg(long)]
    api_url: Option<String>,

    /// User to select at startup, if the service knows them.
    #[arg(long)]
    user: Option<String>,

    /// Handle one command at a time instead of letting them overlap.
    #[arg(long)]
    serialize_intents: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                ClientConfig::from_json(&raw)?
            }
            None => ClientConfig::from_env()?,
        };
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(user) = &self.user {
            config.remembered_user = Some(user.clone());
        }
        config.serialize_intents |= self.serialize_intents;
        Ok(config)
    }
}

/// Record `user` as the remembered user in the config file at `path`,
/// leaving its other settings as they are on disk.
fn remember_user(path: &Path, user: &str) -> anyhow::Result<()> {
    let mut config = match std::fs::read_to_string(path) {
        Ok(raw) => ClientConfig::from_json(&raw)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ClientConfig::default(),
        Err(err) => return Err(err).with_context(|| format!("reading config file {}", path.display())),
    };
    if config.remembered_user.as_deref() == Some(user) {
        return Ok(());
    }
    config.remembered_user = Some(user.to_string());
    std::fs::write(path, config.to_json()?).with_context(|| format!("writing config file {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    info!(api_url = %config.api_url, "starting");

    let client = TodoClient::new(&config.api_url)?;
    let service = HttpTodoService::new(client, ReqwestTransport::new());
    let coordinator = Arc::new(AppCoordinator::new(service, config.coordinator_config()));

    let (tx, rx) = intent_channel();
    let mut factory = TermFactory::default();
    coordinator.initialize(&mut factory, tx).await;
    let input = factory.take_input().context("todo input was not constructed")?;
    let visible = factory.visible();
    drop(factory);

    let looper = tokio::spawn(Arc::clone(&coordinator).run(rx));
    println!("{}", command::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let shown = visible.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match command::parse(&line, &shown) {
            Ok(Command::Intent(intent)) => {
                if input.send(intent).is_err() {
                    break;
                }
            }
            Ok(Command::Help) => println!("{}", command::HELP),
            Ok(Command::Quit) => break,
            Err(ParseError::Empty) => {}
            Err(err) => println!("? {err}"),
        }
    }

    drop(input);
    looper.await?;

    let user = coordinator.current_user().await;
    if let Some(path) = cli.config.as_deref().filter(|_| !user.is_placeholder()) {
        remember_user(path, &user.name)?;
        info!(user = %user.name, config = %path.display(), "remembered user");
    }
    info!("bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembered_user_is_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.json");
        std::fs::write(&path, r#"{"api_url":"http://todo.test","remembered_user":"al"}"#).unwrap();

        remember_user(&path, "bo").unwrap();

        let config = ClientConfig::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.remembered_user.as_deref(), Some("bo"));
        assert_eq!(config.api_url, "http://todo.test");
    }

    #[test]
    fn missing_config_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.json");

        remember_user(&path, "al").unwrap();

        let config = ClientConfig::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.remembered_user.as_deref(), Some("al"));
    }
}
