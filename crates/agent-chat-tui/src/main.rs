use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agent_chat_core::Config;

mod app;
mod handler;
mod input;
mod tui;
mod ui;
mod view;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "agent-chat")]
#[command(about = "Chat with an AI agent in your terminal", version)]
struct Cli {
    /// AI provider: ollama, claude or openai
    #[arg(short, long)]
    provider: Option<String>,
    /// Model to use (defaults to the provider's default)
    #[arg(short, long)]
    model: Option<String>,
    /// Base URL of the Ollama server
    #[arg(long)]
    ollama_url: Option<String>,
    /// Opening message shown at the top of the conversation
    #[arg(long)]
    greeting: Option<String>,
    /// Save the effective configuration and exit
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    fn apply(self, mut config: Config) -> Config {
        if self.provider.is_some() {
            config.provider = self.provider;
        }
        if self.model.is_some() {
            config.default_model = self.model;
        }
        if self.ollama_url.is_some() {
            config.ollama_url = self.ollama_url;
        }
        if self.greeting.is_some() {
            config.greeting = self.greeting;
        }
        config
    }
}

/// Log to a file so the alternate screen stays clean
fn init_logging() -> Result<PathBuf> {
    let log_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("agent-chat");
    fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("agent-chat.log");
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let filter = EnvFilter::try_from_env("AGENT_CHAT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();

    Ok(log_path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let write_config = cli.write_config;

    let config = cli.apply(Config::load()?);

    if write_config {
        let path = config.save()?;
        println!("Saved configuration to {}", path.display());
        return Ok(());
    }

    let log_path = init_logging()?;
    tracing::info!(log = %log_path.display(), "agent-chat starting");

    let provider = config.provider()?;
    let service = provider.connect(&config)?;

    tui::install_panic_hook();
    let terminal = tui::init()?;

    let mut app = App::new(terminal, config.greeting(), provider.display_name(), service);
    let mut events = EventHandler::new();
    let result = app.run(&mut events).await;

    tui::restore()?;
    tracing::info!("agent-chat stopped");

    result
}
