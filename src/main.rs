//! Calcbot: chat with a Gemini model that can call arithmetic tools.
//!
//! Usage:
//!   calcbot                      Run the example query, then chat on stdin
//!   calcbot --skip-example       Go straight to the chat prompt
//!   calcbot --model <id>         Use a different Gemini model

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::info;

use calcbot::chat::{ChatLoop, PromptTemplate};
use calcbot::config;
use calcbot::inference::GeminiClient;
use calcbot::tools::ToolRegistry;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "calcbot")]
#[command(version = "0.1.0")]
#[command(about = "Interactive AI calculator backed by Gemini tool calling")]
struct Cli {
    /// Path to the config file (defaults to ~/.calcbot/calcbot.toml).
    #[arg(long)]
    config: Option<String>,

    /// Log level (debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Model identifier. Overrides the config file and CALCBOT_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// Skip the startup example query.
    #[arg(long)]
    skip_example: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Pick up GOOGLE_API_KEY and friends from ./.env if present
    let _ = dotenvy::dotenv();

    let config_path = cli
        .config
        .as_deref()
        .map(config::resolve_path)
        .unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    cfg.apply_env(|key| std::env::var(key).ok());
    if let Some(model) = cli.model {
        cfg.model = model;
    }
    config::validate_config(&cfg)?;

    let registry = ToolRegistry::subset(cfg.tools.as_slice())?;
    let client = GeminiClient::new(&cfg, &registry);
    info!(
        "Using model {} (temperature {}, tools: {})",
        client.model(),
        cfg.temperature,
        registry.names().join(", ")
    );

    println!("{}", "AI Calculator".bold());

    let mut chat = ChatLoop::new(client, PromptTemplate::new(&cfg.system_prompt), registry);
    let mut stdout = std::io::stdout().lock();

    if !cli.skip_example {
        chat.run_example(&mut stdout).await?;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    chat.run(stdin, &mut stdout).await?;

    Ok(())
}
