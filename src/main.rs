//! # FAQ Responder (`faq-responder`)
//!
//! Starts the WhatsApp FAQ webhook: loads the corpus, embeds it into the
//! in-memory index, and serves Twilio webhook requests.
//!
//! ## Usage
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...   # or put it in ./.env
//! faq-responder --config ./config/faq.toml --port 8080
//! ```
//!
//! Then expose the port publicly (e.g. `ngrok http 8080`) and set the Twilio
//! WhatsApp sandbox webhook to `https://<public-host>/whatsapp`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use faq_responder::app::AppContext;
use faq_responder::{config, server};

/// FAQ Responder: answers WhatsApp messages from a fixed FAQ corpus.
#[derive(Parser)]
#[command(name = "faq-responder", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/faq.toml` when present, built-in defaults otherwise.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind, overriding `[server].bind`.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding `[server].bind`.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = config::load_env_file(Path::new(config::DEFAULT_ENV_PATH));

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match env_loaded {
        Ok(true) => tracing::debug!("Loaded environment from {}", config::DEFAULT_ENV_PATH),
        Ok(false) => {}
        Err(e) => tracing::warn!("{:#}", e),
    }

    let cli = Cli::parse();

    let mut cfg = config::resolve_config(cli.config.as_deref())?;
    cfg.override_bind(cli.host.as_deref(), cli.port);

    tracing::info!("Starting WhatsApp AI Support Agent");
    let ctx = AppContext::build(&cfg).await?;

    server::run_server(&cfg, Arc::new(ctx)).await
}
