mod input;
mod screen;

use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, HttpTransport, SessionController, SessionExit};
use shared::domain::Level;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::screen::{TerminalNavigation, TerminalPresentation};

#[derive(Parser, Debug)]
#[command(about = "Play shiritori against a remote oracle from the terminal")]
struct Args {
    /// Settings file; defaults to ./shiritori.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    /// easy, medium or hard
    #[arg(long)]
    level: Option<Level>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    info!(server_url = %settings.server_url, "starting shiritori session");

    let transport = Arc::new(HttpTransport::new(&settings)?);
    if let Some(level) = args.level {
        let confirmed = transport
            .select_level(level)
            .await
            .context("failed to select level")?;
        println!("レベル: {confirmed}");
    }
    let results_url = settings.results_url()?;

    println!("単語を入力して Enter。:reset でリセット、:quit で終了。");
    let (input_tx, input_rx) = mpsc::channel(16);
    input::spawn_stdin_reader(input_tx);

    let controller = SessionController::new(
        settings.controller_settings(),
        transport,
        Box::new(TerminalPresentation::new(io::stdout())),
        Box::new(TerminalNavigation::new(results_url, io::stdout())),
    );
    match controller.run(input_rx).await {
        SessionExit::Results => info!("game finished"),
        SessionExit::InputClosed => info!("input closed, leaving the session"),
    }
    Ok(())
}
