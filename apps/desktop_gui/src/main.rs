mod controller;
mod ui;

use std::path::PathBuf;

use anyhow::anyhow;
use card_core::config::{load_settings, SettingsOverrides};
use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use ui::{PunchCardApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "punchcard")]
#[command(about = "Desktop loyalty punch card")]
struct Args {
    /// Settings file (defaults to ./punchcard.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    store: Option<PathBuf>,
    #[arg(long)]
    key: Option<String>,
    #[arg(long)]
    total_punches: Option<usize>,
    #[arg(long)]
    reward_every: Option<usize>,
    /// Do not read or write the store; the card lasts for this session only
    #[arg(long)]
    ephemeral: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let overrides = SettingsOverrides {
        total_punches: args.total_punches,
        reward_every: args.reward_every,
        storage_key: args.key.clone(),
        store_path: args.store.clone(),
    };
    let startup = StartupConfig {
        settings: load_settings(args.config.as_deref())?.with_overrides(&overrides),
        ephemeral: args.ephemeral,
    };
    let card = startup.open_card()?;
    tracing::info!(
        key = card.config().storage_key(),
        store = %startup.settings.store_path.display(),
        ephemeral = startup.ephemeral,
        "punch card ready"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Punch Card")
            .with_inner_size([420.0, 520.0])
            .with_min_inner_size([360.0, 440.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Punch Card",
        options,
        Box::new(move |_cc| Ok(Box::new(PunchCardApp::bootstrap(card)))),
    )
    .map_err(|err| anyhow!("desktop window failed: {err}"))
}
