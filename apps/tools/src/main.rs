use std::{io::Write, path::PathBuf};

use anyhow::{bail, Context, Result};
use card_core::{
    config::{load_settings, Settings, SettingsOverrides},
    PunchCardController, RecordingRenderer, StampOutcome,
};
use clap::{Parser, Subcommand};
use shared::protocol::CardView;
use storage::{FileStore, KeyValueStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "punchcard-tools")]
#[command(about = "Inspect, stamp and reset stored punch cards")]
struct Cli {
    /// Settings file (defaults to ./punchcard.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON store file holding every card
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[arg(long, global = true)]
    total_punches: Option<usize>,
    #[arg(long, global = true)]
    reward_every: Option<usize>,
    /// Storage key of the card to operate on
    #[arg(long, global = true)]
    key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the status line and the reward message
    Status,
    /// Stamp one cup (0-based index)
    Stamp { index: usize },
    /// Clear every cup on the card
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Dump the rendered card as JSON
    Show,
    /// List the card keys present in the store
    Keys,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    run(cli, settings, &mut stdout.lock())
}

fn cli_overrides(cli: &Cli) -> SettingsOverrides {
    SettingsOverrides {
        total_punches: cli.total_punches,
        reward_every: cli.reward_every,
        storage_key: cli.key.clone(),
        store_path: cli.store.clone(),
    }
}

/// `settings` is the file and environment layer; command-line flags go on top.
fn run(cli: Cli, settings: Settings, out: &mut impl Write) -> Result<()> {
    let settings = settings.with_overrides(&cli_overrides(&cli));
    let card_config = settings.card_config()?;
    let store = FileStore::open(&settings.store_path)?;
    tracing::debug!(
        store = %store.path().display(),
        key = card_config.storage_key(),
        "opened punch card"
    );

    if let Command::Keys = cli.command {
        for key in store.keys()? {
            writeln!(out, "{key}")?;
        }
        return Ok(());
    }

    let mut card = PunchCardController::initialize(card_config, store, RecordingRenderer::new());

    match cli.command {
        Command::Status | Command::Keys => {}
        Command::Stamp { index } => {
            let outcome = card
                .stamp(index)
                .with_context(|| format!("could not stamp cup {index}"))?;
            if outcome == StampOutcome::AlreadyStamped {
                writeln!(out, "cup {index} was already stamped")?;
            }
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("refusing to reset the punch card without --yes");
            }
            card.reset();
        }
        Command::Show => {
            let view = card.view();
            writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
            return Ok(());
        }
    }

    if !card.is_persistent() {
        tracing::warn!("punch card change was not saved; it only lasts for this run");
    }

    let view = card
        .renderer()
        .last_view()
        .cloned()
        .unwrap_or_else(|| card.view());
    print_status(&view, out)
}

fn print_status(view: &CardView, out: &mut impl Write) -> Result<()> {
    let cups: String = view
        .cups
        .iter()
        .map(|cup| if cup.pressed { '●' } else { '○' })
        .collect();
    writeln!(out, "{cups}")?;
    writeln!(out, "{}", view.status_text)?;
    if !view.reward_message.is_empty() {
        writeln!(out, "{}", view.reward_message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(settings: Settings, args: &[&str]) -> Result<String> {
        let argv = std::iter::once("punchcard-tools").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).expect("args parse");
        let mut out = Vec::new();
        run(cli, settings, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8"))
    }

    fn run_args(args: &[&str]) -> Result<String> {
        run_with(Settings::default(), args)
    }

    fn store_arg(dir: &tempfile::TempDir) -> String {
        dir.path().join("cards.json").to_string_lossy().into_owned()
    }

    #[test]
    fn status_of_fresh_card() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        let output = run_args(&["--store", &store, "status"]).expect("status");
        assert!(output.contains("0 / 20 punches"));
        assert!(output.starts_with(&"○".repeat(20)));
    }

    #[test]
    fn stamps_persist_between_runs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        for index in 0..9 {
            run_args(&["--store", &store, "stamp", &index.to_string()]).expect("stamp");
        }

        let output = run_args(&["--store", &store, "status"]).expect("status");
        assert!(output.contains("9 / 20 punches"));
        assert!(output.contains("1 more to your next free drink."));

        let output = run_args(&["--store", &store, "stamp", "9"]).expect("stamp");
        assert!(output.contains("Free drink unlocked! 🎉"));
    }

    #[test]
    fn repeated_stamp_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        run_args(&["--store", &store, "stamp", "3"]).expect("stamp");
        let output = run_args(&["--store", &store, "stamp", "3"]).expect("stamp again");
        assert!(output.contains("cup 3 was already stamped"));
        assert!(output.contains("1 / 20 punches"));
    }

    #[test]
    fn out_of_range_stamp_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        let err = run_args(&["--store", &store, "stamp", "20"]).expect_err("out of range");
        assert!(format!("{err:#}").contains("out of range"));
    }

    #[test]
    fn reset_requires_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        run_args(&["--store", &store, "stamp", "0"]).expect("stamp");

        assert!(run_args(&["--store", &store, "reset"]).is_err());
        let output = run_args(&["--store", &store, "status"]).expect("status");
        assert!(output.contains("1 / 20 punches"));

        let output = run_args(&["--store", &store, "reset", "--yes"]).expect("reset");
        assert!(output.contains("0 / 20 punches"));
    }

    #[test]
    fn separate_keys_are_separate_cards() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        run_args(&[
            "--store",
            &store,
            "--key",
            "tea",
            "--total-punches",
            "6",
            "--reward-every",
            "3",
            "stamp",
            "5",
        ])
        .expect("stamp tea");

        let output = run_args(&["--store", &store, "status"]).expect("coffee status");
        assert!(output.contains("0 / 20 punches"));

        let output = run_args(&["--store", &store, "keys"]).expect("keys");
        assert_eq!(output.trim(), "tea");
    }

    #[test]
    fn show_emits_view_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        run_args(&["--store", &store, "stamp", "1"]).expect("stamp");
        let output = run_args(&["--store", &store, "show"]).expect("show");
        let view: CardView = serde_json::from_str(&output).expect("view json");
        assert_eq!(view.cups.len(), 20);
        assert!(view.cups[1].pressed);
        assert_eq!(view.status.stamped_count, 1);
    }

    #[test]
    fn invalid_card_shape_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        assert!(run_args(&["--store", &store, "--reward-every", "30", "status"]).is_err());
    }

    #[test]
    fn stamp_on_corrupt_store_starts_fresh_card() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_arg(&dir);
        std::fs::write(&store, "{ truncated").expect("write");

        let output = run_args(&["--store", &store, "stamp", "0"]).expect("stamp");
        assert!(output.contains("1 / 20 punches"));
        let output = run_args(&["--store", &store, "status"]).expect("status");
        assert!(output.contains("1 / 20 punches"));
    }

    #[test]
    fn given_settings_shape_the_card_and_flags_win() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings {
            total_punches: 12,
            reward_every: 6,
            store_path: dir.path().join("from-settings.json"),
            ..Settings::default()
        };

        let output = run_with(settings.clone(), &["stamp", "0"]).expect("stamp");
        assert!(output.contains("1 / 12 punches"));
        assert!(output.contains("5 more to your next free drink."));
        assert!(dir.path().join("from-settings.json").is_file());

        let output = run_with(settings, &["--total-punches", "6", "--key", "short", "status"])
            .expect("status");
        assert!(output.contains("0 / 6 punches"));
    }
}
