use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{CardConfig, DEFAULT_REWARD_EVERY, DEFAULT_STORAGE_KEY, DEFAULT_TOTAL_PUNCHES};

pub const DEFAULT_SETTINGS_FILE: &str = "punchcard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub total_punches: usize,
    pub reward_every: usize,
    pub storage_key: String,
    pub store_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_punches: DEFAULT_TOTAL_PUNCHES,
            reward_every: DEFAULT_REWARD_EVERY,
            storage_key: DEFAULT_STORAGE_KEY.into(),
            store_path: default_store_path(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    total_punches: Option<usize>,
    reward_every: Option<usize>,
    storage_key: Option<String>,
    store_path: Option<PathBuf>,
}

/// Command-line values; each one set here beats the file and environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub total_punches: Option<usize>,
    pub reward_every: Option<usize>,
    pub storage_key: Option<String>,
    pub store_path: Option<PathBuf>,
}

impl Settings {
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(v) = overrides.total_punches {
            self.total_punches = v;
        }
        if let Some(v) = overrides.reward_every {
            self.reward_every = v;
        }
        if let Some(v) = &overrides.storage_key {
            self.storage_key = v.clone();
        }
        if let Some(v) = &overrides.store_path {
            self.store_path = v.clone();
        }
        self
    }

    pub fn card_config(&self) -> anyhow::Result<CardConfig> {
        CardConfig::new(self.total_punches, self.reward_every, self.storage_key.clone())
            .context("settings do not describe a valid punch card")
    }
}

/// Defaults, then the settings file (if present), then the environment.
pub fn load_settings(settings_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = settings_path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file_settings(&mut settings, &raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && settings_path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.total_punches {
        settings.total_punches = v;
    }
    if let Some(v) = file_cfg.reward_every {
        settings.reward_every = v;
    }
    if let Some(v) = file_cfg.storage_key {
        settings.storage_key = v;
    }
    if let Some(v) = file_cfg.store_path {
        settings.store_path = v;
    }
    Ok(())
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    for name in ["PUNCHCARD_TOTAL_PUNCHES", "APP__TOTAL_PUNCHES"] {
        if let Some(parsed) = var(name).and_then(|v| v.trim().parse::<usize>().ok()) {
            settings.total_punches = parsed;
        }
    }

    for name in ["PUNCHCARD_REWARD_EVERY", "APP__REWARD_EVERY"] {
        if let Some(parsed) = var(name).and_then(|v| v.trim().parse::<usize>().ok()) {
            settings.reward_every = parsed;
        }
    }

    if let Some(v) = var("PUNCHCARD_STORAGE_KEY") {
        settings.storage_key = v;
    }

    if let Some(v) = var("PUNCHCARD_STORE_PATH") {
        settings.store_path = PathBuf::from(v);
    }
}

pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|base| base.join("punchcard"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cards.json")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
