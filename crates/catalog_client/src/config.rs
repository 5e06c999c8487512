use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;

use crate::{pagination::DEFAULT_WINDOW_SIZE, ReleaseOverviewParams};

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub api_token: Option<String>,
    pub currency: String,
    pub artist_per_page: u32,
    pub label_per_page: u32,
    pub master_per_page: u32,
    pub include_master: bool,
    pub page_window: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".into(),
            api_token: None,
            currency: "USD".into(),
            artist_per_page: 25,
            label_per_page: 25,
            master_per_page: 10,
            include_master: true,
            page_window: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl ClientSettings {
    pub fn release_overview_params(&self) -> ReleaseOverviewParams {
        ReleaseOverviewParams {
            include_master: self.include_master,
            currency: self.currency.clone(),
            master_per_page: self.master_per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    api_token: Option<String>,
    currency: Option<String>,
    artist_per_page: Option<u32>,
    label_per_page: Option<u32>,
    master_per_page: Option<u32>,
    include_master: Option<bool>,
    page_window: Option<u32>,
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut ClientSettings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, "config: ignoring unreadable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.api_token {
        settings.api_token = Some(v);
    }
    if let Some(v) = file_cfg.currency {
        settings.currency = v;
    }
    if let Some(v) = file_cfg.artist_per_page {
        settings.artist_per_page = v;
    }
    if let Some(v) = file_cfg.label_per_page {
        settings.label_per_page = v;
    }
    if let Some(v) = file_cfg.master_per_page {
        settings.master_per_page = v;
    }
    if let Some(v) = file_cfg.include_master {
        settings.include_master = v;
    }
    if let Some(v) = file_cfg.page_window {
        settings.page_window = v;
    }
}

fn apply_env(settings: &mut ClientSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CATALOG_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = var("CATALOG_TOKEN") {
        settings.api_token = Some(v);
    }

    if let Some(v) = var("APP__CURRENCY") {
        settings.currency = v;
    }

    if let Some(v) = var("APP__ARTIST_PER_PAGE").and_then(|v| v.parse().ok()) {
        settings.artist_per_page = v;
    }
    if let Some(v) = var("APP__LABEL_PER_PAGE").and_then(|v| v.parse().ok()) {
        settings.label_per_page = v;
    }
    if let Some(v) = var("APP__MASTER_PER_PAGE").and_then(|v| v.parse().ok()) {
        settings.master_per_page = v;
    }
    if let Some(v) = var("APP__PAGE_WINDOW").and_then(|v| v.parse().ok()) {
        settings.page_window = v;
    }
}
