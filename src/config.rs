//! Client tunables. Everything has a default so a partial JSON override is
//! enough.

use serde::Deserialize;

use crate::error::ClientResult;

/// localStorage key holding an optional JSON override.
pub const CONFIG_STORAGE_KEY: &str = "turrest_client_config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub ws_url: String,
    pub reconnect_base_delay_ms: u32,
    pub max_reconnect_attempts: u32,
    pub base_tile_size: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub drag_threshold_px: f64,
    pub toast_duration_ms: f64,
    pub asset_root: String,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8081/ws/lobby".to_string(),
            reconnect_base_delay_ms: 1000,
            max_reconnect_attempts: 5,
            base_tile_size: 32.0,
            min_zoom: 0.25,
            max_zoom: 2.0,
            zoom_step: 0.1,
            drag_threshold_px: 3.0,
            toast_duration_ms: 3000.0,
            asset_root: "assets".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }

    /// Reads the override from localStorage, falling back to defaults.
    pub fn load() -> Self {
        let raw = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(CONFIG_STORAGE_KEY).ok().flatten());
        match raw {
            Some(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring invalid client config: {}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
