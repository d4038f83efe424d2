//! Persisted user preferences: debug mode, custom RPC URL, gas price option.
//!
//! The store is one namespaced JSON blob, loaded once at startup and written
//! back on every mutation. The custom RPC URL is only honored in debug mode;
//! everything else always resolves to the fixed default endpoint.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::chain_config::DEFAULT_RPC_URL;

/// Fallback gas price (20 gwei) when the network price is unavailable.
pub const DEFAULT_GAS_PRICE_WEI: u128 = 20_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasPriceOption {
    Low,
    #[default]
    Average,
    Fast,
}

impl GasPriceOption {
    pub fn multiplier_percent(self) -> u32 {
        match self {
            GasPriceOption::Low => gas_util::MULTIPLIER_LOW,
            GasPriceOption::Average => gas_util::MULTIPLIER_AVERAGE,
            GasPriceOption::Fast => gas_util::MULTIPLIER_FAST,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GasPriceOption::Low => "Low (Slower)",
            GasPriceOption::Average => "Average",
            GasPriceOption::Fast => "Fast (Higher Fee)",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PersistedSettings {
    rpc_url: String,
    debug_mode: bool,
    gas_price_option: GasPriceOption,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            debug_mode: false,
            gas_price_option: GasPriceOption::Average,
        }
    }
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    state: RwLock<PersistedSettings>,
}

impl SettingsStore {
    /// Non-persisted store with default settings, mainly for tests and tools.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(PersistedSettings::default()),
        }
    }

    /// Loads the persisted blob, falling back to defaults when the file is
    /// missing or unreadable. Until this has run, callers holding no store
    /// must use `DEFAULT_RPC_URL` directly, never a blank URL.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!("settings file unreadable, using defaults: {err}");
                PersistedSettings::default()
            }),
            Err(_) => PersistedSettings::default(),
        };
        Self {
            path: Some(path),
            state: RwLock::new(state),
        }
    }

    pub fn debug_mode(&self) -> bool {
        self.state.read().debug_mode
    }

    pub fn rpc_url(&self) -> String {
        self.state.read().rpc_url.clone()
    }

    pub fn gas_price_option(&self) -> GasPriceOption {
        self.state.read().gas_price_option
    }

    pub fn set_debug_mode(&self, debug_mode: bool) -> Result<()> {
        self.state.write().debug_mode = debug_mode;
        self.persist()
    }

    pub fn set_rpc_url(&self, rpc_url: impl Into<String>) -> Result<()> {
        self.state.write().rpc_url = rpc_url.into();
        self.persist()
    }

    pub fn set_gas_price_option(&self, option: GasPriceOption) -> Result<()> {
        self.state.write().gas_price_option = option;
        self.persist()
    }

    /// Effective endpoint for the next RPC call, read fresh every time since
    /// debug mode and the stored URL may both change between calls.
    pub fn resolve_rpc_url(&self) -> String {
        let state = self.state.read();
        if state.debug_mode {
            state.rpc_url.clone()
        } else {
            DEFAULT_RPC_URL.to_string()
        }
    }

    /// Applies the selected multiplier to a network base price. Outside debug
    /// mode the base price passes through untouched.
    pub fn adjusted_gas_price(&self, base_gas_price: u128) -> u128 {
        let state = self.state.read();
        if !state.debug_mode {
            return base_gas_price;
        }
        gas_util::adjust_gas_price(base_gas_price, state.gas_price_option.multiplier_percent())
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot = self.state.read().clone();
        let raw = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, raw).with_context(|| format!("writing settings to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rpc_url_ignores_custom_url_outside_debug() {
        let store = SettingsStore::in_memory();
        store.set_rpc_url("https://custom").unwrap();
        assert_eq!(store.resolve_rpc_url(), DEFAULT_RPC_URL);
    }

    #[test]
    fn test_resolve_rpc_url_honors_custom_url_in_debug() {
        let store = SettingsStore::in_memory();
        store.set_rpc_url("https://custom").unwrap();
        store.set_debug_mode(true).unwrap();
        assert_eq!(store.resolve_rpc_url(), "https://custom");
    }

    #[test]
    fn test_adjusted_gas_price_passthrough_outside_debug() {
        let store = SettingsStore::in_memory();
        store.set_gas_price_option(GasPriceOption::Fast).unwrap();
        assert_eq!(store.adjusted_gas_price(1000), 1000);
    }

    #[test]
    fn test_adjusted_gas_price_multiplies_in_debug() {
        let store = SettingsStore::in_memory();
        store.set_debug_mode(true).unwrap();
        store.set_gas_price_option(GasPriceOption::Fast).unwrap();
        assert_eq!(store.adjusted_gas_price(1000), 1500);
        store.set_gas_price_option(GasPriceOption::Low).unwrap();
        assert_eq!(store.adjusted_gas_price(1000), 800);
    }

    #[test]
    fn test_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app-store.json");

        let store = SettingsStore::load(&path);
        store.set_debug_mode(true).unwrap();
        store.set_rpc_url("https://custom").unwrap();
        store.set_gas_price_option(GasPriceOption::Fast).unwrap();

        let reloaded = SettingsStore::load(&path);
        assert!(reloaded.debug_mode());
        assert_eq!(reloaded.rpc_url(), "https://custom");
        assert_eq!(reloaded.gas_price_option(), GasPriceOption::Fast);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app-store.json");
        fs::write(&path, "not json at all").unwrap();

        let store = SettingsStore::load(&path);
        assert!(!store.debug_mode());
        assert_eq!(store.resolve_rpc_url(), DEFAULT_RPC_URL);
    }
}
