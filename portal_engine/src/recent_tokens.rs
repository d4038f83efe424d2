//! Bounded, persisted list of tokens deployed through the portal.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

pub const MAX_RECENT_TOKENS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub denom: String,
    pub total_supply: String,
    pub decimals: u8,
    pub logo_base64: String,
    pub tx_hash: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
}

/// Newest-first list, capped at `MAX_RECENT_TOKENS`, persisted as JSON.
/// A corrupt or missing file degrades to an empty list.
pub struct RecentTokensStore {
    path: Option<PathBuf>,
    tokens: RwLock<Vec<DeployedToken>>,
}

impl RecentTokensStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tokens: RwLock::new(Vec::new()),
        }
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tokens = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!("failed to parse stored tokens, starting empty: {err}");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self {
            path: Some(path),
            tokens: RwLock::new(tokens),
        }
    }

    pub fn list(&self) -> Vec<DeployedToken> {
        self.tokens.read().clone()
    }

    /// Prepends a deployment, dropping the oldest entry beyond capacity.
    pub fn add(&self, token: DeployedToken) -> Result<()> {
        {
            let mut tokens = self.tokens.write();
            tokens.insert(0, token);
            tokens.truncate(MAX_RECENT_TOKENS);
        }
        self.persist()
    }

    pub fn clear(&self) -> Result<()> {
        self.tokens.write().clear();
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path)
                    .with_context(|| format!("removing {}", path.display()))?;
            }
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot = self.tokens.read().clone();
        let raw = serde_json::to_string(&snapshot)?;
        fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
    }
}
