use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;

use crate::core::constants::DEFAULT_RPC_URL;
use crate::core::error::ConfigError;
use crate::core::program_registry::ProgramRegistry;

pub const RPC_URL_ENV: &str = "SOLANA_RPC_URL";

/// Backoff schedule for single-transaction fetches.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Total attempts including the first one.
    #[serde(default = "RetryConfig::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "RetryConfig::default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "RetryConfig::default_multiplier")]
    pub multiplier: u32,
    #[serde(default)]
    pub max_delay_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
            initial_delay_ms: Self::default_initial_delay_ms(),
            multiplier: Self::default_multiplier(),
            max_delay_ms: None,
        }
    }
}

impl RetryConfig {
    const fn default_max_attempts() -> u32 {
        5
    }

    const fn default_initial_delay_ms() -> u64 {
        1_000
    }

    const fn default_multiplier() -> u32 {
        2
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_page_size")]
    pub page_size: usize,
    #[serde(default = "HistoryConfig::default_window_days")]
    pub window_days: u32,
    /// Pause between successive full-transaction fetches, success or not.
    #[serde(default = "HistoryConfig::default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
            window_days: Self::default_window_days(),
            request_delay_ms: Self::default_request_delay_ms(),
            retry: RetryConfig::default(),
        }
    }
}

impl HistoryConfig {
    const fn default_page_size() -> usize {
        1_000
    }

    const fn default_window_days() -> u32 {
        90
    }

    const fn default_request_delay_ms() -> u64 {
        500
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Top-level settings for the RPC client, the history fetcher and the
/// exchange registry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "AppConfig::default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "AppConfig::default_commitment")]
    pub commitment: String,
    #[serde(default = "AppConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub history: HistoryConfig,
    /// Exchange name -> program ids added on top of the built-in registry.
    #[serde(default)]
    pub extra_programs: BTreeMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: Self::default_rpc_url(),
            commitment: Self::default_commitment(),
            request_timeout_secs: Self::default_request_timeout_secs(),
            history: HistoryConfig::default(),
            extra_programs: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    fn default_rpc_url() -> String {
        DEFAULT_RPC_URL.to_string()
    }

    fn default_commitment() -> String {
        "confirmed".to_string()
    }

    const fn default_request_timeout_secs() -> u64 {
        30
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Applies `SOLANA_RPC_URL` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            if !url.trim().is_empty() {
                self.rpc_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.rpc_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.rpc_url.clone(),
            source,
        })?;
        self.commitment_config()?;
        if self.history.page_size == 0 || self.history.page_size > 1_000 {
            return Err(ConfigError::Invalid(format!(
                "history.pageSize must be within 1..=1000, got {}",
                self.history.page_size
            )));
        }
        if self.history.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "history.retry.maxAttempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn commitment_config(&self) -> Result<CommitmentConfig, ConfigError> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|err| ConfigError::Invalid(format!("commitment {}: {err}", self.commitment)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Built-in registry extended with `extra_programs`.
    pub fn registry(&self) -> ProgramRegistry {
        ProgramRegistry::builtin().extended(
            self.extra_programs
                .iter()
                .map(|(name, ids)| (name.clone(), ids.clone())),
        )
    }
}
