use std::path::PathBuf;
use std::time::Duration;

use crate::db::RetryPolicy;

/// Application-level constants
pub const APP_NAME: &str = "PatientLookup";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Retries after the first attempt for timeout-class store failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base of the linear retry backoff.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Upper bound on rows scanned for a bare-digit tax id search.
pub const TAX_ID_SCAN_LIMIT: usize = 200;

/// Upper bound on tax id search results after client-side filtering.
pub const TAX_ID_RESULT_LIMIT: usize = 50;

pub const ENV_DATABASE_PATH: &str = "PATIENT_LOOKUP_DB";
pub const ENV_RETRY_BASE_MS: &str = "PATIENT_LOOKUP_RETRY_BASE_MS";
pub const ENV_MAX_RETRIES: &str = "PATIENT_LOOKUP_MAX_RETRIES";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "patient_lookup=info,warn"
}

/// Get the application data directory
/// ~/PatientLookup/ on all platforms, falling back to the working directory
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the embedded record store
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("records.db")
}

/// Runtime configuration for the lookup core.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    pub database_path: PathBuf,
    pub retry: RetryPolicy,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            retry: RetryPolicy::default(),
        }
    }
}

impl LookupConfig {
    /// Defaults overridden by `PATIENT_LOOKUP_*` environment variables.
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_RETRY_BASE_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.retry.base_delay = Duration::from_millis(ms),
                Err(e) => tracing::warn!(key = ENV_RETRY_BASE_MS, value = %raw, error = %e, "Ignoring invalid setting"),
            }
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            match raw.trim().parse::<u32>() {
                Ok(n) => config.retry.max_retries = n,
                Err(e) => tracing::warn!(key = ENV_MAX_RETRIES, value = %raw, error = %e, "Ignoring invalid setting"),
            }
        }

        config
    }
}
