pub mod aggregate; // Aggregation facade
pub mod assemble; // Entity assemblers
pub mod config;
pub mod db;
pub mod formatters;
pub mod lookup; // Batch lookup resolver
pub mod models;
pub mod team; // Degrading team resolver
pub mod text_repair;

#[cfg(test)]
mod test_support;

pub use aggregate::{aggregate_patient, AggregateError, PatientAggregator};
pub use config::LookupConfig;
pub use db::{RecordStore, RetryPolicy, RetryingStore, SqliteStore, StoreError};
pub use models::PatientRecord;

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()))
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Returns false when a subscriber was already installed.
pub fn try_init_tracing() -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .is_ok();
    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
    installed
}

/// Install the global tracing subscriber, ignoring an existing one.
pub fn init_tracing() {
    try_init_tracing();
}
