//! Linear-backoff retry for timeout-class store failures.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::classify::is_transient;
use super::{LookupKind, PersonQuery, RawRow, RecordStore, StoreError};
use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before retry `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: config::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(config::DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before the given retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }
}

/// Run `op`, retrying transient failures per `policy`. Non-transient errors
/// and the last transient error are returned as-is.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut retry = 0;
    loop {
        match op().await {
            Err(e) if is_transient(&e) && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    operation,
                    retry,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient store failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}

/// Store decorator applying a `RetryPolicy` to every round trip.
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: RecordStore> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for RetryingStore<S> {
    async fn fetch_person(&self, person_id: i64) -> Result<Option<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_person", || self.inner.fetch_person(person_id)).await
    }

    async fn search_persons(&self, query: &PersonQuery) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "search_persons", || self.inner.search_persons(query)).await
    }

    async fn fetch_by_ids(&self, kind: LookupKind, ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_by_ids", || self.inner.fetch_by_ids(kind, ids)).await
    }

    async fn fetch_appointments(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_appointments", || {
            self.inner.fetch_appointments(patient_id)
        })
        .await
    }

    async fn fetch_budgets(
        &self,
        patient_id: i64,
        type_tag: Option<i64>,
    ) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_budgets", || {
            self.inner.fetch_budgets(patient_id, type_tag)
        })
        .await
    }

    async fn fetch_budget_items(&self, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_budget_items", || {
            self.inner.fetch_budget_items(budget_ids)
        })
        .await
    }

    async fn fetch_budget_images(&self, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_budget_images", || {
            self.inner.fetch_budget_images(budget_ids)
        })
        .await
    }

    async fn fetch_ledger_entries(&self, person_id: i64) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_ledger_entries", || {
            self.inner.fetch_ledger_entries(person_id)
        })
        .await
    }

    async fn fetch_ledger_movements(&self, entry_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_ledger_movements", || {
            self.inner.fetch_ledger_movements(entry_ids)
        })
        .await
    }

    async fn fetch_images(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_images", || self.inner.fetch_images(patient_id)).await
    }

    async fn fetch_anamnesis(&self, patient_id: i64) -> Result<Option<RawRow>, StoreError> {
        with_retry(&self.policy, "fetch_anamnesis", || self.inner.fetch_anamnesis(patient_id)).await
    }

    async fn fetch_appointment_provider_ids(&self, patient_id: i64) -> Result<Vec<i64>, StoreError> {
        with_retry(&self.policy, "fetch_appointment_provider_ids", || {
            self.inner.fetch_appointment_provider_ids(patient_id)
        })
        .await
    }

    async fn fetch_budget_provider_ids(&self, patient_id: i64) -> Result<Vec<i64>, StoreError> {
        with_retry(&self.policy, "fetch_budget_provider_ids", || {
            self.inner.fetch_budget_provider_ids(patient_id)
        })
        .await
    }

    async fn call_team_procedure(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        with_retry(&self.policy, "call_team_procedure", || {
            self.inner.call_team_procedure(patient_id)
        })
        .await
    }
}
