//! Read-only query capability the aggregation core needs from a record store.
//!
//! Every method is one round trip. Rows come back as `RawRow`s; typing them
//! is the caller's job.

use async_trait::async_trait;

use super::{RawRow, StoreError};

/// Entity kinds the batch lookup can resolve by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// Person rows: display name.
    Person,
    /// Provider rows: license number and short code. Same id space as persons.
    Provider,
    /// Procedure catalogue rows: name, code and number.
    Procedure,
}

impl LookupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Provider => "provider",
            Self::Procedure => "procedure",
        }
    }
}

/// Person search modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonQuery {
    /// Case-insensitive partial match on the display name.
    Name(String),
    /// Partial match on the stored (possibly punctuated) tax id.
    TaxId { fragment: String, limit: Option<usize> },
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// One person row by id, `None` when absent.
    async fn fetch_person(&self, person_id: i64) -> Result<Option<RawRow>, StoreError>;

    /// Person rows matching a search, ordered by name.
    async fn search_persons(&self, query: &PersonQuery) -> Result<Vec<RawRow>, StoreError>;

    /// Rows of `kind` whose id is in `ids`. Callers pass deduplicated,
    /// non-empty id sets.
    async fn fetch_by_ids(&self, kind: LookupKind, ids: &[i64]) -> Result<Vec<RawRow>, StoreError>;

    async fn fetch_appointments(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError>;

    /// Budgets of a patient, optionally restricted to one type tag.
    async fn fetch_budgets(
        &self,
        patient_id: i64,
        type_tag: Option<i64>,
    ) -> Result<Vec<RawRow>, StoreError>;

    /// Line items of every budget in `budget_ids`, line ascending, nulls last.
    async fn fetch_budget_items(&self, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError>;

    async fn fetch_budget_images(&self, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError>;

    async fn fetch_ledger_entries(&self, person_id: i64) -> Result<Vec<RawRow>, StoreError>;

    async fn fetch_ledger_movements(&self, entry_ids: &[i64]) -> Result<Vec<RawRow>, StoreError>;

    async fn fetch_images(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError>;

    async fn fetch_anamnesis(&self, patient_id: i64) -> Result<Option<RawRow>, StoreError>;

    /// Distinct non-null provider ids on the patient's appointments.
    async fn fetch_appointment_provider_ids(&self, patient_id: i64) -> Result<Vec<i64>, StoreError>;

    /// Distinct non-null provider ids on the patient's budgets.
    async fn fetch_budget_provider_ids(&self, patient_id: i64) -> Result<Vec<i64>, StoreError>;

    /// Pre-aggregated clinical team procedure. Optional: stores without it
    /// answer with a capability-absent error.
    async fn call_team_procedure(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError>;
}
