//! Aggregation facade: one patient id in, one composite record out.
//!
//! All sections are fetched concurrently. A failing section is logged, left
//! at its empty value and listed in `degraded_sections`; only the identity
//! lookup can fail the whole request.

use chrono::Utc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::assemble::{self, search_patients};
use crate::config::LookupConfig;
use crate::db::{RecordStore, RetryingStore, SqliteStore, StoreError};
use crate::models::{Patient, PatientRecord, Section};
use crate::team::resolve_clinical_team;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Patient not found: {0}")]
    PatientNotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Entry point of the lookup core, generic over the record store.
pub struct PatientAggregator<S> {
    store: S,
}

impl PatientAggregator<RetryingStore<SqliteStore>> {
    /// Open the configured SQLite store behind the configured retry policy.
    pub fn open(config: &LookupConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = SqliteStore::open(&config.database_path)?;
        tracing::info!(path = %config.database_path.display(), "Record store opened");
        Ok(Self::new(RetryingStore::new(store, config.retry)))
    }
}

impl<S: RecordStore> PatientAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn aggregate(&self, patient_id: i64) -> Result<PatientRecord, AggregateError> {
        aggregate_patient(&self.store, patient_id).await
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Patient>, StoreError> {
        search_patients(&self.store, term).await
    }
}

/// Keep a section's value, or record it as degraded and use its empty value.
fn settle<T: Default>(section: Section, result: Result<T, StoreError>, degraded: &mut Vec<Section>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(section = section.as_str(), error = %e, "Section failed; returning it empty");
            degraded.push(section);
            T::default()
        }
    }
}

/// Assemble every section for `patient_id`.
pub async fn aggregate_patient<S>(store: &S, patient_id: i64) -> Result<PatientRecord, AggregateError>
where
    S: RecordStore + ?Sized,
{
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("aggregate_patient", patient_id, %request_id);

    async move {
        tracing::info!("Aggregating patient record");

        let (
            identity,
            appointments,
            budgets,
            orthodontics,
            financial,
            clinical_team,
            anamnesis,
            images,
            budget_images,
        ) = tokio::join!(
            assemble::get_patient(store, patient_id),
            assemble::assemble_appointments(store, patient_id),
            assemble::assemble_budgets(store, patient_id),
            assemble::assemble_orthodontics(store, patient_id),
            assemble::assemble_financial(store, patient_id),
            resolve_clinical_team(store, patient_id),
            assemble::assemble_anamnesis(store, patient_id),
            assemble::assemble_images(store, patient_id),
            assemble::assemble_budget_images(store, patient_id),
        );

        let patient = identity?.ok_or(AggregateError::PatientNotFound(patient_id))?;

        let mut degraded = Vec::new();
        let record = PatientRecord {
            request_id,
            assembled_at: Utc::now(),
            patient,
            appointments: settle(Section::Appointments, appointments, &mut degraded),
            budgets: settle(Section::Budgets, budgets, &mut degraded),
            orthodontics: settle(Section::Orthodontics, orthodontics, &mut degraded),
            financial: settle(Section::Financial, financial, &mut degraded),
            clinical_team: settle(Section::ClinicalTeam, clinical_team, &mut degraded),
            anamnesis: settle(Section::Anamnesis, anamnesis, &mut degraded),
            images: settle(Section::Images, images.map(Some), &mut degraded),
            budget_images: settle(Section::BudgetImages, budget_images, &mut degraded),
            degraded_sections: degraded,
        };

        tracing::info!(
            appointments = record.appointments.len(),
            budgets = record.budgets.len(),
            degraded = record.degraded_sections.len(),
            "Patient record assembled"
        );
        Ok::<_, AggregateError>(record)
    }
    .instrument(span)
    .await
}
