//! Clinical team resolution with graceful degradation.
//!
//! The fast path is the store's pre-aggregated team procedure. Stores that do
//! not deploy it answer with a "missing function" error, which is classified
//! as an absent capability and answered by the manual path: provider ids from
//! appointments and budgets, then provider rows, then person names, each set
//! resolved in a single batched lookup.

use std::collections::BTreeSet;

use crate::db::{is_capability_absent, RawRow, RecordStore, StoreError};
use crate::lookup;
use crate::models::TeamMember;
use crate::text_repair::repair_optional;

/// Everyone who has been linked to the patient through an appointment or a
/// budget, ordered by name then provider id.
pub async fn resolve_clinical_team<S>(store: &S, patient_id: i64) -> Result<Vec<TeamMember>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let mut team = match store.call_team_procedure(patient_id).await {
        Ok(rows) => rows.iter().filter_map(member_from_procedure_row).collect(),
        Err(e) if is_capability_absent(&e) => {
            tracing::debug!(patient_id, error = %e, "Team procedure unavailable, using manual lookup");
            manual_team(store, patient_id).await?
        }
        Err(e) => return Err(e),
    };

    team.sort_by(|a: &TeamMember, b: &TeamMember| {
        a.name.cmp(&b.name).then(a.provider_id.cmp(&b.provider_id))
    });
    Ok(team)
}

/// Procedure rows come back with inconsistent field casing.
fn member_from_procedure_row(row: &RawRow) -> Option<TeamMember> {
    Some(TeamMember {
        provider_id: row.i64("provider_id")?,
        name: repair_optional(row.text("provider_name").as_deref()),
        license_number: row.text("license_number"),
        short_code: row.text("short_code"),
    })
}

async fn manual_team<S>(store: &S, patient_id: i64) -> Result<Vec<TeamMember>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let (from_appointments, from_budgets) = tokio::join!(
        store.fetch_appointment_provider_ids(patient_id),
        store.fetch_budget_provider_ids(patient_id),
    );
    let provider_ids: BTreeSet<i64> = from_appointments?.into_iter().chain(from_budgets?).collect();
    if provider_ids.is_empty() {
        return Ok(Vec::new());
    }

    let providers = lookup::providers(store, provider_ids.iter().copied()).await?;
    if providers.is_empty() {
        return Ok(Vec::new());
    }

    let names = lookup::person_names_or_empty(store, provider_ids, "clinical_team").await;

    Ok(providers
        .into_iter()
        .map(|(provider_id, provider)| TeamMember {
            provider_id,
            name: names.get(&provider_id).cloned().unwrap_or_default(),
            license_number: provider.license_number,
            short_code: provider.short_code,
        })
        .collect())
}
