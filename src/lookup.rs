//! Batch lookup: one round trip per id set instead of one per row.
//!
//! Assemblers collect every foreign id their primary rows reference and
//! resolve the whole set here. An empty set costs no round trip at all.
//! Missing ids are simply absent from the returned map.

use std::collections::{BTreeSet, HashMap};

use crate::db::{LookupKind, RawRow, RecordStore, StoreError};
use crate::text_repair::repair_optional;

/// Procedure catalogue attributes used for line item display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureRef {
    pub name: Option<String>,
    pub code: Option<String>,
    pub number: Option<String>,
}

impl ProcedureRef {
    /// Display code: catalogue code, else catalogue number.
    pub fn display_code(&self) -> Option<&str> {
        self.code.as_deref().or(self.number.as_deref())
    }
}

/// Provider attributes from the provider table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRef {
    pub license_number: Option<String>,
    pub short_code: Option<String>,
}

/// Fetch rows of `kind` for `ids` in at most one round trip.
/// Ids are deduplicated first; an empty input performs no fetch.
pub async fn batch_lookup<S, I>(
    store: &S,
    kind: LookupKind,
    ids: I,
) -> Result<HashMap<i64, RawRow>, StoreError>
where
    S: RecordStore + ?Sized,
    I: IntoIterator<Item = i64>,
{
    let unique: BTreeSet<i64> = ids.into_iter().collect();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<i64> = unique.into_iter().collect();

    let rows = store.fetch_by_ids(kind, &ids).await?;
    tracing::debug!(kind = kind.as_str(), requested = ids.len(), found = rows.len(), "Batch lookup");

    Ok(rows
        .into_iter()
        .filter_map(|row| row.i64("id").map(|id| (id, row)))
        .collect())
}

/// Person display names by id. Persons without a name map to "".
pub async fn person_names<S, I>(store: &S, ids: I) -> Result<HashMap<i64, String>, StoreError>
where
    S: RecordStore + ?Sized,
    I: IntoIterator<Item = i64>,
{
    let rows = batch_lookup(store, LookupKind::Person, ids).await?;
    Ok(rows
        .into_iter()
        .map(|(id, row)| (id, repair_optional(row.text("name").as_deref())))
        .collect())
}

pub async fn procedures<S, I>(store: &S, ids: I) -> Result<HashMap<i64, ProcedureRef>, StoreError>
where
    S: RecordStore + ?Sized,
    I: IntoIterator<Item = i64>,
{
    let rows = batch_lookup(store, LookupKind::Procedure, ids).await?;
    Ok(rows
        .into_iter()
        .map(|(id, row)| {
            let procedure = ProcedureRef {
                name: row.repaired_text("name"),
                code: row.text("code"),
                number: row.text("number"),
            };
            (id, procedure)
        })
        .collect())
}

pub async fn providers<S, I>(store: &S, ids: I) -> Result<HashMap<i64, ProviderRef>, StoreError>
where
    S: RecordStore + ?Sized,
    I: IntoIterator<Item = i64>,
{
    let rows = batch_lookup(store, LookupKind::Provider, ids).await?;
    Ok(rows
        .into_iter()
        .map(|(id, row)| {
            let provider = ProviderRef {
                license_number: row.text("license_number"),
                short_code: row.text("short_code"),
            };
            (id, provider)
        })
        .collect())
}

/// Resolve person names, degrading to an empty map when the lookup fails.
/// Callers then show unresolved names as absent.
pub async fn person_names_or_empty<S, I>(store: &S, ids: I, context: &str) -> HashMap<i64, String>
where
    S: RecordStore + ?Sized,
    I: IntoIterator<Item = i64>,
{
    match person_names(store, ids).await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(context, error = %e, "Name lookup failed; names left unresolved");
            HashMap::new()
        }
    }
}
