//! Entity assemblers: one patient id in, one denormalized record set out.
//!
//! Every assembler follows the same shape:
//! 1. fetch its primary rows in one query,
//! 2. collect the distinct foreign ids they reference,
//! 3. resolve those ids through one batched lookup,
//! 4. merge the resolved names onto typed records.
//!
//! A failing primary fetch fails the section. A failing dependent lookup
//! (names, items, movements) degrades to the primary rows with unresolved
//! names or empty children, and is logged.

mod anamnesis;
mod appointments;
mod budgets;
mod financial;
mod images;
mod patient;

pub use anamnesis::*;
pub use appointments::*;
pub use budgets::*;
pub use financial::*;
pub use images::*;
pub use patient::*;

use std::collections::BTreeSet;
use std::future::Future;

use chrono::{NaiveDate, NaiveTime};

use crate::db::StoreError;

/// Sort newest first by date, then time. Undated records go last; the sort
/// is stable, so store order survives among equals.
pub(crate) fn sort_newest_first<T>(
    records: &mut [T],
    key: impl Fn(&T) -> (Option<NaiveDate>, Option<NaiveTime>),
) {
    records.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// Distinct ids in ascending order.
pub(crate) fn distinct_ids(ids: impl IntoIterator<Item = Option<i64>>) -> BTreeSet<i64> {
    ids.into_iter().flatten().collect()
}

/// Await a dependent lookup, falling back to `T::default()` when it fails.
pub(crate) async fn or_degraded<T, F>(lookup: F, section: &str, what: &str) -> T
where
    T: Default,
    F: Future<Output = Result<T, StoreError>>,
{
    match lookup.await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(section, lookup = what, error = %e, "Dependent lookup failed; continuing without it");
            T::default()
        }
    }
}
