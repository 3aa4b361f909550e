use crate::db::{RawRow, RecordStore, StoreError};
use crate::models::{FinancialSummary, LedgerEntry, LedgerStatus, Receipt};

use super::{distinct_ids, or_degraded, sort_newest_first};

fn entry_from_row(row: &RawRow) -> Option<LedgerEntry> {
    Some(LedgerEntry {
        id: row.i64("id")?,
        due_date: row.date("due_date"),
        net_value: row.f64("net_value"),
        status: if row.flag("closed") {
            LedgerStatus::Settled
        } else {
            LedgerStatus::Open
        },
    })
}

/// A movement is a receipt iff its credit flag is exactly 1 or `true`.
fn receipt_from_row(row: &RawRow) -> Option<Receipt> {
    if !row.flag("is_credit") {
        return None;
    }
    Some(Receipt {
        id: row.i64("id")?,
        entry_id: row.i64("entry_id"),
        movement_date: row.date("movement_date"),
        value: row.f64("value"),
    })
}

/// Receivable entries of a person and the credit movements against them.
pub async fn assemble_financial<S>(store: &S, person_id: i64) -> Result<FinancialSummary, StoreError>
where
    S: RecordStore + ?Sized,
{
    let rows = store.fetch_ledger_entries(person_id).await?;
    let mut entries: Vec<LedgerEntry> = rows.iter().filter_map(entry_from_row).collect();
    if entries.is_empty() {
        return Ok(FinancialSummary::default());
    }

    let entry_ids: Vec<i64> = distinct_ids(entries.iter().map(|e| Some(e.id)))
        .into_iter()
        .collect();
    let movements = or_degraded(store.fetch_ledger_movements(&entry_ids), "financial", "movements").await;

    let mut receipts: Vec<Receipt> = movements.iter().filter_map(receipt_from_row).collect();

    sort_newest_first(&mut entries, |e| (e.due_date, None));
    sort_newest_first(&mut receipts, |r| (r.movement_date, None));

    tracing::debug!(
        entries = entries.len(),
        movements = movements.len(),
        receipts = receipts.len(),
        "Ledger assembled"
    );
    Ok(FinancialSummary { entries, receipts })
}
