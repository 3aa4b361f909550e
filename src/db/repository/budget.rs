use rusqlite::{params, params_from_iter, Connection};

use crate::db::{RawRow, StoreError};

use super::{placeholders, query_ids, query_rows};

const BUDGET_COLUMNS: &str = "id, number, date, total, type_tag, provider_id, patient_id,
    insurer_id, plan_id, clinic_id, guide_number, situation_id, notes, discount,
    discount_type, closed, membership_number, holder, copay_total, start_date,
    installments, due_date";

pub fn budgets_for_patient(
    conn: &Connection,
    patient_id: i64,
    type_tag: Option<i64>,
) -> Result<Vec<RawRow>, StoreError> {
    match type_tag {
        Some(tag) => {
            let sql = format!(
                "SELECT {BUDGET_COLUMNS} FROM budgets
                 WHERE patient_id = ?1 AND type_tag = ?2
                 ORDER BY date DESC"
            );
            query_rows(conn, &sql, params![patient_id, tag])
        }
        None => {
            let sql = format!(
                "SELECT {BUDGET_COLUMNS} FROM budgets
                 WHERE patient_id = ?1
                 ORDER BY date DESC"
            );
            query_rows(conn, &sql, params![patient_id])
        }
    }
}

/// Line items of all given budgets in one statement, line ascending with
/// nulls last.
pub fn items_for_budgets(conn: &Connection, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
    if budget_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, budget_id, line, item_id, procedure_id, quantity, unit_value, total,
                discount, date, provider_id, performed, billed, notes, tooth_number, phase,
                transfer_date, transfer_value, transfer_is_value, transfer_base, transfer_reason,
                created_by, created_at, updated_by, updated_at
         FROM budget_items
         WHERE budget_id IN ({})
         ORDER BY line IS NULL, line, id",
        placeholders(budget_ids.len())
    );
    query_rows(conn, &sql, params_from_iter(budget_ids.iter()))
}

pub fn budget_provider_ids(conn: &Connection, patient_id: i64) -> Result<Vec<i64>, StoreError> {
    query_ids(
        conn,
        "SELECT DISTINCT provider_id FROM budgets
         WHERE patient_id = ?1 AND provider_id IS NOT NULL",
        params![patient_id],
    )
}
