use rusqlite::{params, params_from_iter, Connection};

use crate::db::{RawRow, StoreError};

use super::{placeholders, query_rows};

pub fn ledger_entries_for_person(conn: &Connection, person_id: i64) -> Result<Vec<RawRow>, StoreError> {
    query_rows(
        conn,
        "SELECT id, due_date, net_value, closed
         FROM ledger_entries
         WHERE person_id = ?1
         ORDER BY due_date DESC",
        params![person_id],
    )
}

pub fn movements_for_entries(conn: &Connection, entry_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
    if entry_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, movement_date, value, is_credit, entry_id
         FROM ledger_movements
         WHERE entry_id IN ({})
         ORDER BY movement_date DESC",
        placeholders(entry_ids.len())
    );
    query_rows(conn, &sql, params_from_iter(entry_ids.iter()))
}
