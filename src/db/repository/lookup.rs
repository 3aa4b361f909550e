use rusqlite::{params_from_iter, Connection};

use crate::db::{LookupKind, RawRow, StoreError};

use super::{placeholders, query_rows};

fn lookup_source(kind: LookupKind) -> (&'static str, &'static str) {
    match kind {
        LookupKind::Person => ("persons", "id, name"),
        LookupKind::Provider => ("providers", "id, license_number, short_code"),
        LookupKind::Procedure => ("procedures", "id, name, code, number"),
    }
}

/// Rows of `kind` for an id set, one statement.
pub fn rows_by_ids(conn: &Connection, kind: LookupKind, ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let (table, columns) = lookup_source(kind);
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE id IN ({})",
        placeholders(ids.len())
    );
    query_rows(conn, &sql, params_from_iter(ids.iter()))
}
