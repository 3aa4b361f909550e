use rusqlite::{params, params_from_iter, Connection};

use crate::db::{RawRow, StoreError};

use super::{placeholders, query_rows};

pub fn images_for_patient(conn: &Connection, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
    query_rows(
        conn,
        "SELECT id, date, history, path, tooth_id, face_id, budget_image, provider_id
         FROM patient_images
         WHERE patient_id = ?1
         ORDER BY date DESC",
        params![patient_id],
    )
}

pub fn images_for_budgets(conn: &Connection, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
    if budget_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, budget_id, date, history, path, tooth_id, face_id, budget_image,
                evaluation_id, provider_id
         FROM budget_images
         WHERE budget_id IN ({})
         ORDER BY date DESC",
        placeholders(budget_ids.len())
    );
    query_rows(conn, &sql, params_from_iter(budget_ids.iter()))
}
