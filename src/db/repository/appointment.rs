use rusqlite::{params, Connection};

use crate::db::{RawRow, StoreError};

use super::{query_ids, query_rows};

pub fn appointments_for_patient(conn: &Connection, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
    query_rows(
        conn,
        "SELECT id, date, time, attended, blocked, cancelled_on, missed_on, provider_id
         FROM appointments
         WHERE patient_id = ?1
         ORDER BY date DESC, time DESC",
        params![patient_id],
    )
}

pub fn appointment_provider_ids(conn: &Connection, patient_id: i64) -> Result<Vec<i64>, StoreError> {
    query_ids(
        conn,
        "SELECT DISTINCT provider_id FROM appointments
         WHERE patient_id = ?1 AND provider_id IS NOT NULL",
        params![patient_id],
    )
}
