use rusqlite::{params, Connection};

use crate::db::{RawRow, StoreError};

use super::query_rows;

const TEAM_PROCEDURE_SQL: &str = include_str!("../../../resources/procedures/patient_clinical_team.sql");

const TEAM_VIEW: &str = "patient_clinical_team";

/// Deploy the optional clinical team view.
pub fn install_team_procedure(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(TEAM_PROCEDURE_SQL)?;
    Ok(())
}

/// Query the clinical team view. A missing view is reported the way a
/// server reports an undeployed function, so callers can fall back.
pub fn call_team_procedure(conn: &Connection, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
    let result = query_rows(
        conn,
        "SELECT PROVIDER_ID, PROVIDER_NAME, LICENSE_NUMBER, SHORT_CODE
         FROM patient_clinical_team
         WHERE PATIENT_ID = ?1",
        params![patient_id],
    );

    match result {
        Err(StoreError::Sqlite(rusqlite::Error::SqliteFailure(_, Some(msg))))
            if msg.contains("no such table") && msg.contains(TEAM_VIEW) =>
        {
            Err(StoreError::Query {
                code: Some("42883".into()),
                message: format!("function {TEAM_VIEW}(patient_id) does not exist"),
                hint: Some(msg),
            })
        }
        other => other,
    }
}
