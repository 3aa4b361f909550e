use rusqlite::{params, Connection};

use crate::db::{PersonQuery, RawRow, StoreError};

use super::query_rows;

const PERSON_COLUMNS: &str = "id, name, tax_id, birth_date, email, address, phone, mobile";

pub fn get_person(conn: &Connection, person_id: i64) -> Result<Option<RawRow>, StoreError> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1");
    Ok(query_rows(conn, &sql, params![person_id])?.into_iter().next())
}

pub fn search_persons(conn: &Connection, query: &PersonQuery) -> Result<Vec<RawRow>, StoreError> {
    match query {
        PersonQuery::Name(term) => {
            let sql = format!(
                "SELECT {PERSON_COLUMNS} FROM persons
                 WHERE name LIKE ?1 ESCAPE '\\'
                 ORDER BY name"
            );
            query_rows(conn, &sql, params![like_pattern(term)])
        }
        PersonQuery::TaxId { fragment, limit } => {
            let sql = format!(
                "SELECT {PERSON_COLUMNS} FROM persons
                 WHERE tax_id LIKE ?1 ESCAPE '\\'
                 ORDER BY name
                 LIMIT ?2"
            );
            let limit = limit.map(|l| l as i64).unwrap_or(-1);
            query_rows(conn, &sql, params![like_pattern(fragment), limit])
        }
    }
}

pub fn get_anamnesis(conn: &Connection, patient_id: i64) -> Result<Option<RawRow>, StoreError> {
    let rows = query_rows(
        conn,
        "SELECT patient_id, chief_complaint, has_disease, disease_detail, under_physician_care,
                has_allergy, allergy_detail, has_std, std_detail, notes
         FROM anamnesis WHERE patient_id = ?1",
        params![patient_id],
    )?;
    Ok(rows.into_iter().next())
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
