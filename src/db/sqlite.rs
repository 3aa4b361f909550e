use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Connection;

use super::repository;
use super::{LookupKind, PersonQuery, RawRow, RecordStore, StoreError};

/// How long a statement waits on a locked database before failing busy.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Numbered schema migrations, applied in order above the stored version.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../resources/migrations/001_initial.sql"))];

/// Open the record database at `path`, ready for queries.
pub fn open_database(path: &Path) -> Result<Connection, StoreError> {
    prepare(Connection::open(path)?)
}

/// Migrated in-memory record database.
pub fn open_memory_database() -> Result<Connection, StoreError> {
    prepare(Connection::open_in_memory()?)
}

/// Connection settings the record queries rely on, then pending migrations.
fn prepare(conn: Connection) -> Result<Connection, StoreError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    let applied = run_migrations(&conn)?;
    if applied > 0 {
        tracing::debug!(applied, version = schema_version(&conn), "Record schema ready");
    }
    Ok(conn)
}

/// Apply every migration newer than the stored schema version and return
/// how many ran.
pub fn run_migrations(conn: &Connection) -> Result<usize, StoreError> {
    let current = schema_version(conn);
    let mut applied = 0;
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        tracing::info!(version, "Applying record schema migration");
        conn.execute_batch(sql).map_err(|e| StoreError::MigrationFailed {
            version,
            reason: e.to_string(),
        })?;
        applied += 1;
    }
    Ok(applied)
}

/// Highest applied migration; 0 on a fresh database.
fn schema_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .ok()
    .flatten()
    .unwrap_or(0)
}

// ═══════════════════════════════════════════════════════════
// SqliteStore
// ═══════════════════════════════════════════════════════════

/// `RecordStore` over one SQLite connection.
///
/// Statements run on tokio's blocking pool; the connection is shared behind
/// a mutex, so concurrent sections queue on it rather than on the runtime.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::from_connection(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    /// Wrap an already-migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Synchronous access to the connection (seeding, maintenance).
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let guard = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&guard)
    }

    /// Deploy the optional clinical team view on this store.
    pub fn install_team_procedure(&self) -> Result<(), StoreError> {
        self.with_connection(repository::install_team_procedure)
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            op(&guard)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn fetch_person(&self, person_id: i64) -> Result<Option<RawRow>, StoreError> {
        self.run(move |conn| repository::get_person(conn, person_id)).await
    }

    async fn search_persons(&self, query: &PersonQuery) -> Result<Vec<RawRow>, StoreError> {
        let query = query.clone();
        self.run(move |conn| repository::search_persons(conn, &query)).await
    }

    async fn fetch_by_ids(&self, kind: LookupKind, ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        let ids = ids.to_vec();
        self.run(move |conn| repository::rows_by_ids(conn, kind, &ids)).await
    }

    async fn fetch_appointments(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        self.run(move |conn| repository::appointments_for_patient(conn, patient_id)).await
    }

    async fn fetch_budgets(
        &self,
        patient_id: i64,
        type_tag: Option<i64>,
    ) -> Result<Vec<RawRow>, StoreError> {
        self.run(move |conn| repository::budgets_for_patient(conn, patient_id, type_tag)).await
    }

    async fn fetch_budget_items(&self, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        let ids = budget_ids.to_vec();
        self.run(move |conn| repository::items_for_budgets(conn, &ids)).await
    }

    async fn fetch_budget_images(&self, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        let ids = budget_ids.to_vec();
        self.run(move |conn| repository::images_for_budgets(conn, &ids)).await
    }

    async fn fetch_ledger_entries(&self, person_id: i64) -> Result<Vec<RawRow>, StoreError> {
        self.run(move |conn| repository::ledger_entries_for_person(conn, person_id)).await
    }

    async fn fetch_ledger_movements(&self, entry_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        let ids = entry_ids.to_vec();
        self.run(move |conn| repository::movements_for_entries(conn, &ids)).await
    }

    async fn fetch_images(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        self.run(move |conn| repository::images_for_patient(conn, patient_id)).await
    }

    async fn fetch_anamnesis(&self, patient_id: i64) -> Result<Option<RawRow>, StoreError> {
        self.run(move |conn| repository::get_anamnesis(conn, patient_id)).await
    }

    async fn fetch_appointment_provider_ids(&self, patient_id: i64) -> Result<Vec<i64>, StoreError> {
        self.run(move |conn| repository::appointment_provider_ids(conn, patient_id)).await
    }

    async fn fetch_budget_provider_ids(&self, patient_id: i64) -> Result<Vec<i64>, StoreError> {
        self.run(move |conn| repository::budget_provider_ids(conn, patient_id)).await
    }

    async fn call_team_procedure(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        self.run(move |conn| repository::call_team_procedure(conn, patient_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::classify::{classify, ErrorClass};

    fn count_tables(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // 11 entity tables + schema_version
        let count = count_tables(&conn);
        assert_eq!(count, 12);
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), 0);
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn open_database_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        let conn = open_database(&path).unwrap();
        assert!(path.exists());
        assert_eq!(count_tables(&conn), 12);
        drop(conn);
        // Reopen applies nothing new
        let store = SqliteStore::open(&path).unwrap();
        let version = store
            .with_connection(|c| Ok(schema_version(c)))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn missing_team_view_reports_capability_absent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.call_team_procedure(1).await.unwrap_err();
        assert_eq!(classify(&err), ErrorClass::CapabilityAbsent);
        assert_eq!(err.code(), Some("42883"));
    }

    #[tokio::test]
    async fn installed_team_view_answers() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .with_connection(|c| {
                c.execute_batch(
                    "INSERT INTO persons (id, name) VALUES (7, 'Dra. Helena');
                     INSERT INTO providers (id, license_number, short_code) VALUES (7, 'CRO-1234', 'HEL');
                     INSERT INTO appointments (id, patient_id, provider_id, date) VALUES (1, 100, 7, '2024-01-10');
                     INSERT INTO budgets (id, patient_id, provider_id, date) VALUES (1, 100, 7, '2024-01-01');",
                )?;
                Ok(())
            })
            .unwrap();
        store.install_team_procedure().unwrap();

        let rows = store.call_team_procedure(100).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].i64("provider_id"), Some(7));
        assert_eq!(rows[0].text("provider_name").as_deref(), Some("Dra. Helena"));
    }

    #[tokio::test]
    async fn fetch_by_ids_through_blocking_pool() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .with_connection(|c| {
                c.execute_batch("INSERT INTO persons (id, name) VALUES (1, 'A'), (2, 'B');")?;
                Ok(())
            })
            .unwrap();
        let rows = store.fetch_by_ids(LookupKind::Person, &[2]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("name").as_deref(), Some("B"));
    }
}
