//! Shared fixtures for the assembler, resolver and facade tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::{LookupKind, PersonQuery, RawRow, RecordStore, SqliteStore, StoreError};

/// Patient with appointments, every budget kind, ledger, images and anamnesis.
pub const PATIENT_FULL: i64 = 100;
/// Patient whose only budget references a provider without a person row.
pub const PATIENT_SPARSE: i64 = 101;
/// Patient with no related rows at all.
pub const PATIENT_EMPTY: i64 = 102;

const SEED: &str = "
INSERT INTO persons (id, name, tax_id, birth_date, email, address, phone, mobile) VALUES
    (100, 'Maria da Concei\u{c3}\u{a7}\u{c3}\u{a3}o', '100.592.046-05', '1985-03-14',
        'maria@example.com', 'Rua das Flores, 10', '1133334444', '11999998888'),
    (101, 'Jo\u{e3}o Silva', '10059299999', '1990-07-01', NULL, NULL, NULL, NULL),
    (102, 'Pedro Alves', '123.456.789-00', NULL, NULL, NULL, NULL, NULL),
    (10, 'Dr. Paulo Mendes', NULL, NULL, NULL, NULL, NULL, NULL),
    (11, 'Dra. Ana Costa', NULL, NULL, NULL, NULL, NULL, NULL),
    (13, 'Carlos Lima', '98765432100', NULL, NULL, NULL, NULL, NULL);

INSERT INTO providers (id, license_number, short_code) VALUES
    (10, 'CRO-1001', 'PM'),
    (11, 'CRO-1002', 'AC'),
    (12, 'CRO-1003', 'XX');

INSERT INTO procedures (id, name, code, number) VALUES
    (500, 'Restaura\u{c3}\u{a7}\u{c3}\u{a3}o', 'P9', '123'),
    (501, 'Limpeza', NULL, '81000065');

INSERT INTO appointments (id, patient_id, provider_id, date, time, attended, blocked, cancelled_on, missed_on) VALUES
    (1, 100, 10, '2024-03-10', '09:00', 1, 0, NULL, NULL),
    (2, 100, 11, '2024-03-12', '14:30', 0, 0, '2024-03-11', NULL),
    (3, 100, 10, '2024-03-12', '08:00', NULL, 1, '2024-03-11', NULL),
    (4, 100, NULL, '2024-01-05', '10:00', NULL, NULL, NULL, '2024-01-05'),
    (5, 100, 99, '2024-04-01', '11:00', NULL, NULL, NULL, NULL);

INSERT INTO budgets (id, patient_id, provider_id, number, date, total, type_tag, insurer_id,
        guide_number, notes, discount, discount_type, closed, start_date, installments, due_date) VALUES
    (20, 100, 10, 1, '2024-02-01', 350.0, 0, 3, 'G-77', 'Or\u{c3}\u{a7}amento inicial', 5.0, 1, 1,
        NULL, NULL, NULL),
    (21, 100, 11, 2, '2024-03-01', 1200.0, 1, NULL, NULL, NULL, NULL, NULL, NULL,
        '2024-03-05', 12, '2025-03-05'),
    (22, 100, NULL, 3, '2023-12-01', 80.0, 2, NULL, NULL, NULL, NULL, NULL, NULL,
        '2023-12-10', 6, NULL),
    (30, 101, 12, 1, '2024-01-15', 90.0, 0, NULL, NULL, NULL, NULL, NULL, 0,
        NULL, NULL, NULL);

INSERT INTO budget_items (id, budget_id, line, item_id, procedure_id, quantity, unit_value, total,
        tooth_number, performed, billed, transfer_value, transfer_reason, created_by, created_at) VALUES
    (200, 20, '2', NULL, 500, 1, 150.0, 150.0, '16', 1, 0, 50.0, 'Comiss\u{c3}\u{a3}o', NULL, NULL),
    (201, 20, '10', NULL, 501, 1, 80.0, 80.0, NULL, 0, 0, NULL, NULL, 'admin', '2024-02-01 10:00:00'),
    (202, 20, NULL, 500, NULL, 1, 70.0, 70.0, NULL, 0, 0, NULL, NULL, NULL, NULL),
    (203, 20, '12', 888, NULL, 1, 50.0, 50.0, NULL, 0, 1, NULL, NULL, NULL, NULL),
    (210, 21, '1', NULL, 501, 12, 100.0, 1200.0, NULL, 0, 0, NULL, NULL, NULL, NULL),
    (300, 30, '1', NULL, 501, 1, 90.0, 90.0, NULL, 0, 0, NULL, NULL, NULL, NULL);

INSERT INTO ledger_entries (id, person_id, due_date, net_value, closed) VALUES
    (40, 100, '2024-03-01', 300.0, 1),
    (41, 100, '2024-04-01', 150.0, 0),
    (42, 100, '2024-05-01', 150.0, NULL);

INSERT INTO ledger_movements (id, entry_id, movement_date, value, is_credit) VALUES
    (60, 40, '2024-03-01', 300.0, 1),
    (61, 40, '2024-03-02', 10.0, 0),
    (62, 41, '2024-04-02', 75.0, 1),
    (63, 42, NULL, 20.0, NULL),
    (64, 41, '2024-04-03', 5.0, 2);

INSERT INTO patient_images (id, patient_id, provider_id, date, history, path, tooth_id, face_id, budget_image) VALUES
    (70, 100, 10, '2024-03-10', 'Panor\u{c3}\u{a2}mica', 'img/70.jpg', NULL, 1, NULL),
    (71, 100, 99, '2024-03-15', 'Periapical', 'img/71.jpg', 16, NULL, NULL);

INSERT INTO budget_images (id, budget_id, provider_id, date, history, path, evaluation_id) VALUES
    (80, 20, 11, '2024-02-02', 'Antes', 'bimg/80.jpg', 5),
    (81, 21, NULL, '2024-03-06', 'Setup', 'bimg/81.jpg', NULL);

INSERT INTO anamnesis (patient_id, chief_complaint, has_disease, under_physician_care,
        has_allergy, allergy_detail, has_std) VALUES
    (100, 'Dor ao mastigar', 0, 1, 1, 'Penicilina', 0),
    (101, '  ', NULL, NULL, NULL, NULL, NULL);
";

/// In-memory store holding the shared fixture rows. The team view is not
/// installed, so team lookups take the fallback path.
pub fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .with_connection(|conn| {
            conn.execute_batch(SEED)?;
            Ok(())
        })
        .unwrap();
    store
}

/// Seed an additional statement batch into `store`.
pub fn seed(store: &SqliteStore, sql: &str) {
    store
        .with_connection(|conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
        .unwrap();
}

fn replay(error: &StoreError) -> StoreError {
    match error {
        StoreError::Query { code, message, hint } => StoreError::Query {
            code: code.clone(),
            message: message.clone(),
            hint: hint.clone(),
        },
        other => StoreError::TaskFailed(other.to_string()),
    }
}

/// Decorator that counts round trips per operation and can make an
/// operation fail on every call.
///
/// `fetch_by_ids` is counted both as `fetch_by_ids` and as
/// `fetch_by_ids:<kind>`; a failure registered under either key applies.
pub struct ProbeStore<S> {
    inner: S,
    calls: Mutex<HashMap<String, usize>>,
    last_ids: Mutex<HashMap<String, Vec<i64>>>,
    failures: Mutex<HashMap<String, StoreError>>,
}

impl<S: RecordStore> ProbeStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
            last_ids: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail(&self, operation: &str, error: StoreError) {
        self.failures.lock().unwrap().insert(operation.to_string(), error);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn last_ids(&self, operation: &str) -> Vec<i64> {
        self.last_ids.lock().unwrap().get(operation).cloned().unwrap_or_default()
    }

    fn record(&self, keys: &[String], ids: Option<&[i64]>) -> Result<(), StoreError> {
        {
            let mut calls = self.calls.lock().unwrap();
            let mut last = self.last_ids.lock().unwrap();
            for key in keys {
                *calls.entry(key.clone()).or_default() += 1;
                if let Some(ids) = ids {
                    last.insert(key.clone(), ids.to_vec());
                }
            }
        }
        let failures = self.failures.lock().unwrap();
        match keys.iter().find_map(|k| failures.get(k)) {
            Some(error) => Err(replay(error)),
            None => Ok(()),
        }
    }

    fn probe(&self, operation: &str) -> Result<(), StoreError> {
        self.record(&[operation.to_string()], None)
    }

    fn probe_ids(&self, operation: &str, ids: &[i64]) -> Result<(), StoreError> {
        self.record(&[operation.to_string()], Some(ids))
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for ProbeStore<S> {
    async fn fetch_person(&self, person_id: i64) -> Result<Option<RawRow>, StoreError> {
        self.probe("fetch_person")?;
        self.inner.fetch_person(person_id).await
    }

    async fn search_persons(&self, query: &PersonQuery) -> Result<Vec<RawRow>, StoreError> {
        self.probe("search_persons")?;
        self.inner.search_persons(query).await
    }

    async fn fetch_by_ids(&self, kind: LookupKind, ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        let keys = [
            "fetch_by_ids".to_string(),
            format!("fetch_by_ids:{}", kind.as_str()),
        ];
        self.record(&keys, Some(ids))?;
        self.inner.fetch_by_ids(kind, ids).await
    }

    async fn fetch_appointments(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        self.probe("fetch_appointments")?;
        self.inner.fetch_appointments(patient_id).await
    }

    async fn fetch_budgets(
        &self,
        patient_id: i64,
        type_tag: Option<i64>,
    ) -> Result<Vec<RawRow>, StoreError> {
        self.probe("fetch_budgets")?;
        self.inner.fetch_budgets(patient_id, type_tag).await
    }

    async fn fetch_budget_items(&self, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        self.probe_ids("fetch_budget_items", budget_ids)?;
        self.inner.fetch_budget_items(budget_ids).await
    }

    async fn fetch_budget_images(&self, budget_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        self.probe_ids("fetch_budget_images", budget_ids)?;
        self.inner.fetch_budget_images(budget_ids).await
    }

    async fn fetch_ledger_entries(&self, person_id: i64) -> Result<Vec<RawRow>, StoreError> {
        self.probe("fetch_ledger_entries")?;
        self.inner.fetch_ledger_entries(person_id).await
    }

    async fn fetch_ledger_movements(&self, entry_ids: &[i64]) -> Result<Vec<RawRow>, StoreError> {
        self.probe_ids("fetch_ledger_movements", entry_ids)?;
        self.inner.fetch_ledger_movements(entry_ids).await
    }

    async fn fetch_images(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        self.probe("fetch_images")?;
        self.inner.fetch_images(patient_id).await
    }

    async fn fetch_anamnesis(&self, patient_id: i64) -> Result<Option<RawRow>, StoreError> {
        self.probe("fetch_anamnesis")?;
        self.inner.fetch_anamnesis(patient_id).await
    }

    async fn fetch_appointment_provider_ids(&self, patient_id: i64) -> Result<Vec<i64>, StoreError> {
        self.probe("fetch_appointment_provider_ids")?;
        self.inner.fetch_appointment_provider_ids(patient_id).await
    }

    async fn fetch_budget_provider_ids(&self, patient_id: i64) -> Result<Vec<i64>, StoreError> {
        self.probe("fetch_budget_provider_ids")?;
        self.inner.fetch_budget_provider_ids(patient_id).await
    }

    async fn call_team_procedure(&self, patient_id: i64) -> Result<Vec<RawRow>, StoreError> {
        self.probe("call_team_procedure")?;
        self.inner.call_team_procedure(patient_id).await
    }
}
