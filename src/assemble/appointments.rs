use crate::db::{RawRow, RecordStore, StoreError};
use crate::lookup;
use crate::models::{Appointment, AppointmentStatus};

use super::{distinct_ids, or_degraded, sort_newest_first};

/// Attended wins over blocked, blocked over cancelled, cancelled over missed.
pub fn derive_status(row: &RawRow) -> AppointmentStatus {
    if row.flag("attended") {
        AppointmentStatus::Attended
    } else if row.flag("blocked") {
        AppointmentStatus::Blocked
    } else if row.text("cancelled_on").is_some() {
        AppointmentStatus::Cancelled
    } else if row.text("missed_on").is_some() {
        AppointmentStatus::Missed
    } else {
        AppointmentStatus::Scheduled
    }
}

/// Appointments of a patient, newest first, with provider names resolved.
pub async fn assemble_appointments<S>(store: &S, patient_id: i64) -> Result<Vec<Appointment>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let rows = store.fetch_appointments(patient_id).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let provider_ids = distinct_ids(rows.iter().map(|r| r.i64("provider_id")));
    let names = or_degraded(
        lookup::person_names(store, provider_ids),
        "appointments",
        "provider names",
    )
    .await;

    let mut appointments: Vec<Appointment> = rows
        .iter()
        .filter_map(|row| {
            let id = row.i64("id")?;
            let provider_id = row.i64("provider_id");
            Some(Appointment {
                id,
                date: row.date("date"),
                time: row.time("time"),
                status: derive_status(row),
                provider_id,
                provider_name: provider_id.and_then(|p| names.get(&p).cloned()),
            })
        })
        .collect();

    sort_newest_first(&mut appointments, |a| (a.date, a.time));
    Ok(appointments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seeded_store, ProbeStore, PATIENT_EMPTY, PATIENT_FULL};
    use serde_json::json;

    #[test]
    fn status_precedence() {
        let base = RawRow::new();
        assert_eq!(derive_status(&base), AppointmentStatus::Scheduled);

        let missed = base.clone().with("missed_on", "2024-01-01");
        assert_eq!(derive_status(&missed), AppointmentStatus::Missed);

        let cancelled = missed.clone().with("cancelled_on", "2024-01-01");
        assert_eq!(derive_status(&cancelled), AppointmentStatus::Cancelled);

        let blocked = cancelled.clone().with("blocked", 1);
        assert_eq!(derive_status(&blocked), AppointmentStatus::Blocked);

        let attended = blocked.clone().with("attended", json!(true));
        assert_eq!(derive_status(&attended), AppointmentStatus::Attended);

        let not_attended = blocked.with("attended", 0);
        assert_eq!(derive_status(&not_attended), AppointmentStatus::Blocked);
    }

    #[tokio::test]
    async fn newest_first_with_statuses_and_names() {
        let store = ProbeStore::new(seeded_store());
        let appts = assemble_appointments(&store, PATIENT_FULL).await.unwrap();

        let ids: Vec<i64> = appts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5, 2, 3, 1, 4]);

        let status = |id: i64| appts.iter().find(|a| a.id == id).unwrap().status;
        assert_eq!(status(1), AppointmentStatus::Attended);
        assert_eq!(status(2), AppointmentStatus::Cancelled);
        assert_eq!(status(3), AppointmentStatus::Blocked);
        assert_eq!(status(4), AppointmentStatus::Missed);
        assert_eq!(status(5), AppointmentStatus::Scheduled);

        assert_eq!(appts[1].provider_name.as_deref(), Some("Dra. Ana Costa"));
        // Provider 99 has no person row.
        assert_eq!(appts[0].provider_name, None);
        // No provider on this one.
        assert_eq!(appts[4].provider_id, None);

        assert_eq!(store.calls("fetch_by_ids:person"), 1);
        assert_eq!(store.last_ids("fetch_by_ids"), vec![10, 11, 99]);
    }

    #[tokio::test]
    async fn no_appointments_no_lookup() {
        let store = ProbeStore::new(seeded_store());
        let appts = assemble_appointments(&store, PATIENT_EMPTY).await.unwrap();
        assert!(appts.is_empty());
        assert_eq!(store.calls("fetch_by_ids"), 0);
    }

    #[tokio::test]
    async fn name_lookup_failure_keeps_appointments() {
        let store = ProbeStore::new(seeded_store());
        store.fail("fetch_by_ids", StoreError::query("08006", "connection reset"));
        let appts = assemble_appointments(&store, PATIENT_FULL).await.unwrap();
        assert_eq!(appts.len(), 5);
        assert!(appts.iter().all(|a| a.provider_name.is_none()));
    }

    #[tokio::test]
    async fn primary_failure_propagates() {
        let store = ProbeStore::new(seeded_store());
        store.fail("fetch_appointments", StoreError::query("08006", "connection reset"));
        assert!(assemble_appointments(&store, PATIENT_FULL).await.is_err());
    }
}
