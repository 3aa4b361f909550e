use std::collections::HashMap;

use chrono::NaiveDate;

use crate::db::{RawRow, RecordStore, StoreError};
use crate::lookup;
use crate::models::{BudgetImage, ClinicalImage};

use super::{distinct_ids, or_degraded, sort_newest_first};

/// Clinical images of a patient, newest first, with provider names.
pub async fn assemble_images<S>(store: &S, patient_id: i64) -> Result<Vec<ClinicalImage>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let rows = store.fetch_images(patient_id).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let provider_ids = distinct_ids(rows.iter().map(|r| r.i64("provider_id")));
    let names = or_degraded(lookup::person_names(store, provider_ids), "images", "provider names").await;

    let mut images: Vec<ClinicalImage> = rows
        .iter()
        .filter_map(|row| {
            let provider_id = row.i64("provider_id");
            Some(ClinicalImage {
                id: row.i64("id")?,
                date: row.date("date"),
                history: row.repaired_text("history"),
                path: row.text("path"),
                tooth_id: row.i64("tooth_id"),
                face_id: row.i64("face_id"),
                budget_image: row.text("budget_image"),
                provider_id,
                provider_name: provider_id.and_then(|p| names.get(&p).cloned()),
            })
        })
        .collect();

    sort_newest_first(&mut images, |i| (i.date, None));
    Ok(images)
}

/// Images attached to any of the patient's budgets, each tagged with the
/// date of its budget.
pub async fn assemble_budget_images<S>(store: &S, patient_id: i64) -> Result<Vec<BudgetImage>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let budgets = store.fetch_budgets(patient_id, None).await?;
    let budget_dates: HashMap<i64, Option<NaiveDate>> = budgets
        .iter()
        .filter_map(|b| Some((b.i64("id")?, b.date("date"))))
        .collect();
    if budget_dates.is_empty() {
        return Ok(Vec::new());
    }

    let budget_ids: Vec<i64> = distinct_ids(budget_dates.keys().map(|id| Some(*id)))
        .into_iter()
        .collect();
    let rows = store.fetch_budget_images(&budget_ids).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let provider_ids = distinct_ids(rows.iter().map(|r| r.i64("provider_id")));
    let names = or_degraded(
        lookup::person_names(store, provider_ids),
        "budget_images",
        "provider names",
    )
    .await;

    let mut images: Vec<BudgetImage> = rows
        .iter()
        .filter_map(|row| budget_image_from_row(row, &budget_dates, &names))
        .collect();

    sort_newest_first(&mut images, |i| (i.date, None));
    Ok(images)
}

fn budget_image_from_row(
    row: &RawRow,
    budget_dates: &HashMap<i64, Option<NaiveDate>>,
    names: &HashMap<i64, String>,
) -> Option<BudgetImage> {
    let budget_id = row.i64("budget_id")?;
    let provider_id = row.i64("provider_id");
    Some(BudgetImage {
        id: row.i64("id")?,
        budget_id,
        budget_date: budget_dates.get(&budget_id).copied().flatten(),
        date: row.date("date"),
        history: row.repaired_text("history"),
        path: row.text("path"),
        tooth_id: row.i64("tooth_id"),
        face_id: row.i64("face_id"),
        budget_image: row.text("budget_image"),
        evaluation_id: row.i64("evaluation_id"),
        provider_id,
        provider_name: provider_id.and_then(|p| names.get(&p).cloned()),
    })
}
