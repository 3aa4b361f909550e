use std::cmp::Ordering;
use std::collections::HashMap;

use crate::db::{RawRow, RecordStore, StoreError};
use crate::lookup::{self, ProcedureRef};
use crate::models::{
    AuditDetails, Budget, BudgetItem, BudgetKind, BudgetTerms, ClinicalTerms, InstallmentTerms,
    TransferDetails,
};

use super::{distinct_ids, or_degraded, sort_newest_first};

const TRANSFER_FIELDS: &[&str] = &[
    "transfer_date",
    "transfer_value",
    "transfer_is_value",
    "transfer_base",
    "transfer_reason",
];

const AUDIT_FIELDS: &[&str] = &["created_by", "created_at", "updated_by", "updated_at"];

/// Every budget of the patient, any type, newest first.
pub async fn assemble_budgets<S>(store: &S, patient_id: i64) -> Result<Vec<Budget>, StoreError>
where
    S: RecordStore + ?Sized,
{
    assemble_budget_set(store, patient_id, None, "budgets").await
}

/// Orthodontic budgets only, newest first.
pub async fn assemble_orthodontics<S>(store: &S, patient_id: i64) -> Result<Vec<Budget>, StoreError>
where
    S: RecordStore + ?Sized,
{
    assemble_budget_set(store, patient_id, BudgetKind::Orthodontic.tag(), "orthodontics").await
}

async fn assemble_budget_set<S>(
    store: &S,
    patient_id: i64,
    type_tag: Option<i64>,
    section: &str,
) -> Result<Vec<Budget>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let rows = store.fetch_budgets(patient_id, type_tag).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let budget_ids: Vec<i64> = distinct_ids(rows.iter().map(|r| r.i64("id")))
        .into_iter()
        .collect();
    let provider_ids = distinct_ids(rows.iter().map(|r| r.i64("provider_id")));

    // Names and items are independent of each other.
    let (names, item_rows) = tokio::join!(
        or_degraded(lookup::person_names(store, provider_ids), section, "provider names"),
        or_degraded(store.fetch_budget_items(&budget_ids), section, "line items"),
    );

    let procedure_ids = distinct_ids(item_rows.iter().map(procedure_reference));
    let procedures = or_degraded(lookup::procedures(store, procedure_ids), section, "procedures").await;

    let mut items_by_budget = group_items(&item_rows, &procedures);

    let mut budgets: Vec<Budget> = rows
        .iter()
        .filter_map(|row| {
            let id = row.i64("id")?;
            let provider_id = row.i64("provider_id");
            let type_tag = row.i64("type_tag").unwrap_or(0);
            Some(Budget {
                id,
                number: row.i64("number"),
                date: row.date("date"),
                total: row.f64("total"),
                type_tag,
                provider_id,
                provider_name: provider_id.and_then(|p| names.get(&p).cloned()),
                terms: terms_from_row(row, BudgetKind::from_tag(type_tag)),
                items: items_by_budget.remove(&id).unwrap_or_default(),
            })
        })
        .collect();

    sort_newest_first(&mut budgets, |b| (b.date, None));
    Ok(budgets)
}

fn terms_from_row(row: &RawRow, kind: BudgetKind) -> BudgetTerms {
    match kind {
        BudgetKind::Clinical => BudgetTerms::Clinical(ClinicalTerms {
            insurer_id: row.i64("insurer_id"),
            plan_id: row.i64("plan_id"),
            clinic_id: row.i64("clinic_id"),
            guide_number: row.text("guide_number"),
            situation_id: row.i64("situation_id"),
            notes: row.repaired_text("notes"),
            discount: row.f64("discount"),
            discount_type: row.i64("discount_type"),
            closed: row.flag("closed"),
            membership_number: row.text("membership_number"),
            holder: row.repaired_text("holder"),
            copay_total: row.f64("copay_total"),
        }),
        BudgetKind::Orthodontic => BudgetTerms::Orthodontic(installment_terms(row)),
        BudgetKind::Monthly => BudgetTerms::Monthly(installment_terms(row)),
    }
}

fn installment_terms(row: &RawRow) -> InstallmentTerms {
    InstallmentTerms {
        start_date: row.date("start_date"),
        installments: row.i64("installments"),
        due_date: row.date("due_date"),
    }
}

/// Catalogue id a line item refers to: the explicit procedure id, else the
/// raw item id.
fn procedure_reference(row: &RawRow) -> Option<i64> {
    row.i64("procedure_id").or_else(|| row.i64("item_id"))
}

/// Display code: explicit line, then catalogue code, then catalogue number,
/// then the raw item id.
pub fn item_code(line: Option<&str>, procedure: Option<&ProcedureRef>, item_id: Option<i64>) -> String {
    line.map(str::to_string)
        .or_else(|| procedure.and_then(|p| p.display_code()).map(str::to_string))
        .or_else(|| item_id.map(|id| id.to_string()))
        .unwrap_or_default()
}

/// Finite numeric value of a line, if it has one.
fn numeric_line(item: &BudgetItem) -> Option<f64> {
    item.line
        .as_deref()
        .and_then(|l| l.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Numeric lines first, then other lines, then items without a line.
fn line_rank(item: &BudgetItem) -> u8 {
    match (&item.line, numeric_line(item)) {
        (Some(_), Some(_)) => 0,
        (Some(_), None) => 1,
        (None, _) => 2,
    }
}

/// Line ordering: numeric lines by value, other lines by text, items without
/// a line last, then item id.
pub fn compare_items(a: &BudgetItem, b: &BudgetItem) -> Ordering {
    line_rank(a)
        .cmp(&line_rank(b))
        .then_with(|| match (numeric_line(a), numeric_line(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        })
        .then_with(|| a.line.cmp(&b.line))
        .then(a.id.cmp(&b.id))
}

fn item_from_row(row: &RawRow, procedures: &HashMap<i64, ProcedureRef>) -> Option<BudgetItem> {
    let id = row.i64("id")?;
    let budget_id = row.i64("budget_id")?;
    let line = row.text("line");
    let item_id = row.i64("item_id");
    let procedure = procedure_reference(row).and_then(|p| procedures.get(&p));

    let transfer = row.any_present(TRANSFER_FIELDS).then(|| TransferDetails {
        date: row.date("transfer_date"),
        value: row.f64("transfer_value"),
        is_value: row.i64("transfer_is_value"),
        base: row.f64("transfer_base"),
        reason: row.repaired_text("transfer_reason"),
    });
    let audit = row.any_present(AUDIT_FIELDS).then(|| AuditDetails {
        created_by: row.text("created_by"),
        created_at: row.text("created_at"),
        updated_by: row.text("updated_by"),
        updated_at: row.text("updated_at"),
    });

    Some(BudgetItem {
        id,
        budget_id,
        code: item_code(line.as_deref(), procedure, item_id),
        line,
        item_id,
        description: procedure.and_then(|p| p.name.clone()),
        quantity: row.f64("quantity"),
        unit_value: row.f64("unit_value"),
        total: row.f64("total"),
        discount: row.f64("discount"),
        date: row.date("date"),
        tooth_number: row.text("tooth_number"),
        phase: row.i64("phase"),
        performed: row.flag("performed"),
        billed: row.flag("billed"),
        notes: row.repaired_text("notes"),
        transfer,
        audit,
    })
}

/// Group the batched item rows by budget, each group in line order.
fn group_items(
    rows: &[RawRow],
    procedures: &HashMap<i64, ProcedureRef>,
) -> HashMap<i64, Vec<BudgetItem>> {
    let mut grouped: HashMap<i64, Vec<BudgetItem>> = HashMap::new();
    for item in rows.iter().filter_map(|r| item_from_row(r, procedures)) {
        grouped.entry(item.budget_id).or_default().push(item);
    }
    for items in grouped.values_mut() {
        items.sort_by(compare_items);
    }
    grouped
}
