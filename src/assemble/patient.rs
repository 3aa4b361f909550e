use crate::config::{TAX_ID_RESULT_LIMIT, TAX_ID_SCAN_LIMIT};
use crate::db::{PersonQuery, RawRow, RecordStore, StoreError};
use crate::formatters::{clean_tax_id, has_tax_id_punctuation};
use crate::models::Patient;

/// Minimum digit count for a search term to be treated as a tax id.
const TAX_ID_MIN_DIGITS: usize = 9;

/// Digits used for the broad scan when the term is unpunctuated.
const TAX_ID_SCAN_PREFIX: usize = 3;

fn patient_from_row(row: &RawRow, fallback_id: i64) -> Patient {
    Patient {
        id: row.i64("id").unwrap_or(fallback_id),
        name: row.repaired_text("name").unwrap_or_default(),
        tax_id: row.text("tax_id"),
        birth_date: row.date("birth_date"),
        email: row.text("email"),
        address: row.repaired_text("address"),
        phone: row.text("phone"),
        mobile: row.text("mobile"),
    }
}

/// Patient identity. `Ok(None)` when no person has this id.
pub async fn get_patient<S>(store: &S, patient_id: i64) -> Result<Option<Patient>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let row = store.fetch_person(patient_id).await?;
    Ok(row.map(|r| patient_from_row(&r, patient_id)))
}

/// How a free search term is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    Name(String),
    /// Tax id search. `fragment` goes to the store; results are then kept
    /// only when their cleaned tax id overlaps `digits`.
    TaxId { fragment: String, digits: String },
}

/// A term is a tax id when it holds at least nine digits and nothing but
/// digits, tax id punctuation and spaces. Punctuated terms are matched as
/// typed; bare digits scan on their first three digits, since stored ids are
/// usually punctuated.
pub fn plan_search(term: &str) -> SearchPlan {
    let trimmed = term.trim();
    let digits = clean_tax_id(trimmed);
    let only_tax_chars = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c.is_whitespace());

    if digits.len() < TAX_ID_MIN_DIGITS || !only_tax_chars {
        return SearchPlan::Name(trimmed.to_string());
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let fragment = if has_tax_id_punctuation(&compact) {
        compact
    } else {
        digits[..TAX_ID_SCAN_PREFIX].to_string()
    };
    SearchPlan::TaxId { fragment, digits }
}

fn tax_id_overlaps(stored: Option<&str>, digits: &str) -> bool {
    let stored = clean_tax_id(stored.unwrap_or_default());
    !stored.is_empty() && (stored.contains(digits) || digits.contains(&stored))
}

/// Search patients by partial name or by tax id, ordered by name.
/// A blank term matches nothing.
pub async fn search_patients<S>(store: &S, term: &str) -> Result<Vec<Patient>, StoreError>
where
    S: RecordStore + ?Sized,
{
    if term.trim().is_empty() {
        return Ok(Vec::new());
    }

    match plan_search(term) {
        SearchPlan::Name(name) => {
            let rows = store.search_persons(&PersonQuery::Name(name)).await?;
            Ok(rows.iter().map(|r| patient_from_row(r, 0)).collect())
        }
        SearchPlan::TaxId { fragment, digits } => {
            let query = PersonQuery::TaxId {
                fragment,
                limit: Some(TAX_ID_SCAN_LIMIT),
            };
            let rows = store.search_persons(&query).await?;
            let scanned = rows.len();
            let matches: Vec<Patient> = rows
                .iter()
                .filter(|r| tax_id_overlaps(r.text("tax_id").as_deref(), &digits))
                .take(TAX_ID_RESULT_LIMIT)
                .map(|r| patient_from_row(r, 0))
                .collect();
            tracing::debug!(scanned, matched = matches.len(), "Tax id search");
            Ok(matches)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed, seeded_store, ProbeStore, PATIENT_FULL};

    #[test]
    fn plans_name_search_for_text() {
        assert_eq!(plan_search("  maria "), SearchPlan::Name("maria".into()));
        assert_eq!(plan_search("12345678"), SearchPlan::Name("12345678".into()));
        assert_eq!(plan_search("Maria 123456789"), SearchPlan::Name("Maria 123456789".into()));
    }

    #[test]
    fn plans_direct_match_for_punctuated_tax_id() {
        assert_eq!(
            plan_search("100.592.046-05"),
            SearchPlan::TaxId {
                fragment: "100.592.046-05".into(),
                digits: "10059204605".into()
            }
        );
    }

    #[test]
    fn plans_prefix_scan_for_bare_digits() {
        assert_eq!(
            plan_search("100 592 046 05"),
            SearchPlan::TaxId {
                fragment: "100".into(),
                digits: "10059204605".into()
            }
        );
    }

    #[tokio::test]
    async fn identity_is_normalized_and_repaired() {
        let store = seeded_store();
        let patient = get_patient(&store, PATIENT_FULL).await.unwrap().unwrap();
        assert_eq!(patient.id, PATIENT_FULL);
        assert_eq!(patient.name, "Maria da Conceição");
        assert_eq!(patient.birth_date.map(|d| d.to_string()).as_deref(), Some("1985-03-14"));
        assert_eq!(patient.formatted_tax_id().as_deref(), Some("100.592.046-05"));
    }

    #[tokio::test]
    async fn unknown_patient_is_none() {
        let store = seeded_store();
        assert!(get_patient(&store, 4242).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn name_search_is_partial_and_case_insensitive() {
        let store = seeded_store();
        let found = search_patients(&store, "silva").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 101);
    }

    #[tokio::test]
    async fn bare_digit_search_matches_punctuated_ids() {
        let store = ProbeStore::new(seeded_store());
        let found = search_patients(&store, "10059204605").await.unwrap();
        let ids: Vec<i64> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PATIENT_FULL]);
        assert_eq!(store.calls("search_persons"), 1);
    }

    #[tokio::test]
    async fn bare_digit_prefix_keeps_only_overlapping_ids() {
        let store = seeded_store();
        // Both 100.592.046-05 and 10059299999 share the "100" prefix.
        let found = search_patients(&store, "100592999").await.unwrap();
        let ids: Vec<i64> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![101]);
    }

    #[tokio::test]
    async fn punctuated_search_matches_directly() {
        let store = seeded_store();
        let found = search_patients(&store, "123.456.789-00").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Pedro Alves");
    }

    #[tokio::test]
    async fn tax_id_results_are_capped() {
        let store = seeded_store();
        let mut sql = String::new();
        for i in 0..60 {
            sql.push_str(&format!(
                "INSERT INTO persons (id, name, tax_id) VALUES ({}, 'Bulk {i:02}', '555.444.333-{i:02}');",
                1000 + i
            ));
        }
        seed(&store, &sql);
        let found = search_patients(&store, "555444333").await.unwrap();
        assert_eq!(found.len(), TAX_ID_RESULT_LIMIT);
    }

    #[tokio::test]
    async fn blank_term_matches_nothing() {
        let store = ProbeStore::new(seeded_store());
        assert!(search_patients(&store, "   ").await.unwrap().is_empty());
        assert_eq!(store.total_calls(), 0);
    }
}
