//! Tax id (CPF) helpers used by search and display.

use std::sync::LazyLock;

use regex::Regex;

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").expect("valid regex"));

static CPF_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})(\d{3})(\d{3})(\d{2})$").expect("valid regex"));

/// Digits only.
pub fn clean_tax_id(raw: &str) -> String {
    NON_DIGITS.replace_all(raw, "").into_owned()
}

/// `xxx.xxx.xxx-xx` for 11-digit ids; anything else is returned as given.
pub fn format_tax_id(raw: &str) -> String {
    let digits = clean_tax_id(raw);
    if CPF_PARTS.is_match(&digits) {
        CPF_PARTS.replace(&digits, "$1.$2.$3-$4").into_owned()
    } else {
        raw.to_string()
    }
}

/// True when the term carries tax id punctuation.
pub fn has_tax_id_punctuation(term: &str) -> bool {
    term.contains(['.', '-'])
}
