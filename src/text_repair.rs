//! Best-effort repair of double-encoded (mojibake) text.
//!
//! Legacy rows hold text that was written as UTF-8 and later read back as a
//! single-byte Latin encoding, so "João" shows up as "JoÃ£o". There is no
//! encoding tag to go by. `repair_text` looks for the telltale artifact pairs,
//! rebuilds the original byte stream and keeps a reconstruction only when it
//! passes a plausibility check. When in doubt the input comes back unchanged:
//! visible corruption is preferable to silently destroyed content.
//!
//! Pure and synchronous. Never panics, never errors.

const REPLACEMENT: char = '\u{FFFD}';

/// Lead characters of a UTF-8 two-byte sequence read as Latin-1.
const MOJIBAKE_LEADS: [char; 2] = ['\u{c3}', '\u{c2}'];

/// Two-character artifacts left by UTF-8 read as Latin-1 / Windows-1252.
const ARTIFACTS: &[&str] = &[
    // lower case
    "\u{c3}\u{a0}", // à
    "\u{c3}\u{a1}", // á
    "\u{c3}\u{a2}", // â
    "\u{c3}\u{a3}", // ã
    "\u{c3}\u{a4}", // ä
    "\u{c3}\u{a7}", // ç
    "\u{c3}\u{a8}", // è
    "\u{c3}\u{a9}", // é
    "\u{c3}\u{aa}", // ê
    "\u{c3}\u{ad}", // í
    "\u{c3}\u{b3}", // ó
    "\u{c3}\u{b4}", // ô
    "\u{c3}\u{b5}", // õ
    "\u{c3}\u{ba}", // ú
    "\u{c3}\u{bc}", // ü
    // upper case, Latin-1 reading
    "\u{c3}\u{80}", // À
    "\u{c3}\u{81}", // Á
    "\u{c3}\u{82}", // Â
    "\u{c3}\u{83}", // Ã
    "\u{c3}\u{87}", // Ç
    "\u{c3}\u{89}", // É
    "\u{c3}\u{8a}", // Ê
    "\u{c3}\u{8d}", // Í
    "\u{c3}\u{93}", // Ó
    "\u{c3}\u{94}", // Ô
    "\u{c3}\u{95}", // Õ
    "\u{c3}\u{9a}", // Ú
    "\u{c3}\u{9c}", // Ü
    // upper case, Windows-1252 reading
    "\u{c3}\u{20ac}", // À
    "\u{c3}\u{201a}", // Â
    "\u{c3}\u{192}",  // Ã
    "\u{c3}\u{2021}", // Ç
    "\u{c3}\u{2030}", // É
    "\u{c3}\u{160}",  // Ê
    "\u{c3}\u{201c}", // Ó
    "\u{c3}\u{201d}", // Ô
    "\u{c3}\u{2022}", // Õ
    "\u{c3}\u{161}",  // Ú
    // ordinals and degree sign
    "\u{c2}\u{aa}", // ª
    "\u{c2}\u{ba}", // º
    "\u{c2}\u{b0}", // °
];

/// Windows-1252 characters in the 0x80–0x9F range and their byte.
const CP1252_HIGH: &[(char, u8)] = &[
    ('\u{20ac}', 0x80),
    ('\u{201a}', 0x82),
    ('\u{192}', 0x83),
    ('\u{201e}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{2c6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{160}', 0x8a),
    ('\u{2039}', 0x8b),
    ('\u{152}', 0x8c),
    ('\u{17d}', 0x8e),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201c}', 0x93),
    ('\u{201d}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{2dc}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{161}', 0x9a),
    ('\u{203a}', 0x9b),
    ('\u{153}', 0x9c),
    ('\u{17e}', 0x9e),
    ('\u{178}', 0x9f),
];

/// Repair `input` if it carries a double-encoding signature.
pub fn repair_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    if !is_suspicious(input) {
        return input.to_string();
    }

    let chars: Vec<char> = input.chars().collect();
    // A char outside the single-byte readings was never one misread byte.
    let Some(bytes) = to_single_bytes(&chars) else {
        return input.to_string();
    };

    if let Some(candidate) = decode_utf8(&bytes) {
        if is_plausible(input, &candidate) {
            return candidate;
        }
    }

    let mixed = decode_mixed(&bytes, &chars);
    if is_plausible(input, &mixed) {
        return mixed;
    }

    input.to_string()
}

/// `repair_text` over an optional value; absent text repairs to "".
pub fn repair_optional(input: Option<&str>) -> String {
    input.map(repair_text).unwrap_or_default()
}

/// True when the text shows a replacement glyph or a known artifact pair.
pub fn is_suspicious(text: &str) -> bool {
    text.contains(REPLACEMENT) || ARTIFACTS.iter().any(|a| text.contains(a))
}

/// One byte per char under the Latin-1 / Windows-1252 reading. `None` when a
/// char has no byte in either.
fn to_single_bytes(chars: &[char]) -> Option<Vec<u8>> {
    chars
        .iter()
        .map(|&c| {
            u8::try_from(u32::from(c)).ok().or_else(|| {
                CP1252_HIGH
                    .iter()
                    .find(|(special, _)| *special == c)
                    .map(|(_, byte)| *byte)
            })
        })
        .collect()
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    String::from_utf8(bytes.to_vec()).ok()
}

/// Decode the UTF-8 runs of `bytes` and read every byte outside them back as
/// the single-byte char it came from. `bytes` holds one byte per char.
fn decode_mixed(bytes: &[u8], chars: &[char]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut offset = 0;
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        offset += chunk.valid().len();
        let end = offset + chunk.invalid().len();
        out.extend(chars.get(offset..end).unwrap_or_default());
        offset = end;
    }
    out
}

fn count_char(text: &str, target: char) -> usize {
    text.chars().filter(|&c| c == target).count()
}

fn count_leads(text: &str) -> usize {
    text.chars().filter(|c| MOJIBAKE_LEADS.contains(c)).count()
}

/// Accept a reconstruction only if it looks like it recovered content
/// rather than mangled it.
fn is_plausible(original: &str, candidate: &str) -> bool {
    if candidate.contains(REPLACEMENT) {
        return false;
    }
    if count_char(candidate, 'A') * 2 < count_char(original, 'A') {
        return false;
    }
    let introduces_enye = ['Ñ', 'ñ']
        .iter()
        .any(|&c| candidate.contains(c) && !original.contains(c));
    if introduces_enye {
        return false;
    }
    // A real repair consumes at least one artifact pair.
    count_leads(candidate) < count_leads(original)
}
