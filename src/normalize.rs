use std::sync::LazyLock;

use regex::Regex;

/// Decimal comma between digits; the catalogue and all output use `.`.
static DECIMAL_COMMA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d),(\d)").unwrap());
/// Non-breaking / narrow spaces used as thousands separators in estimate
/// exports ("1 250,5"). Plain ASCII spaces are left alone: "45 m3" is a
/// quantity, not a grouped number.
static GROUP_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(\\d)[\u{00A0}\u{202F}](\\d)").unwrap());

/// Corrupted character sequences and their repairs, longest key first.
/// Two corruption families show up in practice: UTF-8 bytes re-decoded as
/// cp1252 ("Å™" for "ř") and cp1250 text read as latin-1 ("ø" for "ř").
/// A multi-char key must be resolved before any of its substrings: "Ä›"
/// has to win over the bare "Ä" below it.
const REPAIRS: &[(&str, &str)] = &[
    // three chars
    ("\u{00E2}\u{20AC}\u{201C}", "–"), // "â€“"
    ("\u{00E2}\u{20AC}\u{0153}", "\""), // "â€œ"
    // two chars: UTF-8-as-cp1252 lowercase
    ("Å™", "ř"),
    ("Å¡", "š"),
    ("Å¾", "ž"),
    ("Ä›", "ě"),
    ("Å¯", "ů"),
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã­", "í"),
    ("Ã½", "ý"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Å¥", "ť"),
    ("Ä\u{008F}", "ď"),
    ("Ä\u{008D}", "č"),
    // two chars: uppercase
    ("Å˜", "Ř"),
    ("Å\u{00A0}", "Š"),
    ("Å½", "Ž"),
    ("Äš", "Ě"),
    ("Ä\u{008C}", "Č"),
    // single chars: cp1250 text read as latin-1
    ("ø", "ř"),
    ("ì", "ě"),
    ("è", "č"),
    ("ù", "ů"),
    ("¹", "š"),
    ("¾", "ž"),
    ("»", "ť"),
    ("ò", "ň"),
    // single-char leftovers of the cp1252 family, after longer keys
    ("Ä", "č"),
    ("Ã", "Á"),
];

/// Repair corrupted diacritics and unify numeric formats. Returns the
/// cleaned text and the number of substitutions made; already-clean text
/// comes back unchanged with a zero count. Never fails.
pub fn normalize(text: &str) -> (String, usize) {
    if text.is_empty() {
        return (String::new(), 0);
    }

    let mut out = text.to_string();
    let mut changes = 0usize;

    for (bad, good) in REPAIRS {
        let hits = out.matches(bad).count();
        if hits > 0 {
            out = out.replace(bad, good);
            changes += hits;
        }
    }

    changes += GROUP_SPACE_RE.find_iter(&out).count();
    out = GROUP_SPACE_RE.replace_all(&out, "$1$2").into_owned();

    changes += DECIMAL_COMMA_RE.find_iter(&out).count();
    out = DECIMAL_COMMA_RE.replace_all(&out, "$1.$2").into_owned();

    (out, changes)
}

// ── Tests ──
