use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::catalog::Catalog;
use crate::extract::confidence;
use crate::extract::{context_for, origin_of};
use crate::input::Document;
use crate::model::GradeMention;

// Pattern dialects in priority order. Lightweight classes go first so their
// trailing "C##/##" is claimed whole; the worded form goes last because it
// only exists to catch designations written without the leading letter.
// Word boundaries keep the modern dialect from firing inside "LC25/28".
static LIGHTWEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLC\s?(\d{1,3})\s*/\s*(\d{1,3})\b").unwrap());
static MODERN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bC\s?(\d{1,3})\s*/\s*(\d{1,3})\b").unwrap());
static LEGACY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bB\s?(\d{1,2})\b").unwrap());
static WORDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbeton(?:u|y|ů)?\s+(?:třídy|tridy|tř\.|tr\.)\s+(\d{1,3})\s*/\s*(\d{1,3})\b")
        .unwrap()
});

/// Exposure/environment tokens; "X0" (digit) is a common variant spelling
/// of "XO" and is folded into it.
static EXPOSURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bX(?:[CDFASM]\d*|[O0])\b").unwrap());

/// Scan every line of a document for grade designations. Exposure classes
/// come from the surrounding context window, an exposure suffix on the
/// designation itself included.
pub fn extract(doc: &Document, catalog: &Catalog) -> Vec<GradeMention> {
    let mut mentions = Vec::new();

    for (idx, line) in doc.lines.iter().enumerate() {
        // (start, end, designation) per dialect, in priority order.
        let mut candidates: Vec<(usize, usize, String)> = Vec::new();
        for caps in LIGHTWEIGHT_RE.captures_iter(&line.text) {
            let m = caps.get(0).unwrap();
            candidates.push((m.start(), m.end(), format!("LC{}/{}", &caps[1], &caps[2])));
        }
        for caps in MODERN_RE.captures_iter(&line.text) {
            let m = caps.get(0).unwrap();
            candidates.push((m.start(), m.end(), format!("C{}/{}", &caps[1], &caps[2])));
        }
        for caps in LEGACY_RE.captures_iter(&line.text) {
            let m = caps.get(0).unwrap();
            candidates.push((m.start(), m.end(), format!("B{}", &caps[1])));
        }
        for caps in WORDED_RE.captures_iter(&line.text) {
            let m = caps.get(0).unwrap();
            candidates.push((m.start(), m.end(), format!("C{}/{}", &caps[1], &caps[2])));
        }

        // First dialect to claim a span wins; later overlapping matches at
        // the same offset are not double-counted.
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        for (start, end, designation) in candidates {
            if claimed.iter().any(|&(s, e)| start < e && s < end) {
                continue;
            }
            claimed.push((start, end));

            if !catalog.is_valid_grade(&designation) {
                warn!(
                    "{}:{}: dropping unrecognized grade {:?}",
                    doc.id, line.number, designation
                );
                continue;
            }

            let context = context_for(doc, idx);
            let exposure_classes = exposure_in(&context);
            let origin = origin_of(line);
            let confidence = confidence::grade_confidence(
                origin,
                catalog.is_member(&designation),
                catalog.has_context_keyword(&context),
                !exposure_classes.is_empty(),
            );

            mentions.push(GradeMention {
                designation,
                exposure_classes,
                doc: doc.id.clone(),
                line: line.number,
                context,
                confidence,
                origin,
            });
        }
    }

    mentions
}

/// Collect the deduplicated exposure-class set present in a context window.
pub fn exposure_in(context: &str) -> BTreeSet<String> {
    EXPOSURE_RE
        .find_iter(context)
        .map(|m| {
            let token = m.as_str().to_uppercase();
            if token == "X0" {
                "XO".to_string()
            } else {
                token
            }
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_text("test", text)
    }

    #[test]
    fn modern_designation_with_exposure() {
        let catalog = Catalog::builtin();
        let mentions = extract(&doc("Beton C25/30 - XC2, XF1 pro základy"), &catalog);
        assert_eq!(mentions.len(), 1);
        let m = &mentions[0];
        assert_eq!(m.designation, "C25/30");
        assert_eq!(m.line, 1);
        assert!(m.exposure_classes.contains("XC2"));
        assert!(m.exposure_classes.contains("XF1"));
    }

    #[test]
    fn lightweight_not_double_counted() {
        let catalog = Catalog::builtin();
        let mentions = extract(&doc("stropní dílce z LC25/28"), &catalog);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].designation, "LC25/28");
    }

    #[test]
    fn legacy_designation() {
        let catalog = Catalog::builtin();
        let mentions = extract(&doc("původní konstrukce z betonu B 20"), &catalog);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].designation, "B20");
    }

    #[test]
    fn worded_designation_without_letter() {
        let catalog = Catalog::builtin();
        let mentions = extract(&doc("použít beton třídy 25/30"), &catalog);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].designation, "C25/30");
    }

    #[test]
    fn worded_form_does_not_duplicate_lettered_match() {
        let catalog = Catalog::builtin();
        let mentions = extract(&doc("beton třídy C25/30"), &catalog);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].designation, "C25/30");
    }

    #[test]
    fn lowercase_input_uppercased() {
        let catalog = Catalog::builtin();
        let mentions = extract(&doc("beton c30/37"), &catalog);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].designation, "C30/37");
    }

    #[test]
    fn implausible_designation_dropped() {
        let catalog = Catalog::builtin();
        let mentions = extract(&doc("chybný zápis C999/999 vedle C25/30"), &catalog);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].designation, "C25/30");
    }

    #[test]
    fn exposure_from_neighboring_lines() {
        let catalog = Catalog::builtin();
        let mentions = extract(
            &doc("Opěrná stěna\nbeton C30/37\nprostředí XF2, XD1"),
            &catalog,
        );
        assert_eq!(mentions.len(), 1);
        assert!(mentions[0].exposure_classes.contains("XF2"));
        assert!(mentions[0].exposure_classes.contains("XD1"));
    }

    #[test]
    fn exposure_zero_spelling_folded() {
        let set = exposure_in("vnitřní prostředí X0");
        assert!(set.contains("XO"));
        assert!(!set.contains("X0"));
    }

    #[test]
    fn member_with_exposure_and_keyword_scores_high() {
        let catalog = Catalog::builtin();
        let mentions = extract(&doc("Základová deska, beton C25/30, XC2"), &catalog);
        assert!(mentions[0].confidence >= 0.9);
    }
}
