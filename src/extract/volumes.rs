use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Catalog;
use crate::extract::confidence;
use crate::extract::grades::exposure_in;
use crate::extract::{context_for, elements, origin_of};
use crate::input::{parse_locale_number, Document, Line};
use crate::model::{Unit, VolumeMention};

// One pattern group per unit family. Quantities anchor on the current line;
// thickness and prices may sit on a neighboring line and are taken from the
// context window.
static VOLUME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*m(?:3|³)\b").unwrap());
static AREA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*m(?:2|²)\b").unwrap());
static THICKNESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:tl\.?|tlou\w+)\s*:?\s*(\d+(?:[.,]\d+)?)\s*mm\b").unwrap());
static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*ks\b").unwrap());
static MASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*t\b").unwrap());
// Unit prices are matched before bare amounts and their spans claimed, so
// "2850 Kč/m3" is never also read as a total. (The regex engine has no
// lookahead; span claiming does the same job.)
static UNIT_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:Kč|CZK)\s*/\s*(?:m3|m³|m2|m²|ks|t)\b").unwrap()
});
static TOTAL_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:Kč|CZK)\b").unwrap());

/// Scan every line for quantity/price mentions. A line yields at most one
/// mention; unparsable numeric tokens are skipped without aborting the line.
pub fn extract(doc: &Document, catalog: &Catalog) -> Vec<VolumeMention> {
    let mut mentions = Vec::new();

    for (idx, line) in doc.lines.iter().enumerate() {
        let context = context_for(doc, idx);

        let mut volume_m3 = first_number(&VOLUME_RE, &line.text);
        let mut area_m2 = first_number(&AREA_RE, &line.text);
        let count = first_number(&COUNT_RE, &line.text);
        let mass = first_number(&MASS_RE, &line.text);
        let mut thickness_mm =
            first_number(&THICKNESS_RE, &line.text).or_else(|| first_number(&THICKNESS_RE, &context));
        let (mut unit_price, mut total_cost) = prices_in(&context);

        let text_hit =
            volume_m3.is_some() || area_m2.is_some() || count.is_some() || mass.is_some();

        // Structured rows carry their numbers authoritatively; the pattern
        // scan only fills what the row lacks.
        if let Some(row) = &line.row {
            match row.unit.as_str() {
                "m3" => volume_m3 = row.quantity.or(volume_m3),
                "m2" => area_m2 = row.quantity.or(area_m2),
                "mm" => thickness_mm = row.quantity.or(thickness_mm),
                _ => {}
            }
            unit_price = row.unit_price.or(unit_price);
            total_cost = row.total_cost.or(total_cost);
        }

        let row_hit = line
            .row
            .as_ref()
            .is_some_and(|r| r.quantity.is_some() && unit_of_row(r.unit.as_str()).is_some());
        if !text_hit && !row_hit {
            continue;
        }

        // Derive volume from area and thickness when it is not explicit.
        if volume_m3.is_none() {
            if let (Some(area), Some(thickness)) = (area_m2, thickness_mm) {
                volume_m3 = Some(area * thickness / 1000.0);
            }
        }

        // Primary unit tag: volume > area > count > mass.
        let unit = if first_number(&VOLUME_RE, &line.text).is_some() || row_unit_is(line, "m3") {
            Unit::M3
        } else if area_m2.is_some() {
            Unit::M2
        } else if count.is_some() || row_unit_is(line, "ks") {
            Unit::Ks
        } else if mass.is_some() || row_unit_is(line, "t") {
            Unit::T
        } else {
            Unit::M3
        };

        let origin = origin_of(line);
        let element = elements::classify(&context, catalog);
        let confidence = confidence::volume_confidence(
            origin,
            text_hit || row_hit,
            unit_price.is_some(),
            catalog.has_context_keyword(&context),
            !exposure_in(&context).is_empty(),
        );

        mentions.push(VolumeMention {
            grade: None,
            volume_m3,
            area_m2,
            thickness_mm,
            unit_price,
            total_cost,
            unit,
            element,
            doc: doc.id.clone(),
            line: line.number,
            context,
            confidence,
            origin,
        });
    }

    mentions
}

fn unit_of_row(unit: &str) -> Option<Unit> {
    match unit {
        "m3" => Some(Unit::M3),
        "m2" => Some(Unit::M2),
        "ks" => Some(Unit::Ks),
        "t" => Some(Unit::T),
        _ => None,
    }
}

fn row_unit_is(line: &Line, unit: &str) -> bool {
    line.row.as_ref().is_some_and(|r| r.unit == unit)
}

fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text)
        .find_map(|caps| parse_locale_number(&caps[1]))
}

/// Unit price and total amount in a window. Unit-price spans are claimed
/// first so the bare-amount pattern cannot re-read their numeric prefix.
fn prices_in(context: &str) -> (Option<f64>, Option<f64>) {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut unit_price = None;
    for caps in UNIT_PRICE_RE.captures_iter(context) {
        let m = caps.get(0).expect("capture 0 always present");
        claimed.push((m.start(), m.end()));
        if unit_price.is_none() {
            unit_price = parse_locale_number(&caps[1]);
        }
    }

    let mut total_cost = None;
    for caps in TOTAL_PRICE_RE.captures_iter(context) {
        let m = caps.get(0).expect("capture 0 always present");
        if claimed.iter().any(|&(s, e)| m.start() < e && s < m.end()) {
            continue;
        }
        if total_cost.is_none() {
            total_cost = parse_locale_number(&caps[1]);
        }
    }

    (unit_price, total_cost)
}

// ── Tests ──
