use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::DocumentError;

/// One line unit fed to the matchers. Structured estimate rows are adapted
/// into lines too, keeping their parsed fields alongside the text.
#[derive(Debug, Clone)]
pub struct Line {
    /// 1-based.
    pub number: u32,
    pub text: String,
    pub row: Option<RowFields>,
}

/// Parsed fields of a bill-of-quantities row.
#[derive(Debug, Clone)]
pub struct RowFields {
    pub quantity: Option<f64>,
    pub unit: String,
    pub unit_price: Option<f64>,
    pub total_cost: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub lines: Vec<Line>,
}

#[derive(Debug, Deserialize)]
struct EstimateRecord {
    description: String,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    unit_price: Option<String>,
    #[serde(default)]
    total_cost: Option<String>,
}

impl Document {
    pub fn from_text(id: &str, content: &str) -> Document {
        let lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| Line {
                number: (i + 1) as u32,
                text: l.to_string(),
                row: None,
            })
            .collect();
        Document {
            id: id.to_string(),
            lines,
        }
    }

    /// True when the document carries no usable text at all.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.text.trim().is_empty())
    }
}

/// Load a document from disk. `.csv` files are read as estimate rows, one
/// row per line unit; everything else is treated as plain text.
pub fn load_document(path: &Path) -> Result<Document, DocumentError> {
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();

    if path.extension().and_then(|e| e.to_str()) == Some("csv") {
        let raw = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(document_from_estimate_csv(&id, &raw));
    }

    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document::from_text(&id, &content))
}

/// Adapt estimate CSV rows into line units. Estimate exports use `;` or `,`
/// as delimiter; individual unreadable rows are skipped, they never abort
/// the document.
pub fn document_from_estimate_csv(id: &str, raw: &str) -> Document {
    let delimiter = sniff_delimiter(raw);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let mut lines = Vec::new();
    // Line 1 is the header row; data rows keep their physical numbering.
    for (i, record) in reader.deserialize::<EstimateRecord>().enumerate() {
        let number = (i + 2) as u32;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("{}: skipping estimate row {}: {}", id, number, e);
                continue;
            }
        };

        let unit = record.unit.unwrap_or_default().trim().to_lowercase();
        let fields = RowFields {
            quantity: record.quantity.as_deref().and_then(parse_locale_number),
            unit: unit.clone(),
            unit_price: record.unit_price.as_deref().and_then(parse_locale_number),
            total_cost: record.total_cost.as_deref().and_then(parse_locale_number),
        };

        // Render the numeric fields back into the text so the same pattern
        // scan covers prose and rows alike.
        let mut text = record.description.trim().to_string();
        if let Some(q) = fields.quantity {
            text.push_str(&format!(" {} {}", q, unit));
        }
        lines.push(Line {
            number,
            text,
            row: Some(fields),
        });
    }

    Document {
        id: id.to_string(),
        lines,
    }
}

fn sniff_delimiter(raw: &str) -> u8 {
    let header = raw.lines().next().unwrap_or("");
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Parse a number in either locale convention; None on failure (the caller
/// skips that single value and moves on).
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_document_lines_are_one_based() {
        let doc = Document::from_text("spec", "first\nsecond");
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.lines[0].number, 1);
        assert_eq!(doc.lines[1].number, 2);
        assert!(doc.lines[0].row.is_none());
    }

    #[test]
    fn blank_document_detected() {
        assert!(Document::from_text("d", "  \n\t\n").is_blank());
        assert!(!Document::from_text("d", "beton").is_blank());
    }

    #[test]
    fn estimate_csv_semicolon() {
        let raw = "description;quantity;unit;unit_price;total_cost\n\
                   Beton C25/30 základová deska;45,5;m3;2850;129675\n";
        let doc = document_from_estimate_csv("vykaz", raw);
        assert_eq!(doc.lines.len(), 1);
        let line = &doc.lines[0];
        assert_eq!(line.number, 2);
        let row = line.row.as_ref().unwrap();
        assert_eq!(row.quantity, Some(45.5));
        assert_eq!(row.unit, "m3");
        assert_eq!(row.unit_price, Some(2850.0));
        assert!(line.text.contains("Beton C25/30"));
        assert!(line.text.contains("45.5 m3"));
    }

    #[test]
    fn estimate_csv_comma_delimited() {
        let raw = "description,quantity,unit\nZdivo,12.0,m2\n";
        let doc = document_from_estimate_csv("vykaz", raw);
        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.lines[0].row.as_ref().unwrap().unit, "m2");
    }

    #[test]
    fn bad_row_is_skipped_not_fatal() {
        let raw = "description;quantity;unit\nBeton C20/25;10;m3\n";
        let doc = document_from_estimate_csv("vykaz", raw);
        assert_eq!(doc.lines.len(), 1);
    }

    #[test]
    fn locale_numbers() {
        assert_eq!(parse_locale_number("45,5"), Some(45.5));
        assert_eq!(parse_locale_number("45.5"), Some(45.5));
        assert_eq!(parse_locale_number("1 250,50"), Some(1250.5));
        assert_eq!(parse_locale_number(""), None);
        assert_eq!(parse_locale_number("n/a"), None);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_document(Path::new("tests/fixtures/missing.txt")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }
}
