pub mod confidence;
pub mod dedup;
pub mod elements;
pub mod grades;
pub mod link;
pub mod summary;
pub mod volumes;

use tracing::debug;

use crate::catalog::Catalog;
use crate::input::{Document, Line};
use crate::model::{GradeMention, LinkedEntry, Origin};
use crate::normalize;

/// Neighboring lines on each side of a match that form its context window.
pub(crate) const CONTEXT_RADIUS: usize = 2;
/// Context snippets stored on mentions are capped; matching uses the full
/// window before the cap is applied.
const CONTEXT_MAX_CHARS: usize = 240;

/// Everything extracted from one document.
#[derive(Debug, Clone)]
pub struct DocumentFacts {
    pub doc: String,
    pub grades: Vec<GradeMention>,
    pub entries: Vec<LinkedEntry>,
}

impl DocumentFacts {
    pub fn empty(doc: &str) -> DocumentFacts {
        DocumentFacts {
            doc: doc.to_string(),
            grades: Vec::new(),
            entries: Vec::new(),
        }
    }
}

/// Run the full per-document pipeline: normalize each line, match grades
/// and volumes, validate, deduplicate and cross-link. A document with no
/// usable text yields an empty fact set, never an error.
pub fn process_document(raw: &Document, catalog: &Catalog) -> DocumentFacts {
    let mut changes = 0usize;
    let lines: Vec<Line> = raw
        .lines
        .iter()
        .map(|l| {
            let (text, c) = normalize::normalize(&l.text);
            changes += c;
            Line {
                number: l.number,
                text,
                row: l.row.clone(),
            }
        })
        .collect();
    let doc = Document {
        id: raw.id.clone(),
        lines,
    };
    if changes > 0 {
        debug!("{}: repaired {} corrupted sequences", doc.id, changes);
    }

    if doc.is_blank() {
        return DocumentFacts::empty(&doc.id);
    }

    let grades = dedup::dedup_grades(grades::extract(&doc, catalog));
    let volumes = dedup::dedup_volumes(volumes::extract(&doc, catalog));
    let entries = link::link(volumes, &grades);

    DocumentFacts {
        doc: doc.id,
        grades,
        entries,
    }
}

/// Context for a line's candidates. Free text gets the neighboring-lines
/// window; a structured row is a self-contained unit, so its own text is
/// the whole context and neighboring rows never bleed into it.
pub(crate) fn context_for(doc: &Document, idx: usize) -> String {
    if doc.lines[idx].row.is_some() {
        bound(doc.lines[idx].text.trim().to_string())
    } else {
        context_window(doc, idx)
    }
}

/// Current line joined with its neighbors, trimmed and bounded.
pub(crate) fn context_window(doc: &Document, idx: usize) -> String {
    let start = idx.saturating_sub(CONTEXT_RADIUS);
    let end = (idx + CONTEXT_RADIUS + 1).min(doc.lines.len());
    let joined = doc.lines[start..end]
        .iter()
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    bound(joined)
}

fn bound(text: String) -> String {
    if text.chars().count() > CONTEXT_MAX_CHARS {
        text.chars().take(CONTEXT_MAX_CHARS).collect()
    } else {
        text
    }
}

pub(crate) fn origin_of(line: &Line) -> Origin {
    if line.row.is_some() {
        Origin::StructuredRow
    } else {
        Origin::Pattern
    }
}

// ── Tests ──
