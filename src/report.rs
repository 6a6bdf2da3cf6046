use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::{summary, DocumentFacts};
use crate::model::{GradeMention, LinkedEntry, Summary};
use crate::runner::FailedDocument;

/// Serialized batch result: every linked entry and validated grade mention,
/// plus the derived summary. All numerics use `.` decimals.
#[derive(Debug, Serialize, Deserialize)]
pub struct FactExport {
    pub generated_at: DateTime<Utc>,
    pub documents: usize,
    pub failed: Vec<FailedDocument>,
    pub grades: Vec<GradeMention>,
    pub entries: Vec<LinkedEntry>,
    pub summary: Summary,
}

pub fn build_export(facts: &[DocumentFacts], failed: Vec<FailedDocument>) -> FactExport {
    let entries: Vec<LinkedEntry> = facts.iter().flat_map(|f| f.entries.clone()).collect();
    let grades: Vec<GradeMention> = facts.iter().flat_map(|f| f.grades.clone()).collect();
    let summary = summary::aggregate(&entries);

    FactExport {
        generated_at: Utc::now(),
        documents: facts.len(),
        failed,
        grades,
        entries,
        summary,
    }
}

pub fn write_json(path: &Path, export: &FactExport) -> Result<()> {
    let json = serde_json::to_string_pretty(export)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn read_json(path: &Path) -> Result<FactExport> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Compact, readable entry listing.
pub fn print_entries(entries: &[LinkedEntry], limit: usize) {
    println!(
        "{:>3} | {:<8} | {:<16} | {:>9} | {:<4} | {:>10} | {:<20} | {:>4}",
        "#", "Grade", "Element", "Vol m3", "Unit", "Cost", "Source", "Conf"
    );
    println!("{}", "-".repeat(92));

    for (i, e) in entries.iter().take(limit).enumerate() {
        let grade = if e.grade.is_empty() { "-" } else { &e.grade };
        let source = truncate(&format!("{}:{}", e.doc, e.line), 20);
        println!(
            "{:>3} | {:<8} | {:<16} | {:>9} | {:<4} | {:>10} | {:<20} | {:>4.2}",
            i + 1,
            grade,
            truncate(&e.element, 16),
            fmt_opt(e.volume_m3),
            e.unit.label(),
            fmt_opt(e.total_cost),
            source,
            e.confidence,
        );
    }

    if entries.len() > limit {
        println!("... and {} more", entries.len() - limit);
    }
}

pub fn print_summary(summary: &Summary) {
    println!("\n--- By grade ---");
    println!(
        "{:<10} | {:>10} | {:>12} | {:>7}",
        "Grade", "Vol m3", "Cost", "Entries"
    );
    println!("{}", "-".repeat(48));
    for g in &summary.by_grade {
        println!(
            "{:<10} | {:>10.2} | {:>12.2} | {:>7}",
            g.key, g.volume_m3, g.total_cost, g.entries
        );
    }

    println!("\n--- By element ---");
    println!(
        "{:<16} | {:>10} | {:>12} | {:>7}",
        "Element", "Vol m3", "Cost", "Entries"
    );
    println!("{}", "-".repeat(54));
    for e in &summary.by_element {
        println!(
            "{:<16} | {:>10.2} | {:>12.2} | {:>7}",
            truncate(&e.key, 16),
            e.volume_m3,
            e.total_cost,
            e.entries
        );
    }

    println!(
        "\n{} entries | total {:.2} m3 | total cost {:.2}",
        summary.entry_count, summary.total_volume_m3, summary.total_cost
    );
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
