use std::collections::HashMap;

use crate::model::{GradeMention, VolumeMention};

/// Collapse repeated grade mentions keyed by (designation, document, line).
/// The highest-confidence instance survives; ties keep the earliest one.
/// Running the pass twice changes nothing.
pub fn dedup_grades(mentions: Vec<GradeMention>) -> Vec<GradeMention> {
    let mut kept: Vec<GradeMention> = Vec::new();
    let mut index: HashMap<(String, String, u32), usize> = HashMap::new();

    for mention in mentions {
        let key = (
            mention.designation.clone(),
            mention.doc.clone(),
            mention.line,
        );
        match index.get(&key) {
            Some(&i) => {
                if mention.confidence > kept[i].confidence {
                    kept[i] = mention;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(mention);
            }
        }
    }

    kept
}

/// Collapse repeated volume mentions keyed by (grade, element, volume
/// rounded to 2 decimals, document). Same keep-the-best rule as grades.
pub fn dedup_volumes(mentions: Vec<VolumeMention>) -> Vec<VolumeMention> {
    let mut kept: Vec<VolumeMention> = Vec::new();
    let mut index: HashMap<(String, String, Option<i64>, String), usize> = HashMap::new();

    for mention in mentions {
        let key = (
            mention.grade.clone().unwrap_or_default(),
            mention.element.clone(),
            mention.volume_m3.map(|v| (v * 100.0).round() as i64),
            mention.doc.clone(),
        );
        match index.get(&key) {
            Some(&i) => {
                if mention.confidence > kept[i].confidence {
                    kept[i] = mention;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(mention);
            }
        }
    }

    kept
}

// ── Tests ──
