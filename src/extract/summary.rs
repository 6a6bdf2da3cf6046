use std::collections::BTreeMap;

use crate::model::{GroupTotal, KeyTotal, LinkedEntry, Summary};

/// Fold linked entries into grouped totals. Pure function of its input;
/// calling it twice on the same set yields the same summary. Entries the
/// linker left without a grade are excluded from the grade groupings but
/// still counted in the element view and the grand totals.
pub fn aggregate(entries: &[LinkedEntry]) -> Summary {
    let mut by_pair: BTreeMap<(String, String), (f64, f64, usize)> = BTreeMap::new();
    let mut by_grade: BTreeMap<String, (f64, f64, usize)> = BTreeMap::new();
    let mut by_element: BTreeMap<String, (f64, f64, usize)> = BTreeMap::new();
    let mut total_volume = 0.0;
    let mut total_cost = 0.0;

    for entry in entries {
        let volume = entry.volume_m3.unwrap_or(0.0);
        let cost = entry.total_cost.unwrap_or(0.0);
        total_volume += volume;
        total_cost += cost;

        if !entry.grade.is_empty() {
            let pair = by_pair
                .entry((entry.grade.clone(), entry.element.clone()))
                .or_insert((0.0, 0.0, 0));
            pair.0 += volume;
            pair.1 += cost;
            pair.2 += 1;

            let g = by_grade.entry(entry.grade.clone()).or_insert((0.0, 0.0, 0));
            g.0 += volume;
            g.1 += cost;
            g.2 += 1;
        }

        let e = by_element
            .entry(entry.element.clone())
            .or_insert((0.0, 0.0, 0));
        e.0 += volume;
        e.1 += cost;
        e.2 += 1;
    }

    Summary {
        by_grade_element: by_pair
            .into_iter()
            .map(|((grade, element), (volume_m3, total_cost, entries))| GroupTotal {
                grade,
                element,
                volume_m3,
                total_cost,
                entries,
            })
            .collect(),
        by_grade: key_totals(by_grade),
        by_element: key_totals(by_element),
        total_volume_m3: total_volume,
        total_cost,
        entry_count: entries.len(),
    }
}

fn key_totals(map: BTreeMap<String, (f64, f64, usize)>) -> Vec<KeyTotal> {
    map.into_iter()
        .map(|(key, (volume_m3, total_cost, entries))| KeyTotal {
            key,
            volume_m3,
            total_cost,
            entries,
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Unit;
    use std::collections::BTreeSet;

    fn entry(grade: &str, element: &str, volume: Option<f64>, cost: Option<f64>) -> LinkedEntry {
        LinkedEntry {
            grade: grade.to_string(),
            exposure_classes: BTreeSet::new(),
            element: element.to_string(),
            volume_m3: volume,
            area_m2: None,
            thickness_mm: None,
            unit_price: None,
            total_cost: cost,
            unit: Unit::M3,
            doc: "d".to_string(),
            line: 1,
            confidence: 0.9,
            context: String::new(),
        }
    }

    #[test]
    fn groups_by_grade_and_element() {
        let entries = vec![
            entry("C25/30", "slab", Some(10.0), Some(28500.0)),
            entry("C25/30", "slab", Some(5.0), None),
            entry("C25/30", "wall", Some(2.0), None),
            entry("C30/37", "column", Some(1.5), Some(6000.0)),
        ];
        let summary = aggregate(&entries);

        assert_eq!(summary.by_grade_element.len(), 3);
        let slab = summary
            .by_grade_element
            .iter()
            .find(|g| g.grade == "C25/30" && g.element == "slab")
            .unwrap();
        assert!((slab.volume_m3 - 15.0).abs() < 1e-9);
        assert_eq!(slab.entries, 2);

        assert_eq!(summary.by_grade.len(), 2);
        let c25 = summary.by_grade.iter().find(|g| g.key == "C25/30").unwrap();
        assert!((c25.volume_m3 - 17.0).abs() < 1e-9);

        assert!((summary.total_volume_m3 - 18.5).abs() < 1e-9);
        assert!((summary.total_cost - 34500.0).abs() < 1e-9);
        assert_eq!(summary.entry_count, 4);
    }

    #[test]
    fn unlinked_entries_stay_out_of_grade_groups() {
        let entries = vec![
            entry("", "unknown", Some(3.0), None),
            entry("C25/30", "slab", Some(10.0), None),
        ];
        let summary = aggregate(&entries);
        assert_eq!(summary.by_grade.len(), 1);
        assert_eq!(summary.by_element.len(), 2);
        assert!((summary.total_volume_m3 - 13.0).abs() < 1e-9);
    }

    #[test]
    fn repeat_safe() {
        let entries = vec![entry("C25/30", "slab", Some(10.0), None)];
        let a = aggregate(&entries);
        let b = aggregate(&entries);
        assert_eq!(a.by_grade.len(), b.by_grade.len());
        assert_eq!(a.total_volume_m3, b.total_volume_m3);
        assert_eq!(a.entry_count, b.entry_count);
    }

    #[test]
    fn empty_input() {
        let summary = aggregate(&[]);
        assert_eq!(summary.entry_count, 0);
        assert_eq!(summary.total_volume_m3, 0.0);
        assert!(summary.by_grade.is_empty());
    }
}
