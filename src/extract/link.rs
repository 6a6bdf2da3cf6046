use crate::model::{GradeMention, LinkedEntry, VolumeMention};

/// How far (in lines) the windowed-proximity rule searches for a grade.
const LINK_WINDOW: u32 = 5;

/// Associate each volume mention with the most plausible grade mention of
/// the same document: exact line match first, then the nearest mention
/// within ±5 lines, then the document's first grade mention as a fallback.
/// A document with no grade mentions leaves the entry unlinked.
///
/// This is an accepted approximation of authorship intent, not a guarantee:
/// the fallback in particular can attach a quantity to an unrelated grade
/// when a document mixes many of them.
pub fn link(volumes: Vec<VolumeMention>, grades: &[GradeMention]) -> Vec<LinkedEntry> {
    volumes
        .into_iter()
        .map(|volume| {
            let candidates: Vec<&GradeMention> =
                grades.iter().filter(|g| g.doc == volume.doc).collect();
            let chosen = match &volume.grade {
                Some(g) => candidates
                    .iter()
                    .find(|c| c.designation == *g)
                    .copied(),
                None => choose(&candidates, volume.line),
            };
            entry_from(volume, chosen)
        })
        .collect()
}

fn choose<'a>(candidates: &[&'a GradeMention], line: u32) -> Option<&'a GradeMention> {
    // 1. Same line.
    if let Some(exact) = candidates.iter().find(|c| c.line == line) {
        return Some(*exact);
    }

    // 2. Nearest within the window; first occurrence wins a distance tie.
    let mut best: Option<(&'a GradeMention, u32)> = None;
    for &candidate in candidates {
        let distance = candidate.line.abs_diff(line);
        if distance > LINK_WINDOW {
            continue;
        }
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((candidate, distance)),
        }
    }
    if let Some((candidate, _)) = best {
        return Some(candidate);
    }

    // 3. First grade mention anywhere in the document.
    candidates.first().copied()
}

fn entry_from(volume: VolumeMention, grade: Option<&GradeMention>) -> LinkedEntry {
    let (designation, exposure_classes) = match grade {
        Some(g) => (g.designation.clone(), g.exposure_classes.clone()),
        None => (String::new(), Default::default()),
    };

    LinkedEntry {
        grade: designation,
        exposure_classes,
        element: volume.element,
        volume_m3: volume.volume_m3,
        area_m2: volume.area_m2,
        thickness_mm: volume.thickness_mm,
        unit_price: volume.unit_price,
        total_cost: volume.total_cost,
        unit: volume.unit,
        doc: volume.doc,
        line: volume.line,
        confidence: volume.confidence,
        context: volume.context,
    }
}

// ── Tests ──
