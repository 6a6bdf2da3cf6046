use crate::model::Origin;

/// Mentions parsed from an estimate row carry fixed confidences; a tabular
/// quantity column is far less ambiguous than prose.
pub const STRUCTURED_GRADE_CONFIDENCE: f64 = 0.90;
pub const STRUCTURED_VOLUME_CONFIDENCE: f64 = 0.85;

const BASE: f64 = 0.5;

/// Additive score for a grade candidate: catalogue membership carries the
/// most weight, context signals the rest.
pub fn grade_confidence(
    origin: Origin,
    exact_member: bool,
    keyword_hit: bool,
    has_exposure: bool,
) -> f64 {
    if origin == Origin::StructuredRow {
        return STRUCTURED_GRADE_CONFIDENCE;
    }
    let mut score = BASE;
    if exact_member {
        score += 0.3;
    }
    if keyword_hit {
        score += 0.1;
    }
    if has_exposure {
        score += 0.1;
    }
    clamp(score)
}

/// Additive score for a volume candidate; membership is replaced by
/// explicit-value and unit-price signals.
pub fn volume_confidence(
    origin: Origin,
    has_value: bool,
    has_unit_price: bool,
    keyword_hit: bool,
    has_exposure: bool,
) -> f64 {
    if origin == Origin::StructuredRow {
        return STRUCTURED_VOLUME_CONFIDENCE;
    }
    let mut score = BASE;
    if has_value {
        score += 0.2;
    }
    if has_unit_price {
        score += 0.1;
    }
    if keyword_hit {
        score += 0.1;
    }
    if has_exposure {
        score += 0.1;
    }
    clamp(score)
}

fn clamp(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_score_in_bounds_for_all_flag_combinations() {
        for exact in [false, true] {
            for keyword in [false, true] {
                for exposure in [false, true] {
                    let s = grade_confidence(Origin::Pattern, exact, keyword, exposure);
                    assert!((0.0..=1.0).contains(&s), "score {} out of bounds", s);
                }
            }
        }
    }

    #[test]
    fn volume_score_in_bounds_for_all_flag_combinations() {
        for value in [false, true] {
            for price in [false, true] {
                for keyword in [false, true] {
                    for exposure in [false, true] {
                        let s = volume_confidence(Origin::Pattern, value, price, keyword, exposure);
                        assert!((0.0..=1.0).contains(&s), "score {} out of bounds", s);
                    }
                }
            }
        }
    }

    #[test]
    fn full_grade_signal_caps_at_one() {
        assert_eq!(grade_confidence(Origin::Pattern, true, true, true), 1.0);
    }

    #[test]
    fn bare_candidate_keeps_base() {
        assert_eq!(grade_confidence(Origin::Pattern, false, false, false), 0.5);
        assert_eq!(
            volume_confidence(Origin::Pattern, false, false, false, false),
            0.5
        );
    }

    #[test]
    fn structured_rows_bypass_the_formula() {
        assert_eq!(
            grade_confidence(Origin::StructuredRow, false, false, false),
            STRUCTURED_GRADE_CONFIDENCE
        );
        assert_eq!(
            volume_confidence(Origin::StructuredRow, false, false, false, false),
            STRUCTURED_VOLUME_CONFIDENCE
        );
    }
}
