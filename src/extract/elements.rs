use crate::catalog::Catalog;

pub const UNKNOWN_ELEMENT: &str = "unknown";

/// Tag a context window with a construction element. Taxonomy lookup first,
/// then a handful of generic stem checks, finally the explicit unknown tag.
/// Never fails.
pub fn classify(context: &str, catalog: &Catalog) -> String {
    if let Some(name) = catalog.classify_element(context) {
        return name.to_string();
    }

    let lower = context.to_lowercase();
    for (stems, tag) in GENERIC_FALLBACKS {
        if stems.iter().any(|s| lower.contains(s)) {
            return (*tag).to_string();
        }
    }

    UNKNOWN_ELEMENT.to_string()
}

// Stem fragments catch inflected forms the taxonomy keywords miss
// ("základů", "stěnové", "stropů").
const GENERIC_FALLBACKS: &[(&[&str], &str)] = &[
    (&["základ", "zaklad", "foundation"], "foundation"),
    (&["stěn", "sten", "zdi", "wall"], "wall"),
    (&["desk", "strop", "slab"], "slab"),
];

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_match_wins() {
        let catalog = Catalog::builtin();
        assert_eq!(classify("betonáž sloupu S1", &catalog), "column");
    }

    #[test]
    fn generic_stem_fallback() {
        let catalog = Catalog::builtin();
        // "stěnové" is an inflected form no taxonomy keyword covers.
        assert_eq!(classify("stěnové panely, monolit", &catalog), "wall");
    }

    #[test]
    fn unknown_when_nothing_matches() {
        let catalog = Catalog::builtin();
        assert_eq!(classify("dodávka oken", &catalog), UNKNOWN_ELEMENT);
        assert_eq!(classify("", &catalog), UNKNOWN_ELEMENT);
    }
}
