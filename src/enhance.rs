use tracing::warn;

use crate::error::EnhanceError;
use crate::extract::DocumentFacts;

/// Optional post-processing hook (an LLM refinement service, typically).
/// Purely best-effort: the deterministic pattern-based result stands on its
/// own and must never be degraded by a failing enhancer.
pub trait Enhance: Send + Sync {
    fn enhance(&self, facts: DocumentFacts) -> Result<DocumentFacts, EnhanceError>;
}

/// Default enhancer: passes facts through untouched.
pub struct NoEnhancer;

impl Enhance for NoEnhancer {
    fn enhance(&self, facts: DocumentFacts) -> Result<DocumentFacts, EnhanceError> {
        Ok(facts)
    }
}

/// Apply an enhancer, keeping the original facts on any failure.
pub fn apply(enhancer: &dyn Enhance, facts: DocumentFacts) -> DocumentFacts {
    let fallback = facts.clone();
    match enhancer.enhance(facts) {
        Ok(enhanced) => enhanced,
        Err(e) => {
            warn!("{}: {}, keeping deterministic result", fallback.doc, e);
            fallback
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingEnhancer;

    impl Enhance for FailingEnhancer {
        fn enhance(&self, _facts: DocumentFacts) -> Result<DocumentFacts, EnhanceError> {
            Err(EnhanceError("service unreachable".to_string()))
        }
    }

    struct DroppingEnhancer;

    impl Enhance for DroppingEnhancer {
        fn enhance(&self, mut facts: DocumentFacts) -> Result<DocumentFacts, EnhanceError> {
            facts.entries.clear();
            Ok(facts)
        }
    }

    fn facts() -> DocumentFacts {
        use crate::catalog::Catalog;
        use crate::input::Document;
        crate::extract::process_document(
            &Document::from_text("d", "beton C25/30, objem 10 m3"),
            &Catalog::builtin(),
        )
    }

    #[test]
    fn noop_passes_through() {
        let before = facts();
        let after = apply(&NoEnhancer, before.clone());
        assert_eq!(after.entries.len(), before.entries.len());
    }

    #[test]
    fn failure_keeps_original() {
        let before = facts();
        let after = apply(&FailingEnhancer, before.clone());
        assert_eq!(after.entries.len(), before.entries.len());
        assert_eq!(after.grades.len(), before.grades.len());
    }

    #[test]
    fn successful_enhancer_result_is_used() {
        let after = apply(&DroppingEnhancer, facts());
        assert!(after.entries.is_empty());
    }
}
