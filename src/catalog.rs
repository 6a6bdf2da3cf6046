use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";

/// Designation grammar: modern (optionally lightweight) classes and legacy
/// cube-strength classes. Matched against the full designation.
static GRADE_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:LC(\d{1,3})/(\d{1,3})|C(\d{1,3})/(\d{1,3})|B(\d{1,2}))$").unwrap());

/// One concrete strength class and its validation metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ConcreteGradeSpec {
    #[serde(default)]
    pub exposure_classes: Vec<String>,
    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub max_water_cement_ratio: Option<f64>,
}

/// A structural element family with its language-variant keyword lists.
#[derive(Debug, Clone)]
pub struct ConstructionElementSpec {
    pub name: String,
    /// Lowercased, declaration order preserved across languages.
    pub keywords: Vec<String>,
    pub typical_grades: Vec<String>,
    pub typical_exposure: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExposureClassSpec {
    pub description: String,
    #[serde(default)]
    pub typical_conditions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ElementFileSpec {
    #[serde(default)]
    keywords: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    typical_grades: Vec<String>,
    #[serde(default)]
    typical_exposure: Vec<String>,
}

// serde_json's preserve_order keeps element declaration order, which decides
// classification ties (multi-word element names are declared before the
// generic single-word ones they contain).
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    concrete_grades: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    construction_elements: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    exposure_classes: serde_json::Map<String, serde_json::Value>,
}

/// Read-only domain reference data: valid grades, element taxonomy and
/// exposure classes. Loaded once at startup and shared behind an Arc.
#[derive(Debug, Clone)]
pub struct Catalog {
    grades: HashMap<String, ConcreteGradeSpec>,
    elements: Vec<ConstructionElementSpec>,
    exposure: HashMap<String, ExposureClassSpec>,
    /// Union of all element keywords, used for context-keyword scoring.
    keywords: Vec<String>,
    pub degraded: bool,
}

impl Catalog {
    /// Load from a JSON file; on a missing or malformed source fall back to
    /// the built-in default set rather than failing startup.
    pub fn load(path: &Path) -> Catalog {
        match std::fs::read_to_string(path) {
            Ok(raw) => match Self::from_json(&raw) {
                Ok(catalog) => {
                    info!(
                        "Catalog loaded: {} grades, {} elements, {} exposure classes",
                        catalog.grades.len(),
                        catalog.elements.len(),
                        catalog.exposure.len()
                    );
                    catalog
                }
                Err(e) => {
                    warn!("Catalog {} is malformed ({}), using built-in defaults", path.display(), e);
                    Self::builtin()
                }
            },
            Err(e) => {
                warn!("Catalog {} unavailable ({}), using built-in defaults", path.display(), e);
                Self::builtin()
            }
        }
    }

    pub fn from_json(raw: &str) -> Result<Catalog, serde_json::Error> {
        let file: CatalogFile = serde_json::from_str(raw)?;

        let mut grades = HashMap::new();
        for (designation, value) in file.concrete_grades {
            let spec: ConcreteGradeSpec = serde_json::from_value(value)?;
            grades.insert(designation, spec);
        }

        let mut elements = Vec::new();
        for (name, value) in file.construction_elements {
            let spec: ElementFileSpec = serde_json::from_value(value)?;
            let keywords: Vec<String> = spec
                .keywords
                .values()
                .flatten()
                .map(|k| k.to_lowercase())
                .collect();
            elements.push(ConstructionElementSpec {
                name,
                keywords,
                typical_grades: spec.typical_grades,
                typical_exposure: spec.typical_exposure,
            });
        }

        let mut exposure = HashMap::new();
        for (code, value) in file.exposure_classes {
            let spec: ExposureClassSpec = serde_json::from_value(value)?;
            exposure.insert(code, spec);
        }

        let mut keywords: Vec<String> = Vec::new();
        for element in &elements {
            for k in &element.keywords {
                if !keywords.contains(k) {
                    keywords.push(k.clone());
                }
            }
        }

        Ok(Catalog {
            grades,
            elements,
            exposure,
            keywords,
            degraded: false,
        })
    }

    /// Minimal default set used when the catalogue file cannot be read.
    pub fn builtin() -> Catalog {
        let mut catalog = Self::from_json(BUILTIN_CATALOG)
            .expect("embedded default catalogue parses");
        catalog.degraded = true;
        catalog
    }

    /// Exact catalogue membership OR grammar fallback, so sane classes that
    /// are merely absent from the loaded file still validate.
    pub fn is_valid_grade(&self, designation: &str) -> bool {
        self.grades.contains_key(designation) || matches_grammar(designation)
    }

    pub fn is_member(&self, designation: &str) -> bool {
        self.grades.contains_key(designation)
    }

    pub fn grade_spec(&self, designation: &str) -> Option<&ConcreteGradeSpec> {
        self.grades.get(designation)
    }

    pub fn all_grades(&self) -> BTreeSet<String> {
        self.grades.keys().cloned().collect()
    }

    /// First taxonomy entry (declaration order) whose keyword list
    /// intersects the lowercased context.
    pub fn classify_element(&self, context: &str) -> Option<&str> {
        let lower = context.to_lowercase();
        self.elements
            .iter()
            .find(|e| e.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|e| e.name.as_str())
    }

    pub fn element_spec(&self, name: &str) -> Option<&ConstructionElementSpec> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Grades typically used for an element. Advisory only; never a gate.
    pub fn grades_for_element(&self, element: &str) -> &[String] {
        self.element_spec(element)
            .map(|e| e.typical_grades.as_slice())
            .unwrap_or(&[])
    }

    /// Grades whose spec allows the given exposure class. Advisory only.
    pub fn grades_for_exposure(&self, code: &str) -> BTreeSet<String> {
        self.grades
            .iter()
            .filter(|(_, spec)| spec.exposure_classes.iter().any(|c| c == code))
            .map(|(designation, _)| designation.clone())
            .collect()
    }

    pub fn exposure_spec(&self, code: &str) -> Option<&ExposureClassSpec> {
        self.exposure.get(code)
    }

    /// Does the lowercased context contain any taxonomy keyword?
    pub fn has_context_keyword(&self, context: &str) -> bool {
        let lower = context.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        (self.grades.len(), self.elements.len(), self.exposure.len())
    }
}

/// Grammar check with plausibility bounds on the fallback: cylinder strength
/// 8–120 MPa and a cube value no lower than the cylinder one, so a stray
/// "C999/999" never validates while an unlisted "C55/67" does.
pub fn matches_grammar(designation: &str) -> bool {
    let Some(caps) = GRADE_GRAMMAR.captures(designation) else {
        return false;
    };
    // Legacy B classes are bounded by their 1-2 digit grammar already.
    if caps.get(5).is_some() {
        return true;
    }
    let cyl = caps
        .get(1)
        .or_else(|| caps.get(3))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0);
    let cube = caps
        .get(2)
        .or_else(|| caps.get(4))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0);
    (8..=120).contains(&cyl) && cube >= cyl && cube <= 150
}

// Fallback reference data for degraded mode: the common strength classes,
// the core element families and the usual exposure classes.
const BUILTIN_CATALOG: &str = r#"{
  "concrete_grades": {
    "C12/15": {"exposure_classes": ["XO"], "applications": ["podkladní beton"]},
    "C16/20": {"exposure_classes": ["XO", "XC1"], "applications": ["podkladní beton", "výplňový beton"]},
    "C20/25": {"exposure_classes": ["XC1", "XC2"], "applications": ["základy"]},
    "C25/30": {"exposure_classes": ["XC1", "XC2", "XC3", "XC4", "XF1"], "applications": ["základové desky", "stěny", "stropy"]},
    "C30/37": {"exposure_classes": ["XC4", "XD1", "XF1", "XF2", "XA1"], "applications": ["sloupy", "mostní konstrukce"]},
    "C35/45": {"exposure_classes": ["XD2", "XD3", "XF3", "XF4", "XA2"], "applications": ["mostovky", "opěry"]},
    "C40/50": {"exposure_classes": ["XD3", "XF4", "XA3"], "applications": ["předpjaté konstrukce"]},
    "C45/55": {"exposure_classes": ["XD3", "XF4", "XA3"], "applications": ["předpjaté konstrukce"]},
    "C50/60": {"exposure_classes": ["XD3", "XF4", "XA3"], "applications": ["speciální konstrukce"]},
    "LC25/28": {"exposure_classes": ["XC1", "XC2"], "applications": ["lehké stropní konstrukce"], "density": 1800},
    "B15": {"applications": ["starší konstrukce"]},
    "B20": {"applications": ["starší konstrukce"]},
    "B25": {"applications": ["starší konstrukce"]}
  },
  "construction_elements": {
    "foundation_slab": {
      "keywords": {"cs": ["základová deska", "zakladova deska", "základové desky"], "en": ["foundation slab", "base slab"]},
      "typical_grades": ["C20/25", "C25/30"],
      "typical_exposure": ["XC2"]
    },
    "foundation": {
      "keywords": {"cs": ["základ", "zaklad", "patka", "pas"], "en": ["foundation", "footing"]},
      "typical_grades": ["C16/20", "C20/25", "C25/30"],
      "typical_exposure": ["XC2"]
    },
    "wall": {
      "keywords": {"cs": ["stěna", "stena", "zeď", "zed", "opěrná stěna"], "en": ["wall", "retaining wall"]},
      "typical_grades": ["C25/30", "C30/37"],
      "typical_exposure": ["XC3", "XC4"]
    },
    "column": {
      "keywords": {"cs": ["sloup", "pilíř", "pilir"], "en": ["column", "pillar"]},
      "typical_grades": ["C30/37", "C35/45"],
      "typical_exposure": ["XC3"]
    },
    "slab": {
      "keywords": {"cs": ["deska", "strop", "stropní"], "en": ["slab", "ceiling"]},
      "typical_grades": ["C25/30", "C30/37"],
      "typical_exposure": ["XC1"]
    },
    "beam": {
      "keywords": {"cs": ["průvlak", "trám", "nosník"], "en": ["beam", "girder"]},
      "typical_grades": ["C30/37"],
      "typical_exposure": ["XC1"]
    },
    "abutment": {
      "keywords": {"cs": ["opěra", "opera mostu", "křídlo"], "en": ["abutment"]},
      "typical_grades": ["C30/37", "C35/45"],
      "typical_exposure": ["XF2", "XD1"]
    }
  },
  "exposure_classes": {
    "XO": {"description": "bez nebezpečí koroze", "typical_conditions": ["vnitřní suché prostředí"]},
    "XC1": {"description": "karbonatace, suché/stále mokré", "typical_conditions": ["interiéry"]},
    "XC2": {"description": "karbonatace, mokré, občas suché", "typical_conditions": ["základy"]},
    "XC3": {"description": "karbonatace, středně mokré", "typical_conditions": ["venkovní chráněné"]},
    "XC4": {"description": "karbonatace, střídavě mokré a suché", "typical_conditions": ["fasády", "venkovní povrchy"]},
    "XD1": {"description": "chloridy mimo mořskou vodu, středně mokré", "typical_conditions": ["povrchy u vozovek"]},
    "XD2": {"description": "chloridy, mokré, občas suché", "typical_conditions": ["bazény"]},
    "XD3": {"description": "chloridy, střídavě mokré a suché", "typical_conditions": ["mosty", "vozovky"]},
    "XF1": {"description": "mráz bez rozmrazovacích látek, mírně nasycené", "typical_conditions": ["svislé venkovní povrchy"]},
    "XF2": {"description": "mráz s rozmrazovacími látkami, mírně nasycené", "typical_conditions": ["mostní konstrukce"]},
    "XF3": {"description": "mráz bez rozmrazovacích látek, silně nasycené", "typical_conditions": ["vodorovné povrchy"]},
    "XF4": {"description": "mráz s rozmrazovacími látkami, silně nasycené", "typical_conditions": ["mostovky", "vozovky"]},
    "XA1": {"description": "slabě agresivní chemické prostředí", "typical_conditions": ["přírodní zeminy"]},
    "XA2": {"description": "středně agresivní chemické prostředí", "typical_conditions": ["mořské konstrukce"]},
    "XA3": {"description": "silně agresivní chemické prostředí", "typical_conditions": ["průmyslové ČOV"]}
  }
}"#;

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_accepts_modern_classes() {
        assert!(matches_grammar("C25/30"));
        assert!(matches_grammar("C8/10"));
        assert!(matches_grammar("C100/115"));
        assert!(matches_grammar("LC25/28"));
    }

    #[test]
    fn grammar_accepts_legacy_classes() {
        assert!(matches_grammar("B20"));
        assert!(matches_grammar("B5"));
    }

    #[test]
    fn grammar_rejects_out_of_bounds() {
        assert!(!matches_grammar("C999/999"));
        assert!(!matches_grammar("C7/10"));
        assert!(!matches_grammar("C30/25")); // cube below cylinder
        assert!(!matches_grammar("C25"));
        assert!(!matches_grammar("B123"));
        assert!(!matches_grammar("XC2"));
        assert!(!matches_grammar(""));
    }

    #[test]
    fn unlisted_but_sane_grade_validates() {
        let catalog = Catalog::builtin();
        assert!(!catalog.is_member("C55/67"));
        assert!(catalog.is_valid_grade("C55/67"));
    }

    #[test]
    fn member_grade_validates() {
        let catalog = Catalog::builtin();
        assert!(catalog.is_member("C25/30"));
        assert!(catalog.is_valid_grade("C25/30"));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let catalog = Catalog::load(Path::new("does/not/exist.json"));
        assert!(catalog.degraded);
        assert!(catalog.is_valid_grade("C25/30"));
    }

    #[test]
    fn malformed_file_falls_back_to_builtin() {
        let dir = std::env::temp_dir().join("betoscan-catalog-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let catalog = Catalog::load(&path);
        assert!(catalog.degraded);
    }

    #[test]
    fn classify_prefers_specific_elements() {
        let catalog = Catalog::builtin();
        // "základová deska" contains both the foundation_slab and the slab
        // keywords; declaration order must pick the specific one.
        assert_eq!(catalog.classify_element("Základová deska tl. 200 mm"), Some("foundation_slab"));
        assert_eq!(catalog.classify_element("stropní deska"), Some("slab"));
        assert_eq!(catalog.classify_element("opěrná stěna"), Some("wall"));
        assert_eq!(catalog.classify_element("ocelový rošt"), None);
    }

    #[test]
    fn shipped_catalog_parses() {
        let raw = std::fs::read_to_string(DEFAULT_CATALOG_PATH).unwrap();
        let catalog = Catalog::from_json(&raw).unwrap();
        let (grades, elements, exposure) = catalog.counts();
        assert!(grades >= 10);
        assert!(elements >= 5);
        assert!(exposure >= 10);
        assert!(!catalog.degraded);
    }

    #[test]
    fn exposure_compatibility_is_advisory() {
        let catalog = Catalog::builtin();
        let grades = catalog.grades_for_exposure("XF4");
        assert!(grades.contains("C35/45"));
        assert!(!grades.contains("C16/20"));
        // Unknown exposure yields an empty set, not an error.
        assert!(catalog.grades_for_exposure("XZ9").is_empty());
    }

    #[test]
    fn element_grade_compatibility() {
        let catalog = Catalog::builtin();
        assert!(catalog
            .grades_for_element("foundation_slab")
            .contains(&"C25/30".to_string()));
        assert!(catalog.grades_for_element("chimney").is_empty());
    }

    #[test]
    fn keyword_lookup() {
        let catalog = Catalog::builtin();
        assert!(catalog.has_context_keyword("betonáž základové desky"));
        assert!(!catalog.has_context_keyword("dodávka oken a dveří"));
    }
}
