mod catalog;
mod enhance;
mod error;
mod extract;
mod input;
mod model;
mod normalize;
mod report;
mod runner;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use catalog::Catalog;

#[derive(Parser)]
#[command(name = "betoscan", about = "Concrete-fact extraction from construction project text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan documents and export linked concrete facts
    Extract {
        /// Text or estimate CSV files (directories are expanded)
        paths: Vec<PathBuf>,
        /// Reference catalogue file
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output JSON path
        #[arg(short = 'o', long, default_value = "facts.json")]
        out: PathBuf,
        /// Max documents to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Entry listing + grouped totals from an exported fact set
    Summary {
        /// Exported facts JSON
        #[arg(default_value = "facts.json")]
        facts: PathBuf,
        /// Max entries to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show reference catalogue statistics
    Catalog {
        /// Reference catalogue file
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// List every grade designation
        #[arg(short, long)]
        grades: bool,
    },
    /// Look up a grade designation, exposure class or element name
    Check {
        /// e.g. "C25/30", "XF4" or "wall"
        term: String,
        /// Reference catalogue file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            paths,
            catalog,
            out,
            limit,
        } => {
            let catalog = load_catalog(catalog);
            let mut files = expand_paths(&paths)?;
            if let Some(n) = limit {
                files.truncate(n);
            }

            println!("Extracting from {} documents...", files.len());
            let (documents, failed, stats) = runner::load_documents(files).await?;
            let facts = runner::extract_documents(&documents, &catalog, &enhance::NoEnhancer);

            let export = report::build_export(&facts, failed);
            report::write_json(&out, &export)?;

            let counts = ExtractCounts::of(&export, &stats);
            counts.print();
            report::print_summary(&export.summary);
            println!("\nFacts written to {}", out.display());
            Ok(())
        }
        Commands::Summary { facts, limit } => {
            let export = report::read_json(&facts)?;
            if export.entries.is_empty() {
                println!("No entries in {}. Run 'extract' first.", facts.display());
                return Ok(());
            }
            report::print_entries(&export.entries, limit);
            report::print_summary(&export.summary);
            Ok(())
        }
        Commands::Catalog { catalog, grades } => {
            let catalog = load_catalog(catalog);
            let (grade_count, elements, exposure) = catalog.counts();
            println!("Grades:           {}", grade_count);
            println!("Elements:         {}", elements);
            println!("Exposure classes: {}", exposure);
            if catalog.degraded {
                println!("(built-in defaults; catalogue file was unavailable)");
            }
            if grades {
                println!();
                for designation in catalog.all_grades() {
                    println!("  {}", designation);
                }
            }
            Ok(())
        }
        Commands::Check { term, catalog } => {
            let catalog = load_catalog(catalog);
            let upper = term.trim().to_uppercase();

            if let Some(spec) = catalog.exposure_spec(&upper) {
                println!("{}: {}", upper, spec.description);
                if !spec.typical_conditions.is_empty() {
                    println!("  conditions: {}", spec.typical_conditions.join(", "));
                }
                let compatible = catalog.grades_for_exposure(&upper);
                if !compatible.is_empty() {
                    println!(
                        "  compatible grades: {}",
                        compatible.into_iter().collect::<Vec<_>>().join(", ")
                    );
                }
                return Ok(());
            }

            if let Some(element) = catalog.element_spec(&term.trim().to_lowercase()) {
                println!("{}: construction element", element.name);
                let typical = catalog.grades_for_element(&element.name);
                if !typical.is_empty() {
                    println!("  typical grades: {}", typical.join(", "));
                }
                if !element.typical_exposure.is_empty() {
                    println!("  typical exposure: {}", element.typical_exposure.join(", "));
                }
                return Ok(());
            }

            if !catalog.is_valid_grade(&upper) {
                println!("{}: not a known grade, exposure class or element", upper);
                return Ok(());
            }
            if let Some(spec) = catalog.grade_spec(&upper) {
                println!("{}: catalogue member", upper);
                if !spec.exposure_classes.is_empty() {
                    println!("  exposure: {}", spec.exposure_classes.join(", "));
                }
                if !spec.applications.is_empty() {
                    println!("  applications: {}", spec.applications.join(", "));
                }
                if let Some(d) = spec.density {
                    println!("  density: {} kg/m3", d);
                }
            } else {
                println!("{}: valid by grammar (not listed in the catalogue)", upper);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

struct ExtractCounts {
    documents: usize,
    failed: usize,
    grades: usize,
    entries: usize,
    linked: usize,
    unlinked: usize,
}

impl ExtractCounts {
    fn of(export: &report::FactExport, stats: &runner::BatchStats) -> ExtractCounts {
        let linked = export.entries.iter().filter(|e| !e.grade.is_empty()).count();
        ExtractCounts {
            documents: stats.ok,
            failed: stats.errors,
            grades: export.grades.len(),
            entries: export.entries.len(),
            linked,
            unlinked: export.entries.len() - linked,
        }
    }

    fn print(&self) {
        println!(
            "Processed {} documents ({} failed): {} grade mentions, {} entries ({} linked, {} unlinked).",
            self.documents, self.failed, self.grades, self.entries, self.linked, self.unlinked,
        );
    }
}

fn load_catalog(path: Option<PathBuf>) -> Catalog {
    let path = path.unwrap_or_else(|| PathBuf::from(catalog::DEFAULT_CATALOG_PATH));
    Catalog::load(&path)
}

/// Expand directories into their .txt/.csv files; keep explicit files as-is.
fn expand_paths(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    matches!(
                        p.extension().and_then(|e| e.to_str()),
                        Some("txt") | Some("csv")
                    )
                })
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
