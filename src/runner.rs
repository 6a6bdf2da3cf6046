use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::enhance::{self, Enhance};
use crate::error::BatchError;
use crate::extract::{self, DocumentFacts};
use crate::input::{self, Document};

const CONCURRENCY: usize = 8;
const EXTRACT_CHUNK: usize = 500;

/// A document the loader could not read. Kept next to the successes so one
/// bad file never cancels its siblings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FailedDocument {
    pub id: String,
    pub reason: String,
}

/// Per-document load result streamed out of phase 1.
enum LoadOutcome {
    Loaded(Document),
    Failed(FailedDocument),
}

#[derive(Debug)]
pub struct BatchStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Phase 1: read documents concurrently, streaming outcomes as they arrive.
/// Returns documents in a stable order (sorted by id) so downstream output
/// is deterministic regardless of task completion order.
pub async fn load_documents(
    paths: Vec<PathBuf>,
) -> Result<(Vec<Document>, Vec<FailedDocument>, BatchStats)> {
    if paths.is_empty() {
        return Err(BatchError::EmptyBatch.into());
    }

    let semaphore = Arc::new(Semaphore::new(CONCURRENCY));
    let total = paths.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let (tx, mut rx) = tokio::sync::mpsc::channel::<LoadOutcome>(CONCURRENCY * 2);

    for path in paths {
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore never closed");
            let outcome = match input::load_document(&path) {
                Ok(doc) => LoadOutcome::Loaded(doc),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    LoadOutcome::Failed(FailedDocument {
                        id: path.display().to_string(),
                        reason: e.to_string(),
                    })
                }
            };
            let _ = tx.send(outcome).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish.
    drop(tx);

    let mut documents = Vec::new();
    let mut failed = Vec::new();
    while let Some(outcome) = rx.recv().await {
        match outcome {
            LoadOutcome::Loaded(doc) => documents.push(doc),
            LoadOutcome::Failed(f) => failed.push(f),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    documents.sort_by(|a, b| a.id.cmp(&b.id));
    failed.sort_by(|a, b| a.id.cmp(&b.id));

    let stats = BatchStats {
        total,
        ok: documents.len(),
        errors: failed.len(),
    };
    info!(
        "Loaded {} documents ({} ok, {} errors)",
        stats.total, stats.ok, stats.errors
    );

    Ok((documents, failed, stats))
}

/// Phase 2: run the extraction pipeline over loaded documents in parallel
/// chunks. Extraction is pure CPU; the catalogue is shared read-only.
pub fn extract_documents(
    documents: &[Document],
    catalog: &Catalog,
    enhancer: &dyn Enhance,
) -> Vec<DocumentFacts> {
    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut all = Vec::with_capacity(documents.len());
    for chunk in documents.chunks(EXTRACT_CHUNK) {
        let results: Vec<DocumentFacts> = chunk
            .par_iter()
            .map(|doc| enhance::apply(enhancer, extract::process_document(doc, catalog)))
            .collect();
        pb.inc(chunk.len() as u64);
        all.extend(results);
    }

    pb.finish_and_clear();
    all
}

// ── Tests ──
