//! Ingestion pipeline: transcript chunk files to a corpus snapshot.
//!
//! Reads one JSON file per source video, embeds each file's chunks in a
//! single batch, and commits them with globally contiguous chunk IDs.

use crate::corpus::{Corpus, PendingChunk};
use crate::embedding::Embedder;
use crate::error::{LectioError, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One per-video transcript file, as produced by the transcription step.
#[derive(Debug, Deserialize)]
pub struct TranscriptFile {
    /// Source media filename.
    pub file: Option<String>,
    /// Ordered transcript segments.
    pub chunks: Vec<TranscriptChunk>,
}

/// One transcript segment record.
#[derive(Debug, Deserialize)]
pub struct TranscriptChunk {
    /// 1-based position within the video.
    pub number: u32,
    /// Video title, derived from the source filename.
    pub title: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Transcript text.
    pub text: String,
}

impl From<TranscriptChunk> for PendingChunk {
    fn from(chunk: TranscriptChunk) -> Self {
        Self {
            video_title: chunk.title,
            sequence_number: chunk.number,
            start_seconds: chunk.start,
            end_seconds: chunk.end,
            text: chunk.text,
        }
    }
}

/// Ingestion pipeline.
pub struct IngestPipeline {
    embedder: Arc<dyn Embedder>,
}

/// Summary of one ingestion run.
#[derive(Debug)]
pub struct IngestReport {
    /// Number of chunks committed.
    pub chunks_indexed: usize,
    /// Number of transcript files processed.
    pub files_processed: usize,
    /// Number of files skipped as malformed or empty.
    pub files_skipped: usize,
    /// Number of individual chunks skipped as invalid.
    pub chunks_skipped: usize,
}

impl IngestPipeline {
    /// Create a pipeline using the given embedder.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Ingest every transcript file in `source_dir` and return the built
    /// corpus.
    ///
    /// Malformed files and invalid chunks are skipped with a warning.
    /// Embedding exhaustion aborts the whole run, and a run yielding zero
    /// chunks is an error.
    #[instrument(skip(self), fields(dir = %source_dir.display()))]
    pub async fn ingest(&self, source_dir: &Path) -> Result<(Corpus, IngestReport)> {
        let mut paths: Vec<_> = std::fs::read_dir(source_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(LectioError::EmptyCorpus(format!(
                "no transcript files found in {}",
                source_dir.display()
            )));
        }
        info!("Found {} transcript files", paths.len());

        let mut corpus = Corpus::new(
            self.embedder.dimensions(),
            self.embedder.model_id(),
        );
        let mut report = IngestReport {
            chunks_indexed: 0,
            files_processed: 0,
            files_skipped: 0,
            chunks_skipped: 0,
        };

        for path in &paths {
            let transcript = match self.parse_file(path) {
                Ok(t) => t,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.files_skipped += 1;
                    continue;
                }
            };

            // Drop invalid records before spending embedding calls on them.
            let mut records: Vec<PendingChunk> = Vec::with_capacity(transcript.chunks.len());
            for chunk in transcript.chunks {
                let record = PendingChunk::from(chunk);
                match record.validate() {
                    Ok(()) => records.push(record),
                    Err(e) => {
                        warn!("Skipping chunk in {}: {}", path.display(), e);
                        report.chunks_skipped += 1;
                    }
                }
            }

            if records.is_empty() {
                warn!("Skipping {}: no valid chunks", path.display());
                report.files_skipped += 1;
                continue;
            }

            info!("Embedding {} chunks from {}", records.len(), path.display());
            let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
            // EmbeddingUnavailable propagates and aborts the run.
            let embeddings = self.embedder.embed_batch(&texts).await?;

            report.chunks_indexed += corpus.push_batch(records, embeddings)?;
            report.files_processed += 1;
        }

        if corpus.is_empty() {
            return Err(LectioError::EmptyCorpus(format!(
                "no valid chunks in {}",
                source_dir.display()
            )));
        }

        info!(
            "Ingested {} chunks from {} files ({} files skipped, {} chunks skipped)",
            report.chunks_indexed, report.files_processed, report.files_skipped,
            report.chunks_skipped
        );
        Ok((corpus, report))
    }

    fn parse_file(&self, path: &Path) -> Result<TranscriptFile> {
        let content = std::fs::read_to_string(path)?;
        let transcript: TranscriptFile = serde_json::from_str(&content)?;
        Ok(transcript)
    }
}
