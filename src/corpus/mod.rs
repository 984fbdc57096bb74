//! Corpus of transcript chunks and their embeddings.
//!
//! The corpus is built once by the ingestion pipeline, persisted as a JSON
//! snapshot, and loaded read-only by the query pipeline.

use crate::error::{LectioError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One timestamped transcript segment with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Corpus-wide unique ID, contiguous from 0.
    pub chunk_id: u64,
    /// Title of the source video, derived from its filename.
    pub video_title: String,
    /// 1-based position of this segment within its source video.
    pub sequence_number: u32,
    /// Start time in the video (seconds).
    pub start_seconds: f64,
    /// End time in the video (seconds).
    pub end_seconds: f64,
    /// Transcript text for this segment.
    pub text: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Format the segment's time range as `M:SS - M:SS`.
    pub fn format_time_range(&self) -> String {
        format!(
            "{} - {}",
            format_timestamp(self.start_seconds),
            format_timestamp(self.end_seconds)
        )
    }
}

/// Format seconds as `M:SS` (e.g. `2:05`).
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Corpus-level metadata recorded with the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusMetadata {
    /// Embedding dimensionality shared by every chunk.
    pub dimensions: usize,
    /// Identifier of the embedding model the corpus was built with.
    pub embedding_model: String,
    /// When the snapshot was built.
    pub built_at: DateTime<Utc>,
}

/// An ordered collection of chunks sharing one embedding model and
/// dimensionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    metadata: CorpusMetadata,
    chunks: Vec<Chunk>,
}

/// A validated chunk record waiting for an ID and an embedding.
#[derive(Debug, Clone)]
pub struct PendingChunk {
    pub video_title: String,
    pub sequence_number: u32,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl PendingChunk {
    /// Check the record's structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(LectioError::Validation(format!(
                "chunk {} of '{}' has empty text",
                self.sequence_number, self.video_title
            )));
        }
        if self.end_seconds < self.start_seconds {
            return Err(LectioError::Validation(format!(
                "chunk {} of '{}' ends ({:.1}s) before it starts ({:.1}s)",
                self.sequence_number, self.video_title, self.end_seconds, self.start_seconds
            )));
        }
        if self.start_seconds < 0.0 {
            return Err(LectioError::Validation(format!(
                "chunk {} of '{}' has negative start time",
                self.sequence_number, self.video_title
            )));
        }
        Ok(())
    }
}

impl Corpus {
    /// Create an empty corpus for the given embedding model.
    pub fn new(dimensions: usize, embedding_model: &str) -> Self {
        Self {
            metadata: CorpusMetadata {
                dimensions,
                embedding_model: embedding_model.to_string(),
                built_at: Utc::now(),
            },
            chunks: Vec::new(),
        }
    }

    /// Corpus metadata.
    pub fn metadata(&self) -> &CorpusMetadata {
        &self.metadata
    }

    /// Embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.metadata.dimensions
    }

    /// All chunks in corpus order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the corpus holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Append a batch of records with their embeddings, assigning contiguous
    /// chunk IDs.
    ///
    /// The whole batch is validated before anything is committed, so a failed
    /// call leaves the corpus unchanged. Chunks committed by earlier calls
    /// stay committed.
    pub fn push_batch(
        &mut self,
        records: Vec<PendingChunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize> {
        if records.len() != embeddings.len() {
            return Err(LectioError::Validation(format!(
                "{} chunks but {} embeddings",
                records.len(),
                embeddings.len()
            )));
        }

        for record in &records {
            record.validate()?;
        }
        for embedding in &embeddings {
            if embedding.len() != self.metadata.dimensions {
                return Err(LectioError::DimensionMismatch {
                    expected: self.metadata.dimensions,
                    actual: embedding.len(),
                });
            }
        }

        let count = records.len();
        let mut next_id = self.chunks.len() as u64;
        for (record, embedding) in records.into_iter().zip(embeddings) {
            self.chunks.push(Chunk {
                chunk_id: next_id,
                video_title: record.video_title,
                sequence_number: record.sequence_number,
                start_seconds: record.start_seconds,
                end_seconds: record.end_seconds,
                text: record.text,
                embedding,
            });
            next_id += 1;
        }
        Ok(count)
    }

    /// Titles of the indexed videos with their chunk counts, in first-seen
    /// order.
    pub fn video_summary(&self) -> Vec<(String, usize)> {
        let mut summary: Vec<(String, usize)> = Vec::new();
        for chunk in &self.chunks {
            match summary.iter_mut().find(|(title, _)| *title == chunk.video_title) {
                Some((_, count)) => *count += 1,
                None => summary.push((chunk.video_title.clone(), 1)),
            }
        }
        summary
    }

    /// Persist the corpus as a JSON snapshot.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        std::io::Write::flush(&mut writer)?;
        Ok(())
    }

    /// Load a corpus snapshot from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LectioError::CorpusNotLoaded(format!(
                "snapshot not found at {}. Run 'lectio ingest' first.",
                path.display()
            )));
        }
        let file = std::fs::File::open(path)?;
        let corpus: Corpus = serde_json::from_reader(std::io::BufReader::new(file))?;

        // A corrupted or hand-edited snapshot with a short embedding would
        // misalign the ranker's flat matrix, so fail fast instead.
        for chunk in &corpus.chunks {
            if chunk.embedding.len() != corpus.metadata.dimensions {
                return Err(LectioError::DimensionMismatch {
                    expected: corpus.metadata.dimensions,
                    actual: chunk.embedding.len(),
                });
            }
        }
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, number: u32, start: f64, end: f64, text: &str) -> PendingChunk {
        PendingChunk {
            video_title: title.to_string(),
            sequence_number: number,
            start_seconds: start,
            end_seconds: end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_push_batch_assigns_contiguous_ids() {
        let mut corpus = Corpus::new(3, "test-model");

        corpus
            .push_batch(
                vec![record("v1", 1, 0.0, 10.0, "first"), record("v1", 2, 10.0, 20.0, "second")],
                vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
            )
            .unwrap();
        corpus
            .push_batch(
                vec![record("v2", 1, 0.0, 5.0, "third")],
                vec![vec![0.0, 0.0, 1.0]],
            )
            .unwrap();

        let ids: Vec<u64> = corpus.chunks().iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_push_batch_rejects_invalid_chunk_without_partial_write() {
        let mut corpus = Corpus::new(2, "test-model");

        let result = corpus.push_batch(
            vec![
                record("v1", 1, 0.0, 10.0, "fine"),
                record("v1", 2, 30.0, 20.0, "ends before start"),
            ],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        );

        assert!(matches!(result, Err(LectioError::Validation(_))));
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_push_batch_rejects_empty_text() {
        let mut corpus = Corpus::new(2, "test-model");
        let result = corpus.push_batch(vec![record("v1", 1, 0.0, 1.0, "   ")], vec![vec![0.0, 1.0]]);
        assert!(matches!(result, Err(LectioError::Validation(_))));
    }

    #[test]
    fn test_push_batch_rejects_wrong_dimensionality() {
        let mut corpus = Corpus::new(3, "test-model");
        let result = corpus.push_batch(
            vec![record("v1", 1, 0.0, 1.0, "text")],
            vec![vec![1.0, 0.0]],
        );
        assert!(matches!(
            result,
            Err(LectioError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut corpus = Corpus::new(3, "test-model");
        corpus
            .push_batch(
                vec![record("Rotations", 4, 125.0, 167.0, "A rotation matrix rotates vectors")],
                vec![vec![0.25, -0.5, 0.125]],
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        corpus.save(&path).unwrap();

        let loaded = Corpus::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.dimensions(), 3);
        assert_eq!(loaded.metadata().embedding_model, "test-model");
        assert_eq!(loaded.chunks()[0].chunk_id, 0);
        assert_eq!(loaded.chunks()[0].embedding, vec![0.25, -0.5, 0.125]);
        assert_eq!(loaded.chunks()[0].text, "A rotation matrix rotates vectors");
    }

    #[test]
    fn test_load_rejects_snapshot_with_inconsistent_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        // Hand-edited snapshot: metadata says 3 dimensions, chunk has 2.
        std::fs::write(
            &path,
            r#"{
                "metadata": {
                    "dimensions": 3,
                    "embedding_model": "test-model",
                    "built_at": "2024-01-01T00:00:00Z"
                },
                "chunks": [{
                    "chunk_id": 0,
                    "video_title": "v",
                    "sequence_number": 1,
                    "start_seconds": 0.0,
                    "end_seconds": 1.0,
                    "text": "hello",
                    "embedding": [1.0, 0.0]
                }]
            }"#,
        )
        .unwrap();

        let result = Corpus::load(&path);
        assert!(matches!(
            result,
            Err(LectioError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_load_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let result = Corpus::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(LectioError::CorpusNotLoaded(_))));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(125.0), "2:05");
        assert_eq!(format_timestamp(167.0), "2:47");
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(3605.0), "60:05");
    }

    #[test]
    fn test_video_summary_preserves_order() {
        let mut corpus = Corpus::new(1, "test-model");
        corpus
            .push_batch(
                vec![
                    record("b", 1, 0.0, 1.0, "x"),
                    record("a", 1, 0.0, 1.0, "y"),
                    record("b", 2, 1.0, 2.0, "z"),
                ],
                vec![vec![1.0], vec![1.0], vec![1.0]],
            )
            .unwrap();

        assert_eq!(
            corpus.video_summary(),
            vec![("b".to_string(), 2), ("a".to_string(), 1)]
        );
    }
}
