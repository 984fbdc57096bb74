//! Lectio - Transcript Retrieval and Grounded Q&A
//!
//! A CLI tool for answering natural-language questions about a library of
//! lecture video transcripts using retrieval-augmented generation.
//!
//! # Overview
//!
//! Lectio allows you to:
//! - Build a searchable vector corpus from per-video transcript files
//! - Ask questions and get answers citing video titles and timestamps
//! - Fall back to a retrieval-only answer when generation is unavailable
//! - Serve the same pipeline over HTTP
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `corpus` - Transcript chunks and the persisted corpus snapshot
//! - `embedding` - Embedding generation
//! - `ranker` - Cosine-similarity ranking over the corpus
//! - `generation` - Answer generation
//! - `ingest` - Offline ingestion pipeline
//! - `query` - Online query pipeline
//! - `retry` - Bounded retry with fixed backoff for external calls
//!
//! # Example
//!
//! ```rust,no_run
//! use lectio::config::Settings;
//! use lectio::embedding::OpenAIEmbedder;
//! use lectio::ingest::IngestPipeline;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let embedder = Arc::new(OpenAIEmbedder::with_config(
//!         &settings.embedding.model,
//!         settings.embedding.dimensions as usize,
//!         settings.retry.policy(),
//!     ));
//!
//!     let (corpus, report) = IngestPipeline::new(embedder)
//!         .ingest(&settings.transcripts_dir())
//!         .await?;
//!     corpus.save(&settings.snapshot_path())?;
//!     println!("Indexed {} chunks", report.chunks_indexed);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod openai;
pub mod query;
pub mod ranker;
pub mod retry;

pub use error::{LectioError, Result};
