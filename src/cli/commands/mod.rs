//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod ingest;
mod list;
mod search;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use ingest::run_ingest;
pub use list::run_list;
pub use search::run_search;
pub use serve::run_serve;

use crate::config::{Prompts, Settings};
use crate::corpus::Corpus;
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::generation::{OpenAIGenerator, SamplingParams};
use crate::query::QueryEngine;
use crate::ranker::CorpusIndex;
use std::sync::Arc;

/// Build a query engine over the persisted corpus snapshot.
///
/// Every entry point (one-shot ask, chat loop, HTTP server) goes through
/// this so they all share one pipeline.
pub fn load_engine(
    settings: &Settings,
    model: Option<String>,
    top_k: Option<usize>,
) -> Result<QueryEngine> {
    let corpus = Corpus::load(&settings.snapshot_path())?;
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let retry = settings.retry.policy();
    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
        retry,
    ));

    let model = model.unwrap_or_else(|| settings.generation.model.clone());
    let generator = Arc::new(OpenAIGenerator::new(
        &model,
        &prompts.rag.system,
        SamplingParams {
            max_tokens: settings.generation.max_tokens,
            temperature: settings.generation.temperature,
        },
        retry,
    ));

    let mut engine = QueryEngine::new(
        CorpusIndex::new(corpus),
        embedder,
        generator,
        prompts,
        top_k.unwrap_or(settings.retrieval.top_k),
    );
    if settings.general.dump_artifacts {
        engine = engine.with_artifact_dir(settings.data_dir());
    }
    Ok(engine)
}
