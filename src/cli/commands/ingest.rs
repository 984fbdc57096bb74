//! Ingest command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::ingest::IngestPipeline;
use anyhow::Result;
use std::sync::Arc;

/// Run the ingest command.
pub async fn run_ingest(dir: Option<String>, settings: Settings) -> Result<()> {
    let source_dir = match dir {
        Some(d) => Settings::expand_path(&d),
        None => settings.transcripts_dir(),
    };

    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
        settings.retry.policy(),
    ));

    Output::info(&format!("Ingesting transcripts from {}", source_dir.display()));
    let spinner = Output::spinner("Embedding and indexing chunks...");

    let pipeline = IngestPipeline::new(embedder);
    let (corpus, report) = match pipeline.ingest(&source_dir).await {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    let snapshot_path = settings.snapshot_path();
    corpus.save(&snapshot_path)?;

    Output::success(&format!(
        "Indexed {} chunks from {} files",
        report.chunks_indexed, report.files_processed
    ));
    if report.files_skipped > 0 || report.chunks_skipped > 0 {
        Output::warning(&format!(
            "Skipped {} files and {} chunks (see log for details)",
            report.files_skipped, report.chunks_skipped
        ));
    }
    Output::kv("Snapshot", &snapshot_path.display().to_string());
    Output::kv("Embedding model", &corpus.metadata().embedding_model);
    Output::kv("Dimensions", &corpus.dimensions().to_string());

    Ok(())
}
