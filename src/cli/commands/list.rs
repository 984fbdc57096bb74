//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::Corpus;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let corpus = Corpus::load(&settings.snapshot_path())?;

    Output::header("Indexed videos");
    for (title, chunks) in corpus.video_summary() {
        Output::video_info(&title, chunks);
    }
    println!();
    Output::kv("Total chunks", &corpus.len().to_string());
    Output::kv("Embedding model", &corpus.metadata().embedding_model);
    Output::kv(
        "Built at",
        &corpus.metadata().built_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    );

    Ok(())
}
