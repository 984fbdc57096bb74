//! Ask command implementation.

use super::load_engine;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    top_k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let engine = load_engine(&settings, model, top_k)?;

    let spinner = Output::spinner("Searching the corpus...");

    match engine.answer(question).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.answer);

            if response.fallback {
                Output::warning("Generation was unavailable; this is a retrieval-only answer.");
            }

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::search_result(
                        &source.video_title,
                        &source.time_range,
                        source.score,
                        &source.text,
                    );
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer question: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
