//! Search command implementation (retrieval only, no generation).

use super::load_engine;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: Option<usize>, settings: Settings) -> Result<()> {
    let limit = limit.unwrap_or(settings.retrieval.search_limit);
    let engine = load_engine(&settings, None, None)?;

    let spinner = Output::spinner("Searching...");
    let results = match engine.search(query, limit).await {
        Ok(results) => results,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    if results.is_empty() {
        Output::info("No matching chunks found.");
        return Ok(());
    }

    Output::header(&format!("Top {} results", results.len()));
    for result in &results {
        Output::search_result(
            &result.video_title,
            &result.time_range,
            result.score,
            &result.text,
        );
    }

    Ok(())
}
