//! Interactive question-answering session.

use super::load_engine;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    let engine = load_engine(&settings, model, None)?;

    println!("\n{}", style("Lectio").bold().cyan());
    println!(
        "{}",
        style(format!(
            "{} chunks loaded. Ask anything about your videos.",
            engine.index().corpus().len()
        ))
        .dim()
    );
    println!("{}\n", style("Type 'bye' to exit.").dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            Output::info("Please ask a question, or type 'bye' to exit.");
            continue;
        }

        if ["bye", "exit", "quit", "goodbye"]
            .iter()
            .any(|w| input.eq_ignore_ascii_case(w))
        {
            Output::info("Goodbye! Thanks for learning with me.");
            break;
        }

        let spinner = Output::spinner("Thinking...");
        match engine.answer(input).await {
            Ok(response) => {
                spinner.finish_and_clear();
                println!("\n{} {}\n", style("Tutor:").cyan().bold(), response.answer);
                if response.fallback {
                    Output::warning("Generation was unavailable; shown content comes straight from the transcripts.");
                }
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
