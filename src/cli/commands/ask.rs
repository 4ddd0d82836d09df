//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::NOT_INITIALIZED;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    top_k: Option<usize>,
    show_sources: bool,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'gensearch doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.rag.model = model;
    }
    if let Some(k) = top_k {
        settings.rag.top_k = k;
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Preparing knowledge base...");
    let Some(chain) = orchestrator.retrieval_chain().await else {
        spinner.finish_and_clear();
        Output::error(NOT_INITIALIZED);
        anyhow::bail!(NOT_INITIALIZED);
    };

    spinner.set_message("Searching document...");
    let result = chain.ask_with_sources(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            println!("\n{}\n", response.answer);

            if show_sources && !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::chunk_result(source.chunk_index, source.score, &source.content);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
