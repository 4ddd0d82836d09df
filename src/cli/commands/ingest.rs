//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::ingest::IngestOutcome;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(reset: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'gensearch doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let collection = orchestrator.settings().vector_store.collection.clone();

    let spinner = Output::spinner(&format!(
        "Indexing {}...",
        orchestrator.settings().source_path().display()
    ));

    match orchestrator.ingest(reset).await {
        Ok(IngestOutcome::Skipped { points, .. }) => {
            spinner.finish_and_clear();
            Output::info(&format!(
                "Collection '{}' already holds {} points. Use --reset to rebuild it.",
                collection, points
            ));
        }
        Ok(IngestOutcome::Ingested { chunks, .. }) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Indexed {} chunks into '{}'",
                chunks, collection
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
