//! Generate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the generate command.
pub async fn run_generate(prompt: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let responder = Orchestrator::new(settings)?.responder();

    let spinner = Output::spinner("Generating...");
    let result = responder.generate(prompt).await;
    spinner.finish_and_clear();

    match result {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate: {}", e));
            Err(e.into())
        }
    }
}
