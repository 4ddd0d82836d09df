//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{GenSearchError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Generation requires an LLM key.
    Generate,
    /// Asking requires an LLM key and the source document.
    Ask,
    /// Ingestion requires the source document.
    Ingest,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Generate => check_api_key(settings)?,
        Operation::Ask => {
            check_api_key(settings)?;
            check_source(settings)?;
        }
        Operation::Ingest => check_source(settings)?,
    }
    Ok(())
}

fn check_api_key(settings: &Settings) -> Result<()> {
    match settings.llm.api_key() {
        Some(_) => Ok(()),
        None => Err(GenSearchError::Config(
            "GROQ_API_KEY not set. Set it with: export GROQ_API_KEY='gsk_...'".to_string(),
        )),
    }
}

fn check_source(settings: &Settings) -> Result<()> {
    let path = settings.source_path();
    if path.is_file() {
        Ok(())
    } else {
        Err(GenSearchError::Config(format!(
            "Source document not found at {}. Set SOURCE_DOCUMENT or ingestion.source_path.",
            path.display()
        )))
    }
}
