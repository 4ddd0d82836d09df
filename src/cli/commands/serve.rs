//! HTTP API server.
//!
//! Runs startup ingestion, then serves `/generate`, `/ask` and `/health`.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::server;

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Preparing services...");
    let state = orchestrator.start().await;
    spinner.finish_and_clear();

    let addr = format!("{}:{}", host, port);

    Output::header("gensearch API Server");
    println!();
    Output::kv("Generate", &Output::ready(state.responder.is_ready()));
    Output::kv("RAG", &Output::ready(state.rag.is_some()));
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Generate", "POST /generate");
    Output::kv("Ask (RAG)", "POST /ask");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(state, &addr).await?;

    Ok(())
}
