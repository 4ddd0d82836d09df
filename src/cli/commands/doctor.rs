//! Doctor command - verify configuration and connectivity.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{create_embedder, create_vector_store};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("gensearch Doctor");
    println!();
    println!("Checking configuration and connectivity...\n");

    let mut checks = Vec::new();

    let section = vec![check_api_key(settings)];
    print_section("LLM Provider", &section);
    checks.extend(section);

    let section = vec![check_source(settings)];
    print_section("Source Document", &section);
    checks.extend(section);

    let section = check_vector_store(settings).await;
    print_section("Vector Store", &section);
    checks.extend(section);

    let section = vec![check_embeddings(settings).await];
    print_section("Embeddings", &section);
    checks.extend(section);

    let section = vec![check_config_file()];
    print_section("Configuration", &section);
    checks.extend(section);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. The affected endpoints will report errors.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! gensearch is ready to serve.");
    }

    Ok(())
}

/// Check if the LLM API key is configured.
fn check_api_key(settings: &Settings) -> CheckResult {
    match settings.llm.api_key() {
        Some(key) => {
            let masked = mask_key(key);
            let message = format!("configured ({}) for {}", masked, settings.llm.api_base);
            if key.starts_with("gsk_") || !settings.llm.api_base.contains("groq.com") {
                CheckResult::ok("GROQ_API_KEY", &message)
            } else {
                CheckResult::warning(
                    "GROQ_API_KEY",
                    &message,
                    "Groq keys usually start with gsk_",
                )
            }
        }
        None => CheckResult::error(
            "GROQ_API_KEY",
            "not set",
            "Set with: export GROQ_API_KEY='gsk_...'",
        ),
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check the document ingested at startup.
fn check_source(settings: &Settings) -> CheckResult {
    let path = settings.source_path();
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => CheckResult::ok(
            "Source",
            &format!("{} ({})", path.display(), format_size(meta.len())),
        ),
        _ => CheckResult::error(
            "Source",
            &format!("{} not found", path.display()),
            "Set SOURCE_DOCUMENT or ingestion.source_path; /ask stays disabled without it",
        ),
    }
}

/// Check the vector store is reachable and report the collection state.
async fn check_vector_store(settings: &Settings) -> Vec<CheckResult> {
    let name = format!("{} ({})", settings.vector_store.provider, settings.vector_store.url());
    let store = match create_vector_store(settings) {
        Ok(store) => store,
        Err(e) => {
            return vec![CheckResult::error(
                &name,
                &e.to_string(),
                "Check vector_store.provider in the config file",
            )]
        }
    };

    if let Err(e) = store.health_check().await {
        return vec![CheckResult::error(
            &name,
            &format!("unreachable: {}", e),
            "Set QDRANT_HOST/QDRANT_PORT (gRPC port, usually 6334)",
        )];
    }

    let collection = &settings.vector_store.collection;
    let state = match store.point_count(collection).await {
        Ok(Some(points)) if points > 0 => {
            CheckResult::ok("Collection", &format!("'{}' holds {} points", collection, points))
        }
        Ok(Some(_)) => CheckResult::warning(
            "Collection",
            &format!("'{}' is empty", collection),
            "It is filled on the next start, or run: gensearch ingest",
        ),
        Ok(None) => CheckResult::warning(
            "Collection",
            &format!("'{}' does not exist yet", collection),
            "It is created on the next start, or run: gensearch ingest",
        ),
        Err(e) => CheckResult::error(
            "Collection",
            &e.to_string(),
            "Rebuild with: gensearch ingest --reset",
        ),
    };

    vec![CheckResult::ok(&name, "reachable"), state]
}

/// Embed a sample string and verify the vector size.
async fn check_embeddings(settings: &Settings) -> CheckResult {
    let (name, hint) = match settings.embedding.provider.as_str() {
        "openai" => (
            format!("{} ({})", settings.embedding.model, settings.embedding.api_base),
            "Set EMBEDDING_API_BASE to an OpenAI-compatible embeddings server",
        ),
        _ => (
            format!("local ({})", settings.embedding_model_path().display()),
            "Set EMBEDDING_MODEL_PATH to a sentence-transformers model directory",
        ),
    };

    let embedder = match create_embedder(settings) {
        Ok(embedder) => embedder,
        Err(e) => return CheckResult::error(&name, &e.to_string(), hint),
    };

    match embedder.embed("Serial 1 voter name").await {
        Ok(vector) if vector.len() == embedder.dimensions() => {
            CheckResult::ok(&name, &format!("{} dimensions", vector.len()))
        }
        Ok(vector) => CheckResult::error(
            &name,
            &format!("{} dimensions, expected {}", vector.len(), embedder.dimensions()),
            "Use the model the collection was built with, or rebuild with ingest --reset",
        ),
        Err(e) => CheckResult::error(&name, &e.to_string(), hint),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults and environment",
            "Create with: gensearch config init",
        )
    }
}
