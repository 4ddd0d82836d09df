//! gensearch - word-capped generation and document question answering
//!
//! Two HTTP services backed by a hosted, OpenAI-compatible LLM:
//! - `/generate` forwards a prompt and caps the reply at 20 words
//! - `/ask` answers questions strictly from one indexed document (RAG)
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` / `embedding` - Chat and embedding providers
//! - `document` - Document loading and text splitting
//! - `vector_store` - Vector database abstraction (Qdrant, in-memory)
//! - `generate` - Word-capped passthrough
//! - `ingest` - Idempotent indexing of the source document
//! - `rag` - Retrieval chain
//! - `orchestrator` - Startup wiring
//! - `server` - axum router
//!
//! # Example
//!
//! ```rust,no_run
//! use gensearch::config::Settings;
//! use gensearch::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let state = orchestrator.start().await;
//!     println!("{}", state.responder.generate("What is the capital of France?").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generate;
pub mod ingest;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod server;
pub mod vector_store;

pub use error::{GenSearchError, Result};
