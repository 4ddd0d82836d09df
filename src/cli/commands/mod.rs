//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod generate;
mod ingest;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::run_generate;
pub use ingest::run_ingest;
pub use serve::run_serve;
