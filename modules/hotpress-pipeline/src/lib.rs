pub mod artifacts;
pub mod crawler;
pub mod filter;
pub mod generator;
pub mod illustrator;
pub mod ledger;
pub mod pipeline;
pub mod publisher;
pub mod retry;
pub mod topics;
pub mod traits;

pub use ledger::PublishLedger;
pub use pipeline::{CoverMode, CoverParams, Orchestrator, PublishOptions, RunStats};
pub use retry::RetryPolicy;
