pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod load;
pub mod logging;
pub mod pipeline;
pub mod progress_log;
pub mod query;
pub mod transform;

// Ports (app) and their adapters (infra)
pub mod app;
pub mod infra;
