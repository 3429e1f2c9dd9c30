//! streampick command-line host
//!
//! Layered configuration, structured logging and the caller-side retry policy
//! around `streampick-resolver`.

pub mod config;
pub mod logging;
pub mod output;
pub mod retry;

pub use config::Config;
pub use output::{render, OutputFormat};
pub use retry::resolve_with_retry;
