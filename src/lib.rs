pub mod analyzer;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod nse_client;
pub mod sinks;

// Re-exports for convenience
pub use analyzer::{AnalysisResult, Bias, OiByStrike, StrikeRow, analyze};
pub use config::Settings;
pub use error::TrackerError;
pub use models::{OptionChain, OptionChainSnapshot, StrikeOi};
pub use nse_client::NseClient;
pub use sinks::{LevelSink, TickReport};
