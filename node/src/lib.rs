//! Agreement core wiring for a YAC node.
//!
//! Combines the vote storage of `yac-consensus` with the ordering gate of
//! `yac-ordering` behind [`AgreementCore`], and carries what a process
//! embedding them needs around the edges: TOML configuration, tracing
//! setup and Prometheus metrics.

pub mod agreement;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use agreement::AgreementCore;
pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::CoreMetrics;
