//! Clip-generation engine for clipbench.
//!
//! This crate owns the per-video job-state machine: idempotent `generate`,
//! forced `regenerate`, clean-slate retry, and the startup recovery sweep
//! that repairs state left behind by abrupt process termination. It sits on
//! the durable record store and the ffmpeg toolkit.

pub mod config;
pub mod error;
pub mod generator;
pub mod layout;
pub mod logging;
pub mod recovery;
pub mod service;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use generator::JobOutcome;
pub use layout::LibraryLayout;
pub use logging::JobLogger;
pub use recovery::INTERRUPTED_JOB_ERROR;
pub use service::Library;
