//! Shared utilities for the oracle service.

pub mod logging;
pub mod shutdown;
pub mod tracing_spans;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
pub use shutdown::ShutdownController;
