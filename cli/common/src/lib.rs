//! Shared utilities for the flightline CLI binaries.
//!
//! Used by `fl-producer`, `fl-index` and `fl-worker`.

pub mod args;
pub mod format;
pub mod logging;
pub mod shutdown;

pub use args::{parse_positive_usize, LogLevel};
pub use format::{format_duration, format_number};
pub use logging::init_logging;
pub use shutdown::cancel_on_ctrl_c;
