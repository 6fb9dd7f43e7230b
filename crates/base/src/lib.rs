//! Shared building blocks for the mediastream workspace.

pub mod logging;
pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};

mod vec2;
pub use vec2::*;

// Re-export log so downstream crates can use base::log::*
pub use log;
