pub mod frame;
pub mod logging;

pub use frame::{Frame, FrameError};
pub use logging::{StdoutLogger, format_timestamp, init_stdout_logger};

// Re-export log so downstream crates can use lexi_base::log::*
pub use log;
