//! Session core: the poll loop, its Idle/Running state machine, and the
//! overlay surface results land on.
//!
//! One session task owns all mutable session state. The toggle control and
//! the loop communicate over channels, so cycles are serialized by
//! construction and a stop can never cancel a cycle that is already in
//! flight - it only keeps the next one from being scheduled.

pub mod error;
pub mod overlay;
pub mod session;
pub mod state;

pub use error::CycleError;
pub use overlay::{ConsoleOverlay, Overlay, Typography};
pub use session::{
    CAMERA_ERROR_PREFIX, NO_TEXT_PLACEHOLDER, PROCESSING_ERROR_PREFIX, Session, SessionClosed,
    SessionConfig, SessionHandle,
};
pub use state::Phase;
