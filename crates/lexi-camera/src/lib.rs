//! Camera capture abstraction for the lexi client.
//!
//! This crate provides the `FrameSource` trait for async frame capture,
//! with backend implementations for platform camera APIs.

pub mod config;
pub mod error;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::CameraConfig;
pub use error::CameraError;
pub use traits::FrameSource;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;
