//! HTTP submission of encoded frames to the analysis endpoint.
//!
//! The wire contract: `POST {base_url}/process-video`, multipart body with a
//! single part named `image` (filename `frame.jpg`, JPEG bytes); response is
//! a JSON object with an optional `transformed_text` string field.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{PROCESS_PATH, ProcessClient, Processor};
pub use config::ClientConfig;
pub use error::ClientError;
pub use types::Processed;
