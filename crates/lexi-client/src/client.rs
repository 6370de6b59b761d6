use crate::types::ProcessResponse;
use crate::{ClientConfig, ClientError, Processed};
use lexi_image::EncodedFrame;
use reqwest::multipart::{Form, Part};

/// Endpoint path for frame analysis.
pub const PROCESS_PATH: &str = "/process-video";

/// Form part name and filename the endpoint expects.
const IMAGE_PART: &str = "image";
const IMAGE_FILENAME: &str = "frame.jpg";

/// Seam between the poll loop and the wire, so the loop can be driven
/// against fakes.
#[allow(async_fn_in_trait)]
pub trait Processor {
    /// Submit one encoded frame and await the full parsed result.
    ///
    /// The payload is consumed; it belongs to the in-flight request.
    async fn submit(&self, payload: EncodedFrame) -> Result<Processed, ClientError>;
}

/// HTTP client for the remote analysis endpoint.
///
/// One multipart POST per frame; no retries, no queueing. Every failure is
/// returned to the caller, who decides what the next cycle does with it.
pub struct ProcessClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ProcessClient {
    /// Build the underlying HTTP client from the configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;

        Ok(Self { http, config })
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn process_url(&self) -> String {
        format!("{}{}", self.config.base_url(), PROCESS_PATH)
    }
}

impl Processor for ProcessClient {
    async fn submit(&self, payload: EncodedFrame) -> Result<Processed, ClientError> {
        let part = Part::bytes(payload.bytes)
            .file_name(IMAGE_FILENAME)
            .mime_str(payload.media_type)
            .map_err(|err| ClientError::Network(err.to_string()))?;
        let form = Form::new().part(IMAGE_PART, part);

        let response = self
            .http
            .post(self.process_url())
            .multipart(form)
            .send()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;

        // Status is checked before the body is touched; a failing endpoint
        // reports as Http, never as a parse artifact.
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(status.as_u16()));
        }

        let body: ProcessResponse = response
            .json()
            .await
            .map_err(|err| ClientError::Parse(err.to_string()))?;

        log::debug!(
            "processed frame: {} chars of text",
            body.transformed_text.as_deref().map_or(0, str::len)
        );

        Ok(Processed {
            text: body.transformed_text,
        })
    }
}
