use std::time::Duration;

/// Configuration for the processing endpoint.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Set the endpoint base URL (scheme, host, port - no path).
    pub fn with_base_url(mut self, mut base_url: String) -> Self {
        // The process path is appended verbatim; strip a trailing slash so
        // "http://host/" and "http://host" behave the same.
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }

    /// Bound the whole request round trip.
    ///
    /// Off by default: a stalled endpoint stalls the cadence, matching the
    /// documented submission contract. Opting in changes stall behavior into
    /// a `ClientError::Network` after the deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    // Getters
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}
