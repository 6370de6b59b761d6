use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    /// The request never produced a response: connect failure, timeout,
    /// or a transport-level break mid-exchange.
    Network(String),
    /// The endpoint answered with a non-success status.
    Http(u16),
    /// The response body was not the JSON shape the contract promises.
    Parse(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(msg) => write!(f, "network failure: {msg}"),
            ClientError::Http(status) => write!(f, "endpoint returned HTTP {status}"),
            ClientError::Parse(msg) => write!(f, "unparseable response: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}
