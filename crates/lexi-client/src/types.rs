use serde::Deserialize;

/// Result of one processing round trip.
///
/// `text` is the transformed text the endpoint extracted from the frame, or
/// `None` when the frame contained nothing recognizable. Consumed once by
/// the overlay, then discarded.
#[derive(Clone, Debug, PartialEq)]
pub struct Processed {
    pub text: Option<String>,
}

/// Wire shape of the endpoint's JSON response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ProcessResponse {
    pub(crate) transformed_text: Option<String>,
}
