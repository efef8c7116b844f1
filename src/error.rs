use crate::models::MpEventType;
use std::error::Error as StdError;

/// Errors returned by this crate.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The string is not the wire name of any supported event.
    #[error("unknown event type {0:?}")]
    UnknownEventType(String),

    /// Tried to update a parameter that is not part of the event's schema.
    ///
    /// Note: Check [`MpEventType::schema`] for the parameters an event supports.
    #[error("{name} is not a parameter in {event_type}")]
    UnknownParameter {
        /// Parameter that was updated.
        name: String,
        /// Kind of the event that was updated.
        event_type: MpEventType,
    },

    /// Tried to update or rename a custom parameter that was never added.
    #[error("{name} is not a custom parameter in {event_type}")]
    UnknownCustomParameter {
        /// Parameter that was updated.
        name: String,
        /// Kind of the event that was updated.
        event_type: MpEventType,
    },

    /// The request payload failed to serialize to JSON.
    ///
    /// Note: This is an error in this crate. If you spot this, please open an issue.
    #[error("serializing request failed with {0}")]
    SerializeRequest(serde_json::Error),

    /// The response of the validation endpoint failed to deserialize from JSON.
    #[error("deserializing validation response failed with {0}")]
    DeserializeResponse(serde_json::Error),

    /// The endpoint, stream id and API secret did not form a valid request URL.
    #[error("invalid request url: {0}")]
    InvalidUri(http::uri::InvalidUri),

    /// Could not complete the HTTP request to Google Analytics.
    #[error("sending request failed with {0}")]
    Connection(Box<dyn StdError + Send + Sync + 'static>),

    /// Google Analytics answered with a non-success status.
    #[error("request failed with {0}")]
    Request(String),
}
