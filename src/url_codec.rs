//! Sharing the builder state through URLs.
//!
//! Scalar fields are plain query parameters. The event and the user properties are JSON, base64
//! encoded to keep the URL short:
//!
//! | Query parameter   | Content                                        |
//! | ----------------- | ---------------------------------------------- |
//! | `client_id`       | [`UrlParts::client_id`]                        |
//! | `app_instance_id` | [`UrlParts::app_instance_id`]                  |
//! | `user_id`         | [`UrlParts::user_id`]                          |
//! | `api_secret`      | [`UrlParts::api_secret`]                       |
//! | `event_name`      | name of a custom event                         |
//! | `measurement_id`  | [`UrlParts::measurement_id`]                   |
//! | `firebase_app_id` | [`UrlParts::firebase_app_id`]                  |
//! | `eventData`       | base64 JSON of [`EventData`]                   |
//! | `user_properties` | base64 JSON array of [`UserProperty`]          |
//! | `eventType`       | event kind, used when there is no `eventData`  |
//!
//! Decoding never fails. Links may be old or cut off, so anything that does not decode is skipped
//! and the defaults are used instead.

use crate::models::{EventData, MpEvent, MpEventType, UserProperty};
use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;
use url::{form_urlencoded, Position, Url};

const CLIENT_ID: &str = "client_id";
const APP_INSTANCE_ID: &str = "app_instance_id";
const USER_ID: &str = "user_id";
const API_SECRET: &str = "api_secret";
const EVENT_NAME: &str = "event_name";
const MEASUREMENT_ID: &str = "measurement_id";
const FIREBASE_APP_ID: &str = "firebase_app_id";
const EVENT_DATA: &str = "eventData";
const LEGACY_EVENT_DATA: &str = "event_data";
const EVENT_TYPE: &str = "eventType";
const USER_PROPERTIES: &str = "user_properties";

/// State of the event builder that can be shared in a URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlParts {
    /// Name of a custom event.
    pub event_name: Option<String>,
    /// Web client id.
    pub client_id: Option<String>,
    /// Firebase app instance id.
    pub app_instance_id: Option<String>,
    /// Signed in user id.
    pub user_id: Option<String>,
    /// The event.
    pub event: Option<MpEvent>,
    /// Web stream measurement id.
    pub measurement_id: Option<String>,
    /// App stream Firebase app id.
    pub firebase_app_id: Option<String>,
    /// Measurement Protocol API secret.
    pub api_secret: Option<String>,
    /// User properties.
    pub user_properties: Option<Vec<UserProperty>>,
}

#[derive(thiserror::Error, Debug)]
enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown event type {0:?}")]
    UnknownEventType(String),
    #[error("expected a list of user properties")]
    NotAList,
}

/// Build a shareable URL for `parts` on the page at `location`.
///
/// Empty scalar fields are left out. Any credentials, query or fragment of `location` are dropped.
pub fn parameterized_url(location: &Url, parts: &UrlParts) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    append_non_empty(&mut params, CLIENT_ID, parts.client_id.as_ref());
    append_non_empty(&mut params, APP_INSTANCE_ID, parts.app_instance_id.as_ref());
    append_non_empty(&mut params, USER_ID, parts.user_id.as_ref());
    append_non_empty(&mut params, API_SECRET, parts.api_secret.as_ref());
    if let Some(event) = parts.event.as_ref().filter(|e| e.is_custom_event()) {
        params.append_pair(EVENT_NAME, event.get_event_name());
    }
    append_non_empty(&mut params, MEASUREMENT_ID, parts.measurement_id.as_ref());
    append_non_empty(&mut params, FIREBASE_APP_ID, parts.firebase_app_id.as_ref());

    if let Some(event) = &parts.event {
        match serde_json::to_vec(event.get_event_data()) {
            Ok(json) => {
                params.append_pair(EVENT_DATA, &general_purpose::STANDARD.encode(json));
            }
            Err(err) => tracing::warn!(error = %err, "could not encode event for url"),
        }
    }

    if let Some(user_properties) = &parts.user_properties {
        let filtered: Vec<_> = user_properties
            .iter()
            .filter(|property| property.value.is_some())
            .collect();
        match serde_json::to_vec(&filtered) {
            Ok(json) => {
                params.append_pair(USER_PROPERTIES, &general_purpose::STANDARD.encode(json));
            }
            Err(err) => tracing::warn!(error = %err, "could not encode user properties for url"),
        }
    }

    format!(
        "{}://{}?{}",
        location.scheme(),
        &location[Position::BeforeHost..Position::AfterPath],
        params.finish()
    )
}

fn append_non_empty(
    params: &mut form_urlencoded::Serializer<'_, String>,
    key: &str,
    value: Option<&String>,
) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.append_pair(key, value);
    }
}

/// Read the builder state from the query of `location`.
///
/// The event is always present: if the URL carries none, or it does not decode,
/// [`MpEvent::default`] is used.
pub fn un_parameterize_url(location: &Url) -> UrlParts {
    let mut params = HashMap::new();
    for (key, value) in location.query_pairs().into_owned() {
        // First occurrence wins.
        params.entry(key).or_insert(value);
    }
    let get = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();

    let event = event_from_params(&params);
    let user_properties = match params.get(USER_PROPERTIES).map(|s| decode_user_properties(s)) {
        Some(Ok(user_properties)) => Some(user_properties),
        Some(Err(err)) => {
            tracing::debug!(error = %err, "ignoring user properties in url");
            None
        }
        None => None,
    };

    UrlParts {
        event_name: Some(event.get_event_name().to_string()).filter(|_| event.is_custom_event()),
        client_id: get(CLIENT_ID),
        app_instance_id: get(APP_INSTANCE_ID),
        user_id: get(USER_ID),
        event: Some(event),
        measurement_id: get(MEASUREMENT_ID),
        firebase_app_id: get(FIREBASE_APP_ID),
        api_secret: get(API_SECRET),
        user_properties,
    }
}

fn event_from_params(params: &HashMap<String, String>) -> MpEvent {
    if let Some(encoded) = params.get(EVENT_DATA).or_else(|| params.get(LEGACY_EVENT_DATA)) {
        match decode_event(encoded, params.get(EVENT_NAME)) {
            Ok(event) => return event,
            Err(err) => tracing::debug!(error = %err, "ignoring event in url"),
        }
    }
    if let Some(raw) = params.get(EVENT_TYPE) {
        match MpEvent::event_type_from_string(raw) {
            Some(event_type) => return MpEvent::empty(event_type),
            None => tracing::debug!(event_type = %raw, "ignoring unknown event type in url"),
        }
    }
    MpEvent::default()
}

fn decode_event(encoded: &str, event_name: Option<&String>) -> Result<MpEvent, DecodeError> {
    let json = general_purpose::STANDARD.decode(encoded)?;
    let mut value: serde_json::Value = serde_json::from_slice(&json)?;
    // Unknown kinds are reported before the rest of the shape is checked.
    let raw_type = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();
    let event_type = MpEvent::event_type_from_string(&raw_type)
        .ok_or(DecodeError::UnknownEventType(raw_type))?;
    if let Some(object) = value.as_object_mut() {
        object
            .entry("parameters")
            .or_insert_with(|| serde_json::Value::Object(Default::default()));
    }
    let data: EventData = serde_json::from_value(value)?;
    let mut event = MpEvent::from_event_data(data);
    if event_type == MpEventType::CustomEvent {
        if let Some(name) = event_name {
            event = event.update_name(name.as_str());
        }
    }
    Ok(event)
}

fn decode_user_properties(encoded: &str) -> Result<Vec<UserProperty>, DecodeError> {
    let json = general_purpose::STANDARD.decode(encoded)?;
    let value: serde_json::Value = serde_json::from_slice(&json)?;
    if !value.is_array() {
        return Err(DecodeError::NotAList);
    }
    Ok(serde_json::from_value(value)?)
}
