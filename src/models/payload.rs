use crate::models::{EventPayload, MpEvent, UserProperty, UserPropertyPayload};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies the user or device the events belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIds {
    /// A web stream, identified by a `client_id`.
    Web {
        /// Usually the value of the `_ga` cookie.
        client_id: Option<String>,
        /// Optional id of a signed in user.
        user_id: Option<String>,
    },
    /// An app stream, identified by a Firebase `app_instance_id`.
    Mobile {
        /// Firebase app instance id.
        app_instance_id: Option<String>,
        /// Optional id of a signed in user.
        user_id: Option<String>,
    },
}

/// The stream that receives the events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceId {
    /// Web stream measurement id, e.g. `G-XXXXXXXX`.
    pub measurement_id: Option<String>,
    /// App stream Firebase app id.
    pub firebase_app_id: Option<String>,
}

/// Body of a Measurement Protocol request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) app_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<String>,
    pub(crate) events: Vec<EventPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_properties: Option<BTreeMap<String, UserPropertyPayload>>,
    #[serde(rename = "validationBehavior", skip_serializing_if = "Option::is_none")]
    pub(crate) validation_behavior: Option<&'static str>,
}

fn non_empty(id: Option<&String>) -> Option<String> {
    id.filter(|id| !id.is_empty()).cloned()
}

/// Build the request body for a list of events.
///
/// Empty ids are left out, and `user_properties` is only present if there are any.
pub fn payload_for(
    events: &[MpEvent],
    client_ids: &ClientIds,
    user_properties: &[UserProperty],
) -> Payload {
    let (client_id, app_instance_id, user_id) = match client_ids {
        ClientIds::Web { client_id, user_id } => (non_empty(client_id.as_ref()), None, user_id),
        ClientIds::Mobile {
            app_instance_id,
            user_id,
        } => (None, non_empty(app_instance_id.as_ref()), user_id),
    };
    Payload {
        client_id,
        app_instance_id,
        user_id: non_empty(user_id.as_ref()),
        events: events.iter().map(MpEvent::as_payload).collect(),
        user_properties: if user_properties.is_empty() {
            None
        } else {
            Some(MpEvent::parameters_to_payload(user_properties))
        },
        validation_behavior: None,
    }
}

/// Query parameter selecting the receiving stream.
///
/// A Firebase app id wins over a measurement id. If neither is set an empty `measurement_id` is
/// used, which the debug endpoint reports as a validation message.
pub fn instance_query_param_for(instance_id: &InstanceId) -> String {
    let (key, value) = match (
        non_empty(instance_id.firebase_app_id.as_ref()),
        non_empty(instance_id.measurement_id.as_ref()),
    ) {
        (Some(firebase_app_id), _) => ("firebase_app_id", firebase_app_id),
        (None, Some(measurement_id)) => ("measurement_id", measurement_id),
        (None, None) => ("measurement_id", String::new()),
    };
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, &value)
        .finish()
}

/// A problem found by the validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    /// Path of the offending field, e.g. `events[0].params.currency`.
    #[serde(alias = "fieldPath")]
    pub param: String,
    /// Human readable description.
    pub description: String,
    /// Machine readable code, e.g. `VALUE_INVALID`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidationResponse {
    #[serde(default)]
    pub(crate) validation_messages: Vec<ValidationMessage>,
}

/// State of the most recent validation of a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Not validated yet.
    #[default]
    Unset,
    /// A validation request is in flight.
    Pending,
    /// The endpoint reported no problems.
    Valid,
    /// The endpoint reported at least one problem.
    Invalid,
}

impl ValidationStatus {
    /// Status for a completed validation.
    pub fn from_messages(messages: &[ValidationMessage]) -> Self {
        if messages.is_empty() {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MpEventType;
    use serde_json::json;
    use test_case::test_case;

    fn web(client_id: &str) -> ClientIds {
        ClientIds::Web {
            client_id: Some(client_id.into()),
            user_id: None,
        }
    }

    #[test]
    fn web_payload() {
        let event = MpEvent::empty(MpEventType::Login)
            .update_parameter("method", "Google")
            .unwrap();
        let payload = payload_for(&[event], &web("123.456"), &[]);
        assert_eq!(
            json!({
                "client_id": "123.456",
                "events": [{"name": "login", "params": {"method": "Google"}}]
            }),
            serde_json::to_value(payload).unwrap()
        );
    }

    #[test]
    fn mobile_payload_with_user_properties() {
        let ids = ClientIds::Mobile {
            app_instance_id: Some("abc".into()),
            user_id: Some("u1".into()),
        };
        let payload = payload_for(
            &[MpEvent::empty(MpEventType::TutorialBegin)],
            &ids,
            &[UserProperty::new("tier", "gold")],
        );
        assert_eq!(
            json!({
                "app_instance_id": "abc",
                "user_id": "u1",
                "events": [{"name": "tutorial_begin", "params": {}}],
                "user_properties": {"tier": {"value": "gold"}}
            }),
            serde_json::to_value(payload).unwrap()
        );
    }

    #[test]
    fn empty_ids_are_absent() {
        let ids = ClientIds::Web {
            client_id: Some(String::new()),
            user_id: Some(String::new()),
        };
        let payload = payload_for(&[], &ids, &[]);
        assert_eq!(
            json!({"events": []}),
            serde_json::to_value(payload).unwrap()
        );
    }

    #[test]
    fn empty_user_properties_are_absent() {
        let payload = payload_for(&[], &web("1"), &[]);
        let value = serde_json::to_value(payload).unwrap();
        assert!(value.get("user_properties").is_none());
    }

    #[test_case(Some("X"), Some("Y"), "firebase_app_id=X" ; "firebase wins")]
    #[test_case(None, Some("Y"), "measurement_id=Y" ; "measurement id")]
    #[test_case(Some(""), Some("G-1"), "measurement_id=G-1" ; "empty firebase id")]
    #[test_case(None, None, "measurement_id=" ; "neither")]
    #[test_case(None, Some("a b&c"), "measurement_id=a+b%26c" ; "encoded")]
    fn instance_query_param(firebase: Option<&str>, measurement: Option<&str>, expected: &str) {
        let instance_id = InstanceId {
            measurement_id: measurement.map(Into::into),
            firebase_app_id: firebase.map(Into::into),
        };
        assert_eq!(expected, instance_query_param_for(&instance_id));
    }

    #[test]
    fn validation_response_format() {
        let response: ValidationResponse = serde_json::from_str(
            r#"{"validationMessages":[{"fieldPath":"events","description":"Event at index: [0] has invalid name.","validationCode":"NAME_INVALID"}]}"#,
        )
        .unwrap();
        assert_eq!(
            vec![ValidationMessage {
                param: "events".into(),
                description: "Event at index: [0] has invalid name.".into(),
                validation_code: Some("NAME_INVALID".into()),
            }],
            response.validation_messages
        );
        let response: ValidationResponse = serde_json::from_str("{}").unwrap();
        assert!(response.validation_messages.is_empty());
    }

    #[test]
    fn status_from_messages() {
        assert_eq!(ValidationStatus::Valid, ValidationStatus::from_messages(&[]));
        let message = ValidationMessage {
            param: "events".into(),
            description: "bad".into(),
            validation_code: None,
        };
        assert_eq!(
            ValidationStatus::Invalid,
            ValidationStatus::from_messages(&[message])
        );
    }
}
