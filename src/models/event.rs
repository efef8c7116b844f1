use crate::{
    models::{EventParameter, MpEventType, Parameter, ParameterValue, Parameters, UserProperty},
    Error,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parameters of an event, as shared in URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    /// Event kind.
    #[serde(rename = "type")]
    pub event_type: MpEventType,

    /// Schema parameters of the event kind.
    pub parameters: Parameters,

    /// User declared parameters.
    #[serde(default)]
    pub custom_parameters: Parameters,
}

/// One event as sent in the `events` list of a Measurement Protocol request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    /// Event name.
    pub name: String,
    /// Parameters that have a value.
    pub params: Map<String, Value>,
}

/// A Measurement Protocol event.
///
/// Events are immutable. Every update returns a new event and leaves the original untouched.
///
/// ```
/// use ga4_event_builder::{MpEvent, MpEventType};
///
/// let event = MpEvent::empty(MpEventType::AddToCart);
/// let updated = event.update_parameter("currency", "USD").unwrap();
/// assert!(event.update_parameter("bogus", "x").is_err());
/// # assert_ne!(event, updated);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MpEvent {
    event_type: MpEventType,
    event_name: String,
    data: EventData,
}

impl MpEvent {
    /// Every supported event kind.
    pub fn options() -> &'static [MpEventType] {
        MpEventType::ALL
    }

    /// An event of the given kind with all schema parameters unset.
    pub fn empty(event_type: MpEventType) -> Self {
        let parameters = event_type
            .schema()
            .iter()
            .map(|spec| {
                (
                    spec.name,
                    Parameter {
                        parameter_type: spec.parameter_type,
                        value: None,
                        required: spec.required,
                    },
                )
            })
            .collect();
        MpEvent {
            event_type,
            event_name: String::new(),
            data: EventData {
                event_type,
                parameters,
                custom_parameters: Parameters::new(),
            },
        }
    }

    /// Look up an event kind by its wire name.
    pub fn event_type_from_string(raw: &str) -> Option<MpEventType> {
        MpEventType::from_name(raw)
    }

    /// The event kind.
    pub fn get_event_type(&self) -> MpEventType {
        self.event_type
    }

    /// Whether this is a [`MpEventType::CustomEvent`].
    pub fn is_custom_event(&self) -> bool {
        self.event_type == MpEventType::CustomEvent
    }

    /// Name sent to GA: the user chosen name for custom events, the wire name otherwise.
    pub fn get_event_name(&self) -> &str {
        if self.is_custom_event() {
            &self.event_name
        } else {
            self.event_type.as_str()
        }
    }

    /// Parameters and custom parameters of the event.
    pub fn get_event_data(&self) -> &EventData {
        &self.data
    }

    /// Set the name of a custom event. Ignored on the wire for other kinds.
    pub fn update_name(&self, name: impl Into<String>) -> Self {
        MpEvent {
            event_name: name.into(),
            ..self.clone()
        }
    }

    /// Replace the value of a schema parameter.
    pub fn update_parameter(
        &self,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<Self, Error> {
        let mut next = self.clone();
        match next.data.parameters.get_mut(name) {
            Some(parameter) => parameter.value = Some(value.into()),
            None => {
                return Err(Error::UnknownParameter {
                    name: name.to_string(),
                    event_type: self.event_type,
                })
            }
        }
        Ok(next)
    }

    /// Replace the whole parameter map.
    ///
    /// Parameters whose names are not part of the event kind's schema are dropped, and the type and
    /// required flag of kept parameters always come from the schema.
    /// Schema parameters missing from the replacement are left without a value. The event name and
    /// custom parameters are kept.
    pub fn update_parameters(&self, f: impl FnOnce(&Parameters) -> Parameters) -> Self {
        let replacement = f(&self.data.parameters);
        let mut next = self.clone();
        next.data.parameters = MpEvent::empty(self.event_type).data.parameters;
        for (name, parameter) in replacement.iter() {
            match next.data.parameters.get_mut(name) {
                Some(existing) => existing.value = parameter.value.clone(),
                None => tracing::debug!(
                    parameter = name,
                    event_type = %self.event_type,
                    "dropping parameter outside of the event schema"
                ),
            }
        }
        next
    }

    /// Replace the value of a custom parameter.
    pub fn update_custom_parameter(
        &self,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<Self, Error> {
        let mut next = self.clone();
        match next.data.custom_parameters.get_mut(name) {
            Some(parameter) => parameter.value = Some(value.into()),
            None => {
                return Err(Error::UnknownCustomParameter {
                    name: name.to_string(),
                    event_type: self.event_type,
                })
            }
        }
        Ok(next)
    }

    /// Insert or replace a custom parameter.
    pub fn add_custom_parameter(&self, name: impl Into<String>, parameter: Parameter) -> Self {
        let mut next = self.clone();
        next.data.custom_parameters.insert(name, parameter);
        next
    }

    /// Remove a custom parameter. Does nothing if it does not exist.
    pub fn remove_custom_parameter(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.data.custom_parameters.remove(name);
        next
    }

    /// Rename a custom parameter.
    ///
    /// The parameter is added under the new name before the old name is removed, so it moves to
    /// the end of the custom parameter list unless `new_name` already existed.
    pub fn update_custom_parameter_name(&self, name: &str, new_name: &str) -> Result<Self, Error> {
        let parameter = self
            .data
            .custom_parameters
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownCustomParameter {
                name: name.to_string(),
                event_type: self.event_type,
            })?;
        if name == new_name {
            return Ok(self.clone());
        }
        Ok(self
            .add_custom_parameter(new_name, parameter)
            .remove_custom_parameter(name))
    }

    /// Schema parameters in declaration order.
    pub fn get_parameters(&self) -> Vec<EventParameter> {
        self.data.parameters.to_event_parameters()
    }

    /// Custom parameters in insertion order.
    pub fn get_custom_parameters(&self) -> Vec<EventParameter> {
        self.data.custom_parameters.to_event_parameters()
    }

    /// Wire form of the event. Parameters without a value are left out.
    pub fn as_payload(&self) -> EventPayload {
        let params = self
            .data
            .parameters
            .iter()
            .chain(self.data.custom_parameters.iter())
            .filter_map(|(name, parameter)| {
                parameter
                    .payload_value()
                    .map(|value| (name.to_string(), value))
            })
            .collect();
        EventPayload {
            name: self.get_event_name().to_string(),
            params,
        }
    }

    /// Wire form of user properties: `{"name": {"value": ...}}`. Properties without a value are
    /// left out.
    pub fn parameters_to_payload(
        user_properties: &[UserProperty],
    ) -> BTreeMap<String, UserPropertyPayload> {
        user_properties
            .iter()
            .filter_map(|property| {
                property
                    .value
                    .as_ref()
                    .and_then(|v| v.to_payload(property.parameter_type))
                    .map(|value| (property.name.clone(), UserPropertyPayload { value }))
            })
            .collect()
    }

    /// Build an event from decoded URL data. Only parameters in the kind's schema are kept.
    pub(crate) fn from_event_data(data: EventData) -> Self {
        let EventData {
            event_type,
            parameters,
            custom_parameters,
        } = data;
        let mut event = MpEvent::empty(event_type).update_parameters(|_| parameters);
        event.data.custom_parameters = custom_parameters;
        event
    }
}

impl Default for MpEvent {
    fn default() -> Self {
        MpEvent::empty(MpEventType::AddToCart)
    }
}

/// Value of one user property on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPropertyPayload {
    /// Property value.
    pub value: Value,
}
