use crate::models::{EventParameter, Parameter};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::fmt;

/// Parameters by name, in insertion order.
///
/// Serialized as a JSON object. Replacing an existing parameter keeps its position; new parameters
/// are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(Vec<(String, Parameter)>);

impl Parameters {
    /// Create an empty map.
    pub fn new() -> Self {
        Parameters(Vec::new())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a parameter with this name exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Get a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.position(name).map(|i| &self.0[i].1)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.position(name).map(move |i| &mut self.0[i].1)
    }

    /// Insert or replace a parameter. Returns the previous parameter with this name.
    pub fn insert(&mut self, name: impl Into<String>, parameter: Parameter) -> Option<Parameter> {
        let name = name.into();
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.0[i].1, parameter)),
            None => {
                self.0.push((name, parameter));
                None
            }
        }
    }

    /// Remove a parameter by name.
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.position(name).map(|i| self.0.remove(i).1)
    }

    /// Iterate over name and parameter pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into [`EventParameter`] records.
    pub fn to_event_parameters(&self) -> Vec<EventParameter> {
        self.iter()
            .map(|(name, parameter)| EventParameter {
                parameter_name: name.to_string(),
                parameter_value: parameter.value.clone(),
                parameter_type: parameter.parameter_type,
                required: parameter.required,
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|(k, _)| k == name)
    }
}

impl<K: Into<String>> FromIterator<(K, Parameter)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, Parameter)>>(iter: I) -> Self {
        let mut parameters = Parameters::new();
        for (name, parameter) in iter {
            parameters.insert(name, parameter);
        }
        parameters
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, parameter) in &self.0 {
            map.serialize_entry(name, parameter)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParametersVisitor;

        impl<'de> Visitor<'de> for ParametersVisitor {
            type Value = Parameters;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Parameters, A::Error> {
                let mut parameters = Parameters::new();
                while let Some((name, parameter)) = access.next_entry::<String, Parameter>()? {
                    parameters.insert(name, parameter);
                }
                Ok(parameters)
            }
        }

        deserializer.deserialize_map(ParametersVisitor)
    }
}
