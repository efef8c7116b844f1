use crate::models::InstanceId;
use std::{borrow::Cow, collections::HashMap, convert::TryInto, str::FromStr};

pub(crate) const DEFAULT_ENDPOINT: &str = "https://www.google-analytics.com";
const FIELDS_SEPARATOR: char = ';';
const FIELD_KEY_VALUE_SEPARATOR: char = '=';

/// Stream and credentials, e.g.
/// `MeasurementId=G-XXXXXXXX;ApiSecret=secret;Endpoint=https://region1.google-analytics.com`.
#[derive(Debug)]
pub(crate) struct ConnectionString {
    pub(crate) endpoint: http::Uri,
    pub(crate) instance_id: InstanceId,
    pub(crate) api_secret: String,
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ParseError {
    #[error("invalid format")]
    InvalidFormat,
    #[error("missing api secret")]
    MissingApiSecret,
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(http::uri::InvalidUri),
}

impl FromStr for ConnectionString {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result: HashMap<String, String> = s
            .split(FIELDS_SEPARATOR)
            .filter(|kv| !kv.trim().is_empty())
            .map(|kv| {
                let parts: Vec<&str> = kv.split(FIELD_KEY_VALUE_SEPARATOR).collect();
                if parts.len() == 2 {
                    Ok((parts[0].trim().to_lowercase(), parts[1].trim().to_string()))
                } else {
                    Err(ParseError::InvalidFormat)
                }
            })
            .collect::<Result<_, _>>()?;

        let endpoint = match result.remove("endpoint") {
            Some(endpoint) => sanitize_url(endpoint)?,
            None => http::Uri::from_static(DEFAULT_ENDPOINT),
        };

        let api_secret = result
            .remove("apisecret")
            .filter(|secret| !secret.is_empty())
            .ok_or(ParseError::MissingApiSecret)?;

        Ok(ConnectionString {
            endpoint,
            instance_id: InstanceId {
                measurement_id: result.remove("measurementid"),
                firebase_app_id: result.remove("firebaseappid"),
            },
            api_secret,
        })
    }
}

pub(crate) fn sanitize_url(url: String) -> Result<http::Uri, ParseError> {
    let mut new_url: Cow<str> = url.trim().into();
    if !new_url.starts_with("https://") {
        new_url = new_url.replace("http://", "https://").into();
    }

    new_url
        .trim_end_matches('/')
        .try_into()
        .map_err(ParseError::InvalidEndpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;
    use test_case::test_case;

    #[test_case(
        "MeasurementId=G-123;ApiSecret=secret",
        DEFAULT_ENDPOINT, Some("G-123"), None, "secret" ; "measurement id")]
    #[test_case(
        "FirebaseAppId=1:23:android:45;ApiSecret=secret",
        DEFAULT_ENDPOINT, None, Some("1:23:android:45"), "secret" ; "firebase app id")]
    #[test_case(
        "measurementid=G-123;APISECRET=secret;",
        DEFAULT_ENDPOINT, Some("G-123"), None, "secret" ; "case insensitive keys and trailing separator")]
    #[test_case(
        "MeasurementId=G-123;ApiSecret=secret;Endpoint= http://region1.google-analytics.com/  ",
        "https://region1.google-analytics.com", Some("G-123"), None, "secret" ; "sanitize url")]
    #[test_case(
        "Foo=1;ApiSecret=secret;Bar=2",
        DEFAULT_ENDPOINT, None, None, "secret" ; "ignore unknown fields")]
    fn parse_succeeds(
        connection_string: &'static str,
        expected_endpoint: &'static str,
        expected_measurement_id: Option<&'static str>,
        expected_firebase_app_id: Option<&'static str>,
        expected_api_secret: &'static str,
    ) {
        let result: ConnectionString = connection_string.parse().unwrap();
        assert_eq!(
            http::Uri::try_from(expected_endpoint).unwrap(),
            result.endpoint
        );
        assert_eq!(
            expected_measurement_id.map(String::from),
            result.instance_id.measurement_id
        );
        assert_eq!(
            expected_firebase_app_id.map(String::from),
            result.instance_id.firebase_app_id
        );
        assert_eq!(expected_api_secret, result.api_secret);
    }

    #[test_case("MeasurementId=G-123;NoValue" ; "field without value")]
    #[test_case("ApiSecret=a=b" ; "2 equals signs")]
    #[test_case("MeasurementId=G-123" ; "no api secret")]
    #[test_case("MeasurementId=G-123;ApiSecret=" ; "empty api secret")]
    #[test_case("ApiSecret=secret;Endpoint=ftp:/foo" ; "invalid endpoint uri")]
    fn parse_fails(connection_string: &'static str) {
        connection_string.parse::<ConnectionString>().unwrap_err();
    }
}
