use crate::{
    connection_string::{sanitize_url, ConnectionString, DEFAULT_ENDPOINT},
    models::{instance_query_param_for, payload_for, ClientIds, InstanceId, MpEvent, UserProperty, ValidationMessage},
    uploader::{self, append_path, COLLECT_PATH, VALIDATE_PATH},
    Error,
};
use bytes::Bytes;
use opentelemetry_http::HttpClient;
use std::{error::Error as StdError, fmt::Debug, sync::Arc};

/// Environment variable read by [`new_client_from_env`].
pub const CONNECTION_STRING_ENV: &str = "GA_MP_CONNECTION_STRING";

/// Measurement Protocol client for one stream.
#[derive(Clone)]
pub struct Client<C> {
    pub(crate) client: Arc<C>,
    pub(crate) endpoint: Arc<http::Uri>,
    pub(crate) instance_id: InstanceId,
    pub(crate) api_secret: String,
}

impl<C: Debug> Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("client", &self.client)
            .field("endpoint", &self.endpoint)
            .field("instance_id", &self.instance_id)
            .finish_non_exhaustive()
    }
}

/// Create a new client.
///
/// See [`Client`] for the connection string format.
pub fn new_client_from_connection_string<C: HttpClient + 'static>(
    connection_string: impl AsRef<str>,
    client: C,
) -> Result<Client<C>, Box<dyn StdError + Send + Sync + 'static>> {
    let connection_string: ConnectionString = connection_string.as_ref().parse()?;
    Ok(Client {
        client: Arc::new(client),
        endpoint: Arc::new(connection_string.endpoint),
        instance_id: connection_string.instance_id,
        api_secret: connection_string.api_secret,
    })
}

/// Create a new client.
///
/// Reads the connection string from the `GA_MP_CONNECTION_STRING` environment variable.
pub fn new_client_from_env<C: HttpClient + 'static>(
    client: C,
) -> Result<Client<C>, Box<dyn StdError + Send + Sync + 'static>> {
    let connection_string = std::env::var(CONNECTION_STRING_ENV)?;
    new_client_from_connection_string(connection_string, client)
}

impl<C> Client<C> {
    /// Create a client for the default endpoint.
    pub fn new(instance_id: InstanceId, api_secret: impl Into<String>, client: C) -> Self {
        Client {
            client: Arc::new(client),
            endpoint: Arc::new(http::Uri::from_static(DEFAULT_ENDPOINT)),
            instance_id,
            api_secret: api_secret.into(),
        }
    }

    /// Set the stream that receives events.
    pub fn with_instance_id(mut self, instance_id: InstanceId) -> Self {
        self.instance_id = instance_id;
        self
    }

    /// Set the Measurement Protocol API secret of the stream.
    pub fn with_api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = api_secret.into();
        self
    }

    /// Send requests to a different host, e.g. `https://region1.google-analytics.com` to keep
    /// data collection in the EU.
    ///
    /// `http://` is upgraded to `https://` and a trailing slash is removed.
    pub fn with_endpoint(
        mut self,
        endpoint: impl Into<String>,
    ) -> Result<Self, Box<dyn StdError + Send + Sync + 'static>> {
        self.endpoint = Arc::new(sanitize_url(endpoint.into())?);
        Ok(self)
    }

    /// The stream that receives events.
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn endpoint_for(&self, path: &str) -> Result<http::Uri, Error> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("api_secret", &self.api_secret)
            .finish();
        append_path(
            self.endpoint.as_ref(),
            &format!(
                "{}?{}&{}",
                path,
                instance_query_param_for(&self.instance_id),
                query
            ),
        )
        .map_err(Error::InvalidUri)
    }
}

impl<C: HttpClient + 'static> Client<C> {
    /// Validate events with the debug endpoint.
    ///
    /// Returns the validation messages reported by GA. An empty list means the events are valid.
    /// Transport failures, error statuses and malformed responses are returned as errors.
    pub async fn validate_hit(
        &self,
        client_ids: &ClientIds,
        events: &[MpEvent],
        user_properties: &[UserProperty],
    ) -> Result<Vec<ValidationMessage>, Error> {
        let endpoint = self.endpoint_for(VALIDATE_PATH)?;
        let payload = payload_for(events, client_ids, user_properties);
        uploader::validate(self.client.as_ref(), &endpoint, payload).await
    }

    /// Send events to GA.
    ///
    /// GA accepts any well formed request on this endpoint, so the response is returned for the
    /// caller to inspect. Use [`Client::validate_hit`] to find problems with the events.
    pub async fn send_event(
        &self,
        client_ids: &ClientIds,
        events: &[MpEvent],
        user_properties: &[UserProperty],
    ) -> Result<http::Response<Bytes>, Error> {
        let endpoint = self.endpoint_for(COLLECT_PATH)?;
        let payload = payload_for(events, client_ids, user_properties);
        uploader::send(self.client.as_ref(), &endpoint, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NoClient;

    fn client() -> Client<NoClient> {
        Client::new(
            InstanceId {
                measurement_id: Some("G-123".into()),
                firebase_app_id: None,
            },
            "s3cr3t",
            NoClient,
        )
    }

    #[test]
    fn endpoints() {
        let client = client();
        assert_eq!(
            "https://www.google-analytics.com/debug/mp/collect?measurement_id=G-123&api_secret=s3cr3t",
            client.endpoint_for(VALIDATE_PATH).unwrap().to_string()
        );
        assert_eq!(
            "https://www.google-analytics.com/mp/collect?measurement_id=G-123&api_secret=s3cr3t",
            client.endpoint_for(COLLECT_PATH).unwrap().to_string()
        );
    }

    #[test]
    fn custom_endpoint() {
        let client = client()
            .with_endpoint("http://region1.google-analytics.com/")
            .unwrap()
            .with_api_secret("a b");
        assert_eq!(
            "https://region1.google-analytics.com/mp/collect?measurement_id=G-123&api_secret=a+b",
            client.endpoint_for(COLLECT_PATH).unwrap().to_string()
        );
    }

    #[test]
    fn oversized_endpoint() {
        let client = client().with_api_secret("x".repeat(70_000));
        assert!(matches!(
            client.endpoint_for(COLLECT_PATH),
            Err(Error::InvalidUri(_))
        ));
    }

    #[test]
    fn debug_hides_api_secret() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("s3cr3t"));
    }
}
