use crate::{
    models::{Payload, ValidationMessage, ValidationResponse},
    Error,
};
use bytes::Bytes;
use http::{Request, Response, Uri};
use opentelemetry_http::HttpClient;

pub(crate) const VALIDATE_PATH: &str = "debug/mp/collect";
pub(crate) const COLLECT_PATH: &str = "mp/collect";
const VALIDATION_BEHAVIOR: &str = "ENFORCE_RECOMMENDATIONS";

/// Sends a payload to the debug endpoint and returns what it found wrong with it.
pub(crate) async fn validate<C: HttpClient + ?Sized>(
    client: &C,
    endpoint: &Uri,
    mut payload: Payload,
) -> Result<Vec<ValidationMessage>, Error> {
    payload.validation_behavior = Some(VALIDATION_BEHAVIOR);
    let response = post(client, endpoint, &payload).await?;
    handle_validation_response(response)
}

/// Sends a payload to the collect endpoint.
///
/// The collect endpoint does not report problems with the payload, so the response is returned
/// as is.
pub(crate) async fn send<C: HttpClient + ?Sized>(
    client: &C,
    endpoint: &Uri,
    payload: Payload,
) -> Result<Response<Bytes>, Error> {
    let response = post(client, endpoint, &payload).await?;
    if !response.status().is_success() {
        tracing::warn!(status = %response.status(), "collect request was not accepted");
    }
    Ok(response)
}

async fn post<C: HttpClient + ?Sized>(
    client: &C,
    endpoint: &Uri,
    payload: &Payload,
) -> Result<Response<Bytes>, Error> {
    let serialized = serde_json::to_vec(payload).map_err(Error::SerializeRequest)?;
    let request = Request::post(endpoint)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Bytes::from(serialized))
        .map_err(|err| Error::Connection(err.into()))?;

    tracing::debug!(
        path = endpoint.path(),
        events = payload.events.len(),
        "sending measurement protocol request"
    );
    // No retries. A failed request is reported to the caller.
    client
        .send_bytes(request)
        .await
        .map_err(Error::Connection)
}

fn handle_validation_response(response: Response<Bytes>) -> Result<Vec<ValidationMessage>, Error> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Request(format!(
            "{}: {}",
            status.as_u16(),
            String::from_utf8_lossy(response.body())
        )));
    }
    let content: ValidationResponse =
        serde_json::from_slice(response.body()).map_err(Error::DeserializeResponse)?;
    Ok(content.validation_messages)
}

/// Append a path and query to an endpoint, e.g. `https://host` + `mp/collect?a=b`.
pub(crate) fn append_path(uri: impl ToString, path: &str) -> Result<Uri, http::uri::InvalidUri> {
    format!("{}/{}", uri.to_string().trim_end_matches('/'), path).parse()
}
