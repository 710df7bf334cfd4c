//! The one place requests are sent and responses interpreted.
//!
//! Every manager goes through [`GreengrocerClient::request`]: JSON in, JSON
//! out, success decided by status and content type together, and the
//! server's `error` message surfaced on failure.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use greengrocer_core::api::ErrorResponse;

use crate::GreengrocerClient;
use crate::error::{ClientError, REQUEST_FAILED, Result};

const APPLICATION_JSON: &str = "application/json";

/// Everything about a request except its endpoint.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Overrides the default headers of the same name.
    pub headers: HeaderMap,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}

/// Default JSON headers with `overrides` replacing same-named defaults.
#[must_use]
pub fn merge_headers(overrides: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

    for name in overrides.keys() {
        headers.remove(name);
        for value in overrides.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(APPLICATION_JSON))
}

/// Turn a status, content type and body into a decoded value or an error.
///
/// # Errors
///
/// - [`ClientError::Server`] for any non-2xx status, with the body's `error`
///   message when the body is JSON that has one
/// - [`ClientError::UnexpectedContentType`] for a 2xx that is not JSON
/// - [`ClientError::Decode`] when a JSON body has the wrong shape
pub fn interpret_response<T: DeserializeOwned>(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<T> {
    let json = is_json(content_type);

    if status.is_success() {
        if !json {
            return Err(ClientError::UnexpectedContentType {
                status: status.as_u16(),
                content_type: content_type.unwrap_or_default().to_string(),
            });
        }
        return Ok(serde_json::from_slice(body)?);
    }

    let message = json
        .then(|| serde_json::from_slice::<ErrorResponse>(body).ok())
        .flatten()
        .map_or_else(|| REQUEST_FAILED.to_string(), |e| e.error);
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

impl GreengrocerClient {
    /// Send one request to `endpoint` under the API root.
    ///
    /// Failures are logged here once; callers only propagate them.
    ///
    /// # Errors
    ///
    /// See [`interpret_response`]; transport failures are
    /// [`ClientError::Http`].
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let result = self.send(endpoint, options).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, status = ?e.status(), "API request failed");
        }
        result
    }

    async fn send<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T> {
        let mut url = self.api_url(endpoint)?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&options.query);
        }

        let mut request = self
            .http()
            .request(options.method, url)
            .headers(merge_headers(&options.headers));
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        interpret_response(status, content_type.as_deref(), &body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_caller_headers_replace_defaults() {
        let mut overrides = HeaderMap::new();
        overrides.insert(ACCEPT, HeaderValue::from_static("text/plain"));
        overrides.insert("x-trace", HeaderValue::from_static("abc"));

        let headers = merge_headers(&overrides);
        assert_eq!(headers[CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(headers[ACCEPT], "text/plain");
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
        assert_eq!(headers["x-trace"], "abc");
    }

    #[test]
    fn test_json_success_is_decoded() {
        let value: Value = interpret_response(
            StatusCode::OK,
            Some("application/json; charset=utf-8"),
            br#"{"message":"ok"}"#,
        )
        .unwrap();
        assert_eq!(value, json!({"message": "ok"}));
    }

    #[test]
    fn test_success_without_json_is_an_error() {
        let err = interpret_response::<Value>(StatusCode::OK, Some("text/html"), b"<p>hi</p>")
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::UnexpectedContentType { status: 200, ref content_type } if content_type == "text/html"
        ));
    }

    #[test]
    fn test_server_message_is_surfaced() {
        let err = interpret_response::<Value>(
            StatusCode::BAD_REQUEST,
            Some("application/json"),
            br#"{"error":"Only 2 left in stock"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Only 2 left in stock");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_failure_without_message_uses_fallback() {
        let err = interpret_response::<Value>(StatusCode::BAD_GATEWAY, Some("text/html"), b"oops")
            .unwrap_err();
        assert_eq!(err.to_string(), REQUEST_FAILED);

        let err = interpret_response::<Value>(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some("application/json"),
            br#"{"detail":"nope"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), REQUEST_FAILED);
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let err = interpret_response::<ErrorResponse>(
            StatusCode::OK,
            Some("application/json"),
            br#"{"message":"ok"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_query_helpers() {
        let options = RequestOptions::get().with_query("featured", "true");
        assert_eq!(options.method, Method::GET);
        assert_eq!(options.query, vec![("featured", "true".to_string())]);
    }
}
