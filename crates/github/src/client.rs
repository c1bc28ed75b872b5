//! Authenticated HTTP transport shared by every adapter in this crate.
//!
//! Owns request construction, status classification (including rate-limit
//! detection), JSON decoding, `Link` pagination and GraphQL envelopes.

use std::time::Duration;

use alerts::TrackerError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The client could not be constructed.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The token contains characters that are not valid in an HTTP header.
    #[error("GitHub token is not a valid header value")]
    InvalidToken,

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// One authenticated connection to the GitHub API.
///
/// Immutable once built; each adapter owns its own client so that every API
/// family can use a different token.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

/// A decoded response body plus the URL of the next page, if any.
#[derive(Debug)]
pub(crate) struct Page<T> {
    pub(crate) value: T,
    pub(crate) next: Option<String>,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GithubClient {
    /// Creates a client for the public GitHub API.
    pub fn new(token: &str) -> Result<Self, ClientError> {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Creates a client for a custom API base URL (GitHub Enterprise, tests).
    ///
    /// The GraphQL endpoint is `<api_url>/graphql`.
    pub fn with_api_url(token: &str, api_url: impl Into<String>) -> Result<Self, ClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ClientError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("dependaboat/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns an absolute URL for an API path such as `/repos/o/r/issues`.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url)
    }

    /// Sends a request and decodes a successful JSON response.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Page<T>, TrackerError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport)?;

        if !status.is_success() {
            return Err(classify_failure(status, &headers, &body));
        }

        let value = serde_json::from_slice(&body).map_err(|e| TrackerError::Decode {
            message: e.to_string(),
        })?;
        Ok(Page {
            value,
            next: next_link(&headers),
        })
    }

    /// Executes a GraphQL query or mutation and returns its `data`.
    pub(crate) async fn graphql<V: Serialize, R: DeserializeOwned>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<R, TrackerError> {
        let request = self
            .post(&self.url("/graphql"))
            .json(&GraphQlRequest { query, variables });
        let response: GraphQlResponse<R> = self.send(request).await?.value;

        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            if errors
                .iter()
                .any(|e| e.kind.as_deref() == Some("RATE_LIMITED"))
            {
                return Err(TrackerError::RateLimited { after: None });
            }
            let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(TrackerError::GraphQl {
                messages: messages.join(", "),
            });
        }

        response.data.ok_or_else(|| TrackerError::Decode {
            message: "GraphQL response has no data".into(),
        })
    }
}

fn transport(error: reqwest::Error) -> TrackerError {
    TrackerError::Transport {
        message: error.to_string(),
    }
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// Maps a non-success response to a [`TrackerError`].
///
/// GitHub signals primary rate limits with `403`/`429` and
/// `x-ratelimit-remaining: 0`, and secondary rate limits with `403`/`429`
/// plus a `retry-after` header or a "rate limit" message.
pub(crate) fn classify_failure(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> TrackerError {
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());

    let retry_after = header(headers, "retry-after")
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs);
    let exhausted = header(headers, "x-ratelimit-remaining") == Some("0");
    let mentions_limit = message.to_ascii_lowercase().contains("rate limit");

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && (exhausted || retry_after.is_some() || mentions_limit));

    if rate_limited {
        let after = retry_after.or_else(|| reset_delay(headers));
        debug!(status = status.as_u16(), ?after, "GitHub rate limit response");
        return TrackerError::RateLimited { after };
    }

    if status == StatusCode::NOT_FOUND {
        return TrackerError::NotFound { what: message };
    }

    TrackerError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Time until `x-ratelimit-reset` (epoch seconds), if the header is present.
fn reset_delay(headers: &HeaderMap) -> Option<Duration> {
    let reset = header(headers, "x-ratelimit-reset")?.parse::<i64>().ok()?;
    let now = chrono::Utc::now().timestamp();
    #[allow(clippy::cast_sign_loss)]
    let secs = (reset - now).max(0) as u64;
    Some(Duration::from_secs(secs))
}

/// Extracts the `rel="next"` URL from a `Link` header.
pub(crate) fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        params
            .split(';')
            .any(|p| p.trim() == r#"rel="next""#)
            .then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn exhausted_quota_is_a_rate_limit() {
        let err = classify_failure(
            StatusCode::FORBIDDEN,
            &headers(&[("x-ratelimit-remaining", "0")]),
            br#"{"message":"API rate limit exceeded for user"}"#,
        );
        assert!(matches!(err, TrackerError::RateLimited { .. }));
    }

    #[test]
    fn retry_after_is_used_as_hint() {
        let err = classify_failure(
            StatusCode::TOO_MANY_REQUESTS,
            &headers(&[("retry-after", "30")]),
            b"",
        );
        assert_eq!(
            err,
            TrackerError::RateLimited {
                after: Some(Duration::from_secs(30))
            }
        );
    }

    #[test]
    fn secondary_limit_is_detected_from_message() {
        let err = classify_failure(
            StatusCode::FORBIDDEN,
            &HeaderMap::new(),
            br#"{"message":"You have exceeded a secondary rate limit."}"#,
        );
        assert!(matches!(err, TrackerError::RateLimited { after: None }));
    }

    #[test]
    fn plain_forbidden_is_an_api_error() {
        let err = classify_failure(
            StatusCode::FORBIDDEN,
            &headers(&[("x-ratelimit-remaining", "4999")]),
            br#"{"message":"Resource not accessible by integration"}"#,
        );
        assert_eq!(
            err,
            TrackerError::Api {
                status: 403,
                message: "Resource not accessible by integration".into()
            }
        );
    }

    #[test]
    fn not_found_keeps_message() {
        let err = classify_failure(StatusCode::NOT_FOUND, &HeaderMap::new(), br#"{"message":"Not Found"}"#);
        assert_eq!(err, TrackerError::NotFound { what: "Not Found".into() });
    }

    #[test]
    fn next_link_is_extracted() {
        let map = headers(&[(
            "link",
            r#"<https://api.github.com/x?page=1>; rel="prev", <https://api.github.com/x?after=abc>; rel="next""#,
        )]);
        assert_eq!(
            next_link(&map).as_deref(),
            Some("https://api.github.com/x?after=abc")
        );
        assert_eq!(next_link(&HeaderMap::new()), None);
    }
}
