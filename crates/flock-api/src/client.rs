// Async HTTP client for the membership service's list endpoints.
//
// Every list resource (`members`, `fellowships`, `volunteer-opportunities`)
// answers `GET /{resource}?rangeStart=&rangeEnd=&...` with
// `{ "results": [...], "total": n }`.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::query::{ListQuery, ListResponse};
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    capability: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the list endpoints.
///
/// Cheap to clone: `reqwest::Client` is reference-counted internally.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, transport config, and optional bearer token.
    ///
    /// The token is injected as a sensitive `Authorization` default header.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        token: Option<&SecretString>,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::InvalidHeader(format!("invalid token header value: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = transport.build_client(headers)?;
        Self::with_client(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends in `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Public API ───────────────────────────────────────────────────

    /// Fetch one window of a list resource.
    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &ListQuery,
    ) -> Result<ListResponse<T>, Error> {
        let url = self.base_url.join(resource)?;
        let params = query.to_pairs();
        debug!(
            %url,
            range_start = query.range_start,
            range_end = query.range_end,
            "GET list window"
        );

        let resp = self.http.get(url).query(&params).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthenticated;
        }

        let path = resp.url().path().to_owned();
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();

        match status {
            reqwest::StatusCode::FORBIDDEN => Error::PermissionDenied {
                capability: parsed.and_then(|e| e.capability).unwrap_or_default(),
            },
            reqwest::StatusCode::NOT_FOUND => Error::NotFound { path },
            _ => Error::Server {
                status: status.as_u16(),
                message: parsed
                    .and_then(|e| e.message)
                    .or_else(|| (!raw.is_empty()).then_some(raw))
                    .unwrap_or_else(|| status.to_string()),
            },
        }
    }
}
