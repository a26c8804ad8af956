//! Low-level JSON client for one ERP service namespace.
//!
//! One [`HttpClient`] is bound to a single service base URL (academics,
//! exams, or students namespace). It attaches JSON headers and a bearer
//! token resolved per request from the injected [`TokenSource`], issues the
//! request, and normalizes the response:
//!
//! - 2xx parses JSON, tolerating empty bodies and 204 as `null`;
//! - 404 becomes [`HttpError::NotFound`], which [`HttpClient::list`]
//!   downgrades to an empty page (many backend routes are optional and a
//!   missing list endpoint must not break consumers);
//! - other non-2xx statuses become [`HttpError::Api`] with the parsed
//!   error body attached.
//!
//! There is no automatic retry and no request cancellation: a failed
//! request surfaces to the operator, who retries by re-running the command.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::TokenSource;

use super::error::{ErrorBody, HttpError};
use super::query::Query;
use super::types::Page;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct HttpClient {
    base_url: Url,
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl HttpClient {
    pub fn new(base_url: Url, tokens: Arc<dyn TokenSource>) -> Result<Self, HttpError> {
        Self::with_config(base_url, tokens, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_config(
        base_url: Url,
        tokens: Arc<dyn TokenSource>,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            client,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET returning the parsed JSON body. 404 is an error here; use
    /// [`HttpClient::list`] for endpoints where absence should read as empty.
    pub async fn get(&self, path: &str, query: &Query) -> Result<Value, HttpError> {
        self.send_request(Method::GET, path, query, None, &[]).await
    }

    /// GET for a list endpoint, coercing any known response shape into a
    /// [`Page`] and substituting an empty page when the route 404s.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<Page<T>, HttpError> {
        match self.get(path, query).await {
            Ok(value) => Ok(Page::from_value(value)?),
            Err(err) if err.is_not_found() => {
                warn!(path = path; "List endpoint not deployed, returning empty page");
                Ok(Page::empty())
            },
            Err(err) => Err(err),
        }
    }

    /// GET returning a typed single record. 404 surfaces as an error: for a
    /// concrete id it means the record does not exist.
    pub async fn retrieve<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<T, HttpError> {
        let value = self.get(path, query).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, HttpError> {
        self.send_request(Method::POST, path, &Query::new(), body, &[]).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, HttpError> {
        self.send_request(Method::PUT, path, &Query::new(), Some(body), &[]).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, HttpError> {
        self.send_request(Method::PATCH, path, &Query::new(), Some(body), &[]).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, HttpError> {
        self.send_request(Method::DELETE, path, &Query::new(), None, &[]).await
    }

    /// GET returning the raw response bytes, for binary downloads (hall
    /// ticket PDFs). The body is not interpreted as JSON.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, HttpError> {
        let url = self.build_url(path, &Query::new())?;
        let mut req = self.client.get(url.clone());
        if let Some(token) = self.tokens.token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HttpError::NotFound { path: path.to_string() });
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(HttpError::Api {
                status: status.as_u16(),
                body: ErrorBody::parse(&text),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }

    /// Issues a request with full control over method, query, body, and
    /// extra headers. Caller-supplied headers win over the defaults.
    pub async fn send_request(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Result<Value, HttpError> {
        let url = self.build_url(path, query)?;
        debug!(method:% = method, url:% = url; "ERP API request");

        let mut header_map = HeaderMap::new();
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.token() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| HttpError::InvalidHeader { name: "authorization".to_string() })?;
            header_map.insert(AUTHORIZATION, value);
        }
        // Caller headers replace the defaults rather than appending a
        // second value for the same name.
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HttpError::InvalidHeader { name: (*name).to_string() })?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| HttpError::InvalidHeader { name: name.to_string() })?;
            header_map.insert(name, value);
        }

        let mut req = self.client.request(method, url).headers(header_map);
        if let Some(body) = body {
            req = req.body(serde_json::to_string(body)?);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HttpError::NotFound { path: path.to_string() });
        }
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(HttpError::Api {
                status: status.as_u16(),
                body: ErrorBody::parse(&text),
            });
        }

        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn build_url(&self, path: &str, query: &Query) -> Result<Url, HttpError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}{}", base, path, query.encode()))?)
    }
}
