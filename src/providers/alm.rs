use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};

use super::{Tracker, TransportError};

pub struct AlmClient {
    client: reqwest::Client,
}

impl AlmClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for AlmClient {
    fn default() -> Self {
        Self::new()
    }
}

pub fn basic_auth(user: &str, password: &str) -> String {
    let creds = format!("{user}:{password}");
    let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
    format!("Basic {encoded}")
}

/// Collapse every `Set-Cookie` header into a single `Cookie` header value.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

async fn send(
    request: reqwest::RequestBuilder,
    action: &'static str,
) -> Result<reqwest::Response, TransportError> {
    let resp = request
        .send()
        .await
        .map_err(|source| TransportError::Request { action, source })?;

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let reason = status.canonical_reason().unwrap_or("Unknown");
    let body = resp.text().await.unwrap_or_default();
    let body = body.trim();
    let message = if body.is_empty() {
        reason.to_string()
    } else {
        format!("{reason} ({})", body.chars().take(200).collect::<String>())
    };
    Err(TransportError::Status {
        action,
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Tracker for AlmClient {
    async fn authenticate(&self, url: &str, user: &str, password: &str) -> Result<String> {
        let request = self
            .client
            .post(url)
            .header(AUTHORIZATION, basic_auth(user, password));
        let resp = send(request, "authenticating to HP ALM").await?;
        session_cookie(resp.headers()).context("HP ALM did not return a session cookie")
    }

    async fn get(&self, url: &str, cookie: &str) -> Result<String> {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/xml")
            .header("Accept-Charset", "UTF-8")
            .header(COOKIE, cookie);
        let resp = send(request, "retrieving data from HP ALM").await?;
        resp.text()
            .await
            .context("Failed to read HP ALM response body")
    }

    async fn put(&self, url: &str, body: &str, cookie: &str) -> Result<String> {
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/xml")
            .header(ACCEPT, "application/xml")
            .header(COOKIE, cookie)
            .body(body.to_string());
        let resp = send(request, "posting data to HP ALM").await?;
        resp.text()
            .await
            .context("Failed to read HP ALM response body")
    }
}
