use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::{TransportError, Wiki};
use crate::model::page::Page;
use crate::util::xmlrpc::{self, Struct, Value};

/// Confluence XML-RPC client (`confluence2.*` API).
pub struct ConfluenceClient {
    rpc_url: String,
    client: reqwest::Client,
}

impl ConfluenceClient {
    pub fn new(rpc_url: String) -> Self {
        Self {
            rpc_url,
            client: reqwest::Client::new(),
        }
    }

    async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        let body = xmlrpc::method_call(method, params);
        let resp = self
            .client
            .post(&self.rpc_url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                action: "calling Confluence",
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                action: "calling Confluence",
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
            .into());
        }

        let text = resp
            .text()
            .await
            .context("Failed to read Confluence response body")?;
        xmlrpc::parse_response(&text).with_context(|| format!("{method} failed"))
    }
}

#[async_trait]
impl Wiki for ConfluenceClient {
    async fn login(&self, user: &str, password: &str) -> Result<String> {
        let token = self
            .call("confluence2.login", &[user.into(), password.into()])
            .await?;
        token
            .as_str()
            .map(String::from)
            .context("confluence2.login did not return a token")
    }

    async fn get_page(&self, token: &str, page_id: &str) -> Result<Page> {
        let page = self
            .call("confluence2.getPage", &[token.into(), page_id.into()])
            .await?;
        Page::from_value(page)
    }

    async fn update_page(&self, token: &str, page: &Page, options: &Struct) -> Result<Page> {
        let updated = self
            .call(
                "confluence2.updatePage",
                &[
                    token.into(),
                    page.to_value(),
                    Value::Struct(options.clone()),
                ],
            )
            .await?;
        Page::from_value(updated)
    }
}
