pub mod alm;
pub mod confluence;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppConfig;
use crate::model::page::Page;
use crate::util::xmlrpc::Struct;

/// HP ALM REST access. URLs are absolute; the cookie comes from `authenticate`.
#[async_trait]
pub trait Tracker: Send + Sync {
    async fn authenticate(&self, url: &str, user: &str, password: &str) -> Result<String>;
    async fn get(&self, url: &str, cookie: &str) -> Result<String>;
    async fn put(&self, url: &str, body: &str, cookie: &str) -> Result<String>;
}

/// Confluence remote API access.
#[async_trait]
pub trait Wiki: Send + Sync {
    async fn login(&self, user: &str, password: &str) -> Result<String>;
    async fn get_page(&self, token: &str, page_id: &str) -> Result<Page>;
    async fn update_page(&self, token: &str, page: &Page, options: &Struct) -> Result<Page>;
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Error occurred while {action}: Response code: {status}; Response message: {message}")]
    Status {
        action: &'static str,
        status: u16,
        message: String,
    },
    #[error("Error occurred while {action}: {source}")]
    Request {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

pub struct Clients {
    pub tracker: Box<dyn Tracker>,
    pub wiki: Option<Box<dyn Wiki>>,
}


pub fn create_clients(config: &AppConfig) -> Clients {
    let tracker: Box<dyn Tracker> = Box::new(alm::AlmClient::new());
    let wiki = config.confluence.as_ref().map(|cfg| {
        Box::new(confluence::ConfluenceClient::new(cfg.rpc_url())) as Box<dyn Wiki>
    });
    Clients { tracker, wiki }
}
