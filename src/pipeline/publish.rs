use anyhow::{Context, Result};
use log::debug;

use crate::config::ConfluenceConfig;
use crate::providers::Wiki;
use crate::util::xmlrpc::Struct;

/// Insert `header + addition` right after the first occurrence of `keyword`,
/// or at the top of `content` when there is no keyword or it is not found.
pub fn splice(content: &str, keyword: Option<&str>, header: &str, addition: &str) -> String {
    let at = keyword
        .and_then(|k| content.find(k).map(|pos| pos + k.len()))
        .unwrap_or(0);
    let mut out = String::with_capacity(content.len() + header.len() + addition.len());
    out.push_str(&content[..at]);
    out.push_str(header);
    out.push_str(addition);
    out.push_str(&content[at..]);
    out
}

/// Read the configured page, splice `html` into it and write it back.
pub async fn publish(wiki: &dyn Wiki, cfg: &ConfluenceConfig, html: &str) -> Result<()> {
    let user = cfg.user.as_deref().context("No Confluence user configured")?;
    let password = cfg
        .password
        .as_deref()
        .context("No Confluence password configured")?;

    let token = wiki.login(user, password).await.context("Confluence login failed")?;

    let mut page = wiki
        .get_page(&token, &cfg.page_id)
        .await
        .with_context(|| format!("Could not read Confluence page {}", cfg.page_id))?;
    let current = page
        .content()
        .with_context(|| format!("Confluence page {} has no content", cfg.page_id))?;
    debug!("Current Confluence page: {current}");

    let content = splice(
        current,
        cfg.keyword.as_deref(),
        cfg.header.as_deref().unwrap_or_default(),
        html,
    );
    debug!("and the new content: {content}");
    page.set_content(content);

    wiki.update_page(&token, &page, &Struct::new())
        .await
        .with_context(|| format!("Could not write Confluence page {}", cfg.page_id))?;
    Ok(())
}
