use anyhow::{bail, Context, Result};
use log::debug;

use super::classify::Classifier;
use crate::config::AlmConfig;
use crate::model::entity::{Entity, Field};
use crate::providers::Tracker;
use crate::util::xml::parse_document;

pub const PAGE_SIZE: usize = 10;

pub fn page_url(alm: &AlmConfig, query: &str, start_index: usize) -> String {
    format!(
        "{}?page-size={PAGE_SIZE}&start-index={start_index}&query={{{query}}}",
        alm.defects_url()
    )
}

/// Decode an ALM `<Entities>` document.
pub fn parse_entities(xml: &str) -> Result<Vec<Entity>> {
    let root = parse_document(xml).context("Malformed HP ALM entity list")?;
    if root.name != "Entities" {
        let detail = root
            .child("Title")
            .map(|t| t.text.trim().to_string())
            .unwrap_or_default();
        bail!("Unexpected HP ALM response <{}> {detail}", root.name);
    }

    let entities: Vec<Entity> = root
        .children_named("Entity")
        .map(|entity| {
            let fields: Vec<Field> = entity
                .child("Fields")
                .map(|fields| {
                    fields
                        .children_named("Field")
                        .map(|field| {
                            let name = field.attribute("Name").unwrap_or_default();
                            // multi-value fields keep their first value
                            let value = field
                                .child("Value")
                                .map(|v| v.text.as_str())
                                .unwrap_or_default();
                            Field::new(name, value)
                        })
                        .collect()
                })
                .unwrap_or_default();
            Entity::new(entity.attribute("Type").unwrap_or_default(), fields)
        })
        .collect();
    Ok(entities)
}

/// Read every page of the query, classifying each defect as soon as its page is decoded.
///
/// Stops on the first page holding fewer than [`PAGE_SIZE`] entities. Any failing page
/// aborts the whole fetch.
pub async fn fetch_entities(
    tracker: &dyn Tracker,
    alm: &AlmConfig,
    query: &str,
    cookie: &str,
    classifier: &Classifier,
) -> Result<Vec<Entity>> {
    let mut entities = Vec::new();
    let mut start_index = 1;

    loop {
        let url = page_url(alm, query, start_index);
        debug!("Final HP ALM url: {url}");

        let body = tracker.get(&url, cookie).await?;
        let mut page = parse_entities(&body)
            .with_context(|| format!("Failed to decode page starting at {start_index}"))?;
        for entity in &mut page {
            classifier.classify(entity);
        }

        let page_len = page.len();
        entities.append(&mut page);
        if page_len < PAGE_SIZE {
            break;
        }
        start_index += PAGE_SIZE;
    }

    Ok(entities)
}
