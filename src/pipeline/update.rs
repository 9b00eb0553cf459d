use anyhow::{Context, Result};
use log::debug;

use crate::config::{AlmConfig, FieldValues};
use crate::model::entity::Entity;
use crate::providers::Tracker;
use crate::util::xml::escape;

/// The ALM update document carrying `values`, shared by every defect.
pub fn update_statement(values: &FieldValues) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><Entity Type="defect"><Fields>"#,
    );
    for (name, value) in values {
        xml.push_str(&format!(
            r#"<Field Name="{}"><Value>{}</Value></Field>"#,
            escape(name),
            escape(value)
        ));
    }
    xml.push_str("</Fields></Entity>");
    xml
}

pub fn entity_url(alm: &AlmConfig, id: &str) -> String {
    format!("{}/{}", alm.defects_url(), urlencoding::encode(id))
}

/// PUT the same field values onto every fetched defect, stopping at the first failure.
pub async fn update_entities(
    tracker: &dyn Tracker,
    alm: &AlmConfig,
    cookie: &str,
    entities: &[Entity],
    values: &FieldValues,
) -> Result<usize> {
    let xml = update_statement(values);
    debug!("Update statement: {xml}");

    for (index, entity) in entities.iter().enumerate() {
        let id = entity
            .id
            .as_deref()
            .with_context(|| format!("Defect #{} has no id field", index + 1))?;
        tracker
            .put(&entity_url(alm, id), &xml, cookie)
            .await
            .with_context(|| format!("Could not update defect {id}"))?;
    }
    Ok(entities.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::providers::tests::ReplayTracker;

    fn alm() -> AlmConfig {
        parse_config("[alm]\nurl = \"http://alm\"\ndomain = \"DEP1\"\nproject = \"P\"\n")
            .unwrap()
            .alm
    }

    fn with_id(id: &str) -> Entity {
        let mut e = Entity::new("defect", vec![]);
        e.id = Some(id.into());
        e
    }

    fn values() -> FieldValues {
        FieldValues::from([
            ("status".to_string(), "Closed".to_string()),
            ("comments".to_string(), "Released in 1.0 & up".to_string()),
        ])
    }

    #[test]
    fn statement_lists_every_value() {
        assert_eq!(
            update_statement(&values()),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><Entity Type="defect"><Fields><Field Name="comments"><Value>Released in 1.0 &amp; up</Value></Field><Field Name="status"><Value>Closed</Value></Field></Fields></Entity>"#
        );
    }

    #[tokio::test]
    async fn puts_once_per_entity() {
        let tracker = ReplayTracker::new("cookie");
        let entities = vec![with_id("1"), with_id("2")];

        let updated = update_entities(&tracker, &alm(), "cookie", &entities, &values())
            .await
            .unwrap();

        assert_eq!(updated, 2);
        let puts = tracker.puts();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].0, "http://alm/qcbin/rest/domains/DEP1/projects/P/defects/1");
        assert_eq!(puts[1].0, "http://alm/qcbin/rest/domains/DEP1/projects/P/defects/2");
        assert_eq!(puts[0].1, puts[1].1);
    }

    #[tokio::test]
    async fn entity_without_id_fails() {
        let tracker = ReplayTracker::new("cookie");
        let entities = vec![Entity::new("defect", vec![])];
        let err = update_entities(&tracker, &alm(), "cookie", &entities, &values())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no id"));
        assert!(tracker.puts().is_empty());
    }

    #[tokio::test]
    async fn stops_at_first_failed_put() {
        let alm = alm();
        let tracker = ReplayTracker::new("cookie").failing_on(&entity_url(&alm, "1"));
        let entities = vec![with_id("1"), with_id("2")];

        let result = update_entities(&tracker, &alm, "cookie", &entities, &values()).await;

        assert!(result.is_err());
        assert_eq!(tracker.puts().len(), 1);
    }
}
