use std::path::Path;

use anyhow::{Context, Result};

use crate::model::entity::Entity;
use crate::util::xml::escape;

/// Date format of the `release` element, e.g. `Tue Jun 10 02:24:16 CEST 2014`.
pub const RELEASE_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

fn attr(value: Option<&str>) -> String {
    escape(value.unwrap_or_default())
}

/// Render a maven-changes style `changes.xml` document.
pub fn render_changes(entities: &[Entity], version: &str, date: &str) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<document>\n<body>\n");
    xml.push_str(&format!(
        "<release version=\"{}\" date=\"{}\">\n",
        escape(version),
        escape(date)
    ));
    for entity in entities {
        xml.push_str(&format!(
            "<action dev=\"{}\" type=\"{}\" issue=\"{}\" due-to=\"{}\">\n",
            attr(entity.dev.as_deref()),
            entity.change_type.map(|c| c.as_str()).unwrap_or_default(),
            attr(entity.id.as_deref()),
            attr(entity.due_to.as_deref()),
        ));
        xml.push_str(&attr(entity.desc.as_deref()));
        xml.push_str("\n</action>\n");
    }
    xml.push_str("</release>\n</body>\n</document>\n");
    xml
}

/// Write `changes.xml` to `path`, stamped with the current local time.
pub fn write_changes(path: &Path, entities: &[Entity], version: &str) -> Result<()> {
    let date = chrono::Local::now().format(RELEASE_DATE_FORMAT).to_string();
    let xml = render_changes(entities, version, &date);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, xml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{ChangeType, Field};

    /// Drop the release date so documents from different runs compare equal.
    fn strip_date(xml: &str) -> String {
        let start = xml.find(" date=\"").unwrap();
        let end = start + 7 + xml[start + 7..].find('"').unwrap() + 1;
        format!("{}{}", &xml[..start], &xml[end..])
    }

    fn fixed_entity() -> Entity {
        let mut e = Entity::new("defect", vec![Field::new("id", "20574")]);
        e.id = Some("20574".into());
        e.dev = Some("msidor".into());
        e.desc = Some("Crash when saving <draft> & quitting".into());
        e.due_to = Some("QA".into());
        e.change_type = Some(ChangeType::Fix);
        e
    }

    #[test]
    fn renders_release_with_one_action_per_entity() {
        let xml = render_changes(&[fixed_entity()], "1.0.0", "Tue Jun 10 02:24:16 CEST 2014");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<document>\n<body>\n\
             <release version=\"1.0.0\" date=\"Tue Jun 10 02:24:16 CEST 2014\">\n\
             <action dev=\"msidor\" type=\"FIX\" issue=\"20574\" due-to=\"QA\">\n\
             Crash when saving &lt;draft&gt; &amp; quitting\n</action>\n\
             </release>\n</body>\n</document>\n"
        );
    }

    #[test]
    fn unset_caches_render_empty() {
        let entity = Entity::new("defect", vec![]);
        let xml = render_changes(&[entity], "1.0.0", "now");
        assert!(xml.contains("<action dev=\"\" type=\"\" issue=\"\" due-to=\"\">\n\n</action>"));
    }

    #[test]
    fn output_is_stable_once_date_is_stripped() {
        let entities = vec![fixed_entity(), Entity::new("defect", vec![])];
        let first = render_changes(&entities, "1.0.0", "Mon Jun 09 10:00:00 CEST 2014");
        let second = render_changes(&entities, "1.0.0", "Tue Jun 10 02:24:16 CEST 2014");
        assert_ne!(first, second);
        assert_eq!(strip_date(&first), strip_date(&second));
    }

    #[test]
    fn writes_file_and_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("changes.xml");

        write_changes(&path, &[fixed_entity()], "2.1").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(written.contains("<release version=\"2.1\" date=\""));
        assert!(written.contains("issue=\"20574\""));
        assert_eq!(
            strip_date(&written),
            strip_date(&render_changes(&[fixed_entity()], "2.1", "x"))
        );
    }
}
