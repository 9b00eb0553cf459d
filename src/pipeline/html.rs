use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::entity::Entity;

const NBSP: &str = "&nbsp;";

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("No export columns configured")]
    NoColumns,
}

fn cell(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NBSP,
    }
}

/// Render the defects as a Confluence-ready HTML table.
///
/// Field values go in verbatim: ALM memo fields already hold HTML.
pub fn render_table(
    entities: &[Entity],
    columns: &[String],
    translations: &BTreeMap<String, String>,
) -> Result<String, RenderError> {
    if columns.is_empty() {
        return Err(RenderError::NoColumns);
    }

    let mut html = String::from("<table><tbody><tr>");
    for column in columns {
        let title = translations.get(column).map(String::as_str).unwrap_or(column.as_str());
        html.push_str(&format!("<th>{}</th>", cell(Some(title))));
    }
    html.push_str("</tr>");

    for entity in entities {
        html.push_str("<tr>");
        for column in columns {
            html.push_str(&format!("<td>{}</td>", cell(entity.field(column))));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    Ok(html)
}
