use thiserror::Error;

use crate::config::FieldValues;

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Neither a query statement nor query values are configured")]
    Missing,
}

/// Return the explicit statement, or build one as `key[%22value%22]` pairs joined by `;`.
pub fn build_query(
    statement: Option<&str>,
    values: Option<&FieldValues>,
) -> Result<String, QueryError> {
    if let Some(statement) = statement {
        return Ok(statement.to_string());
    }

    let values = values.filter(|v| !v.is_empty()).ok_or(QueryError::Missing)?;
    let query = values
        .iter()
        .map(|(key, value)| {
            // urlencoding already writes spaces as %20, which ALM needs (it does not read `+`)
            format!(
                "{}[%22{}%22]",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join(";");
    Ok(query)
}
