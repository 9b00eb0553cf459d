use anyhow::{Context, Result};

use crate::util::xmlrpc::{Struct, Value};

/// A Confluence page as exchanged over XML-RPC. Only `content` is interpreted;
/// every other attribute is sent back untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub attributes: Struct,
}

impl Page {
    pub fn from_value(value: Value) -> Result<Self> {
        let attributes = value
            .into_struct()
            .context("Confluence returned a page that is not a struct")?;
        Ok(Self { attributes })
    }

    pub fn content(&self) -> Option<&str> {
        self.attributes.get("content").and_then(Value::as_str)
    }

    pub fn set_content(&mut self, content: String) {
        self.attributes
            .insert("content".to_string(), Value::String(content));
    }

    pub fn to_value(&self) -> Value {
        Value::Struct(self.attributes.clone())
    }
}
