use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};

use super::xml::{escape, parse_document, Element};

pub type Struct = BTreeMap<String, Value>;

/// An XML-RPC value as used by the Confluence remote API.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    Double(f64),
    DateTime(String),
    Base64(String),
    Struct(Struct),
    Array(Vec<Value>),
    Nil,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_struct(self) -> Option<Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    fn write(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Value::String(s) => {
                out.push_str("<string>");
                out.push_str(&escape(s));
                out.push_str("</string>");
            }
            Value::Int(i) => out.push_str(&format!("<int>{i}</int>")),
            Value::Bool(b) => out.push_str(&format!("<boolean>{}</boolean>", u8::from(*b))),
            Value::Double(d) => out.push_str(&format!("<double>{d}</double>")),
            Value::DateTime(s) => {
                out.push_str(&format!("<dateTime.iso8601>{}</dateTime.iso8601>", escape(s)))
            }
            Value::Base64(s) => out.push_str(&format!("<base64>{s}</base64>")),
            Value::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    out.push_str("<member><name>");
                    out.push_str(&escape(name));
                    out.push_str("</name>");
                    value.write(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
            Value::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write(out);
                }
                out.push_str("</data></array>");
            }
            Value::Nil => out.push_str("<nil/>"),
        }
        out.push_str("</value>");
    }

    fn read(value: &Element) -> Result<Value> {
        let Some(typed) = value.children.first() else {
            // An untyped <value> is a string.
            return Ok(Value::String(value.text.clone()));
        };
        let text = typed.text.trim();
        let parsed = match typed.name.as_str() {
            "string" => Value::String(typed.text.clone()),
            "int" | "i4" | "i8" => Value::Int(
                text.parse()
                    .with_context(|| format!("Invalid XML-RPC integer '{text}'"))?,
            ),
            "boolean" => match text {
                "1" => Value::Bool(true),
                "0" => Value::Bool(false),
                other => bail!("Invalid XML-RPC boolean '{other}'"),
            },
            "double" => Value::Double(
                text.parse()
                    .with_context(|| format!("Invalid XML-RPC double '{text}'"))?,
            ),
            "dateTime.iso8601" => Value::DateTime(text.to_string()),
            "base64" => Value::Base64(text.to_string()),
            "nil" => Value::Nil,
            "struct" => {
                let mut members = Struct::new();
                for member in typed.children_named("member") {
                    let name = member
                        .child("name")
                        .context("XML-RPC struct member without <name>")?;
                    let value = member
                        .child("value")
                        .context("XML-RPC struct member without <value>")?;
                    members.insert(name.text.clone(), Value::read(value)?);
                }
                Value::Struct(members)
            }
            "array" => {
                let data = typed.child("data").context("XML-RPC array without <data>")?;
                let items = data
                    .children_named("value")
                    .map(Value::read)
                    .collect::<Result<Vec<_>>>()?;
                Value::Array(items)
            }
            other => bail!("Unsupported XML-RPC type <{other}>"),
        };
        Ok(parsed)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Serialise a `<methodCall>` document.
pub fn method_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><methodCall><methodName>"#);
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Decode a `<methodResponse>`, turning a `<fault>` into an error.
pub fn parse_response(body: &str) -> Result<Value> {
    let root = parse_document(body).context("Malformed XML-RPC response")?;
    if root.name != "methodResponse" {
        bail!("Expected <methodResponse>, got <{}>", root.name);
    }

    if let Some(fault) = root.child("fault") {
        let value = fault.child("value").context("XML-RPC fault without value")?;
        let detail = Value::read(value)?.into_struct().unwrap_or_default();
        let code = match detail.get("faultCode") {
            Some(Value::Int(code)) => code.to_string(),
            _ => "?".to_string(),
        };
        let message = detail
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or("no fault string");
        return Err(anyhow!("XML-RPC fault {code}: {message}"));
    }

    let value = root
        .child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .context("XML-RPC response without a return value")?;
    Value::read(value)
}
