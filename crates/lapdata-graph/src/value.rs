//! Descriptor values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-scalar payload owned by the store (image, mask, attached file).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub url: String,
}

/// A descriptor value.
///
/// The serde representation is externally tagged, which bincode snapshots
/// need to decode the variant. Records are exchanged in the plain untagged
/// JSON shape through [`Value::from_json`] / [`Value::to_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Resource(Resource),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn resource(url: impl Into<String>) -> Self {
        Self::Resource(Resource { url: url.into() })
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }

    /// Textual form of a scalar; `None` for resources.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Resource(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Plain JSON scalar → value. `{"resource": url}` maps to a resource;
    /// `null`, arrays and other objects have no value form.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Object(map) if map.len() == 1 => match map.get("resource") {
                Some(serde_json::Value::String(url)) => Some(Self::resource(url.clone())),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Resource(r) => serde_json::json!({ "resource": r.url }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Resource(r) => f.write_str(&r.url),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_map_to_values() {
        assert_eq!(Value::from_json(&json!(3)), Some(Value::Int(3)));
        assert_eq!(Value::from_json(&json!(2.5)), Some(Value::Float(2.5)));
        assert_eq!(Value::from_json(&json!(true)), Some(Value::Bool(true)));
        assert_eq!(Value::from_json(&json!("x")), Some(Value::text("x")));
        assert_eq!(
            Value::from_json(&json!({"resource": "file:///a.png"})),
            Some(Value::resource("file:///a.png"))
        );
        assert_eq!(Value::from_json(&json!(null)), None);
        assert_eq!(Value::from_json(&json!([1])), None);
    }

    #[test]
    fn resources_have_no_text_form() {
        assert_eq!(Value::Int(7).as_text().as_deref(), Some("7"));
        assert_eq!(Value::resource("file:///a.png").as_text(), None);
    }

    #[test]
    fn serde_form_is_tagged_and_json_form_is_plain() {
        let value = Value::Int(5);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"Int": 5}));
        assert_eq!(value.to_json(), json!(5));
        assert_eq!(Value::text("a").to_json(), json!("a"));
    }
}
