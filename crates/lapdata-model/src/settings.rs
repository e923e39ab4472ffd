//! Persisted binding lists
//!
//! Both lists serialize as nested JSON arrays so settings files stay
//! compatible with the form editors that write them:
//!
//! ```json
//! { "descriptors": [["Custom_Id", "Sample.Id"]],
//!   "attributes": [["Sample ID", "LineEdit", "Custom_Id"]] }
//! ```

use crate::chain::Chain;
use serde::{Deserialize, Serialize};

/// A named field bound to a chain expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[String; 2]", into = "[String; 2]")]
pub struct DescriptorBinding {
    pub name: String,
    pub chain: String,
}

impl DescriptorBinding {
    pub fn new(name: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: chain.into(),
        }
    }

    pub fn parsed(&self) -> Chain {
        Chain::parse(&self.chain)
    }
}

impl From<[String; 2]> for DescriptorBinding {
    fn from([name, chain]: [String; 2]) -> Self {
        Self { name, chain }
    }
}

impl From<DescriptorBinding> for [String; 2] {
    fn from(binding: DescriptorBinding) -> Self {
        [binding.name, binding.chain]
    }
}

/// Form widget metadata for one descriptor name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[String; 3]", into = "[String; 3]")]
pub struct AttributeBinding {
    pub label: String,
    pub control: String,
    pub name: String,
}

impl AttributeBinding {
    pub fn new(label: impl Into<String>, control: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            control: control.into(),
            name: name.into(),
        }
    }
}

impl From<[String; 3]> for AttributeBinding {
    fn from([label, control, name]: [String; 3]) -> Self {
        Self {
            label,
            control,
            name,
        }
    }
}

impl From<AttributeBinding> for [String; 3] {
    fn from(binding: AttributeBinding) -> Self {
        [binding.label, binding.control, binding.name]
    }
}

/// Settings mapping. Absent lists leave the model's current lists in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptors: Option<Vec<DescriptorBinding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeBinding>>,
}

impl ModelSettings {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_string_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_use_array_form() {
        let settings = ModelSettings {
            descriptors: Some(vec![DescriptorBinding::new("Custom_Id", "Sample.Id")]),
            attributes: Some(vec![AttributeBinding::new("Sample ID", "LineEdit", "Custom_Id")]),
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "descriptors": [["Custom_Id", "Sample.Id"]],
                "attributes": [["Sample ID", "LineEdit", "Custom_Id"]],
            })
        );
    }

    #[test]
    fn missing_and_unknown_keys_are_tolerated() {
        let settings = ModelSettings::from_json_str(
            r#"{"descriptors": [["Site_Name", "Site.Name"]], "window": {"w": 800}}"#,
        )
        .unwrap();
        assert_eq!(
            settings.descriptors,
            Some(vec![DescriptorBinding::new("Site_Name", "Site.Name")])
        );
        assert_eq!(settings.attributes, None);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(ModelSettings::from_json_str(r#"{"descriptors": [["only-name"]]}"#).is_err());
    }
}
