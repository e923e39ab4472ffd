//! Built-in descriptor bindings

use crate::chain::Chain;
use crate::settings::{AttributeBinding, DescriptorBinding};
use std::collections::{BTreeMap, BTreeSet};

/// Name of the descriptor holding the unique id of a sample.
pub const NAME_ID: &str = "Custom_Id";

/// `(name, chain)` pairs every model starts with.
pub const DEFAULT_DESCRIPTORS: &[(&str, &str)] = &[
    (NAME_ID, "Sample.Id"),
    ("Profile_Rim", "Sample.Rim"),
    ("Profile_Bottom", "Sample.Bottom"),
    ("Profile_Lid", "Sample.Lid"),
    ("Profile_Radius", "Sample.Radius"),
    ("Profile_Geometry", "Sample.Profile"),
    ("Profile_Radius_Point", "Sample.Radius_Point"),
    ("Profile_Rim_Point", "Sample.Rim_Point"),
    ("Profile_Bottom_Point", "Sample.Bottom_Point"),
    ("Profile_Left_Side", "Sample.Left_Side"),
    ("ScaleBar_Offset", "Sample.ScaleBar_Offset"),
    ("ScaleBar_Length", "Sample.ScaleBar_Length"),
    ("Reconstruction", "Sample.Reconstruction"),
    ("Settings", "Sample.Settings"),
    ("Date_Created", "Sample.Date_Created"),
    ("Date_Modified", "Sample.Date_Modified"),
    ("SW_Version", "Sample.SW_Version"),
    ("Detail_Geometry", "Sample.Drawn.Detail.Geometry"),
    ("Detail_Filled", "Sample.Drawn.Detail.Filled"),
    ("Detail_Dashed", "Sample.Drawn.Detail.Dashed"),
    ("Detail_Fill_Color", "Sample.Drawn.Detail.Fill_Color"),
    ("Detail_Line_Color", "Sample.Drawn.Detail.Line_Color"),
    ("Break_Geometry", "Sample.Drawn.Break.Geometry"),
    ("Inflection_Geometry", "Sample.Drawn.Inflection.Geometry"),
    ("Inflection_Dashed", "Sample.Drawn.Inflection.Dashed"),
    ("Arc_Geometry", "Sample.Drawn.Arc.Geometry"),
    ("Photo_Image", "Sample.Drawn.Photo.Image"),
    ("Photo_Mask", "Sample.Drawn.Photo.Mask"),
    ("Photo_Position", "Sample.Drawn.Photo.Position"),
    ("Photo_Angle", "Sample.Drawn.Photo.Angle"),
    ("Photo_Scale", "Sample.Drawn.Photo.Scale"),
    ("Annotation_Geometry", "Sample.Drawn.Annotation.Geometry"),
    ("Annotation_Name", "Sample.Drawn.Annotation.Name"),
    ("Measure_Geometry", "Sample.Drawn.Measure.Geometry"),
    ("Measure_Name", "Sample.Drawn.Measure.Name"),
    ("Measure_Value", "Sample.Drawn.Measure.Value"),
];

/// `(label, control, name)` attributes every model starts with.
pub const DEFAULT_ATTRIBUTES: &[(&str, &str, &str)] = &[("Sample ID", "LineEdit", NAME_ID)];

/// Immutable tables derived from the default bindings, built once per model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConstants {
    default_descriptors: Vec<DescriptorBinding>,
    default_attributes: Vec<AttributeBinding>,
    /// name -> group class, for every indirect default binding
    multi_descriptors: BTreeMap<String, String>,
    default_names: BTreeSet<String>,
}

impl SchemaConstants {
    pub fn new() -> Self {
        Self::with_defaults(
            DEFAULT_DESCRIPTORS
                .iter()
                .map(|(name, chain)| DescriptorBinding::new(*name, *chain))
                .collect(),
            DEFAULT_ATTRIBUTES
                .iter()
                .map(|(label, control, name)| AttributeBinding::new(*label, *control, *name))
                .collect(),
        )
    }

    /// Build the tables from a custom default set. Repeated names keep their
    /// first binding.
    pub fn with_defaults(
        descriptors: Vec<DescriptorBinding>,
        attributes: Vec<AttributeBinding>,
    ) -> Self {
        let mut default_names = BTreeSet::new();
        let mut default_descriptors = Vec::with_capacity(descriptors.len());
        let mut multi_descriptors = BTreeMap::new();

        for binding in descriptors {
            if !default_names.insert(binding.name.clone()) {
                continue;
            }
            if let Chain::Indirect { target, .. } = binding.parsed() {
                multi_descriptors.insert(binding.name.clone(), target);
            }
            default_descriptors.push(binding);
        }

        Self {
            default_descriptors,
            default_attributes: attributes,
            multi_descriptors,
            default_names,
        }
    }

    pub fn default_descriptors(&self) -> &[DescriptorBinding] {
        &self.default_descriptors
    }

    pub fn default_attributes(&self) -> &[AttributeBinding] {
        &self.default_attributes
    }

    pub fn is_default_name(&self, name: &str) -> bool {
        self.default_names.contains(name)
    }

    pub fn default_names(&self) -> &BTreeSet<String> {
        &self.default_names
    }

    /// Group a name is collected under on load, if any.
    pub fn multi_group(&self, name: &str) -> Option<&str> {
        self.multi_descriptors.get(name).map(String::as_str)
    }

    pub fn multi_descriptors(&self) -> &BTreeMap<String, String> {
        &self.multi_descriptors
    }
}

impl Default for SchemaConstants {
    fn default() -> Self {
        Self::new()
    }
}
