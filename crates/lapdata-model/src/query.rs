//! Read-only lookups over the resolved schema

use crate::defaults::NAME_ID;
use crate::model::LapModel;
use crate::schema::SchemaScope;
use lapdata_graph::{GraphStore, ObjectId};
use std::collections::{BTreeMap, BTreeSet};

const ARC_GEOMETRY: &str = "Arc_Geometry";

/// Where arc geometry lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcStructure {
    pub class: String,
    pub descriptor: String,
    /// Label of the edge from the partner class to the arc class.
    pub relation: Option<String>,
}

impl LapModel {
    /// `(class, descriptor)` of the first triple bound to `name`.
    pub fn cls_descr<S: GraphStore + ?Sized>(&self, store: &S, name: &str) -> Option<(String, String)> {
        self.data_structure(store, SchemaScope::Full)
            .locate(name)
            .map(|(class, descriptor)| (class.to_string(), descriptor.to_string()))
    }

    /// Root whose identity descriptor reads `sample_id` (both sides trimmed).
    pub fn find_sample_id<S: GraphStore + ?Sized>(&self, store: &S, sample_id: &str) -> Option<ObjectId> {
        let (class, descriptor) = self.cls_descr(store, NAME_ID)?;
        if !store.has_class(&class) {
            return None;
        }

        let wanted = sample_id.trim();
        store.class_members(&class, true).into_iter().find(|&member| {
            store
                .get_descriptor(member, &descriptor)
                .and_then(|value| value.as_text())
                .is_some_and(|text| text.trim() == wanted)
        })
    }

    pub fn arc_structure<S: GraphStore + ?Sized>(&self, store: &S) -> Option<ArcStructure> {
        let structure = self.data_structure(store, SchemaScope::Full);
        let (class, descriptor) = structure.locate(ARC_GEOMETRY)?;

        let relation = structure.relations.iter().find_map(|edge| {
            if edge.from == class {
                Some(store.reverse_relation(&edge.label))
            } else if edge.to == class {
                Some(edge.label.clone())
            } else {
                None
            }
        });

        Some(ArcStructure {
            class: class.to_string(),
            descriptor: descriptor.to_string(),
            relation,
        })
    }

    /// Distinct textual values per bound name, sorted. Resources are skipped.
    pub fn descriptor_values<S: GraphStore + ?Sized>(&self, store: &S) -> BTreeMap<String, Vec<String>> {
        let structure = self.data_structure(store, SchemaScope::Full);

        let mut lookup: BTreeMap<&str, (&str, &str)> = BTreeMap::new();
        for triple in &structure.descriptors {
            lookup.insert(
                triple.name.as_str(),
                (triple.class.as_str(), triple.descriptor.as_str()),
            );
        }

        lookup
            .into_iter()
            .map(|(name, (class, descriptor))| {
                let values: BTreeSet<String> = store
                    .descriptor_values(class, descriptor)
                    .iter()
                    .filter_map(|value| value.as_text())
                    .collect();
                (name.to_string(), values.into_iter().collect())
            })
            .collect()
    }
}
