//! Typed object-relation graph store
//!
//! The LAP data model maps flat descriptor records onto a graph made of:
//! - **Classes**: named types carrying a list of descriptor names and
//!   labelled relations to other classes
//! - **Objects**: class members holding descriptor values
//! - **Relations**: labelled object-to-object edges; every label has exactly
//!   one reverse label, so an edge is visible from both endpoints
//!
//! `GraphStore` is the narrow contract the model consumes. `MemoryGraph` is
//! the in-process implementation, with a binary snapshot format.
//!
//! ## Module Organization
//!
//! - `value`: typed descriptor values
//! - `row`: the "insert one linked row" primitive
//! - `signals`: scoped suppression of store change signals
//! - `memory`: in-memory store + snapshot encoding

pub mod memory;
pub mod row;
pub mod signals;
mod snapshot;
pub mod value;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use memory::MemoryGraph;
pub use row::{DataRow, RowBinding};
pub use signals::SignalGuard;
pub use snapshot::{SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
pub use value::{Resource, Value};

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque object identifier (stable for the lifetime of a store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A declared relation between two classes: `from -[label]-> to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassEdge {
    pub from: String,
    pub label: String,
    pub to: String,
}

impl ClassEdge {
    pub fn new(from: impl Into<String>, label: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            label: label.into(),
            to: to.into(),
        }
    }

    /// Whether either endpoint is `class`.
    pub fn touches(&self, class: &str) -> bool {
        self.from == class || self.to == class
    }

    /// The same edge seen from the other endpoint.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            label: reverse_label(&self.label),
            to: self.from.clone(),
        }
    }
}

impl fmt::Display for ClassEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.from, self.label, self.to)
    }
}

/// Change notifications a store emits while its signals are not blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    ObjectAdded(ObjectId),
    ObjectChanged(ObjectId),
    ObjectDeleted(ObjectId),
    ClassChanged(String),
}

/// Canonical reverse of a relation label.
///
/// Labels with an even number of leading `~` gain one, labels with an odd
/// number lose one. This pairs `L` with `~L` and is its own inverse for
/// every string.
pub fn reverse_label(label: &str) -> String {
    let tildes = label.chars().take_while(|c| *c == '~').count();
    if tildes % 2 == 0 {
        format!("~{label}")
    } else {
        label[1..].to_string()
    }
}

// ============================================================================
// Store contract
// ============================================================================

/// Primitives the descriptor model needs from a graph datastore.
///
/// Classes are addressed by name, objects by [`ObjectId`]. Relation lists are
/// returned in insertion order; callers rely on that order for repeated
/// groups.
pub trait GraphStore {
    fn has_class(&self, name: &str) -> bool;

    /// Create the class if it does not exist yet.
    fn add_class(&mut self, name: &str);

    /// Register a descriptor name on a class (idempotent).
    fn set_class_descriptor(&mut self, class: &str, descriptor: &str) -> Result<()>;

    /// Declare `class -[label]-> other` (idempotent). The reverse label is
    /// recorded on `other`.
    fn add_class_relation(&mut self, class: &str, other: &str, label: &str) -> Result<()>;

    /// `(other class, label)` pairs as seen from `class`.
    fn class_relations(&self, class: &str) -> Vec<(String, String)>;

    /// Members of `class`; with `direct_only == false` members of subclasses
    /// are included.
    fn class_members(&self, class: &str, direct_only: bool) -> Vec<ObjectId>;

    fn add_member(&mut self, class: &str) -> Result<ObjectId>;

    fn contains_object(&self, id: ObjectId) -> bool;

    fn object_classes(&self, id: ObjectId) -> Vec<String>;

    fn object_descriptors(&self, id: ObjectId) -> Vec<(String, Value)>;

    fn get_descriptor(&self, id: ObjectId, descriptor: &str) -> Option<Value>;

    fn set_descriptor(&mut self, id: ObjectId, descriptor: &str, value: Value) -> Result<()>;

    fn del_descriptor(&mut self, id: ObjectId, descriptor: &str) -> bool;

    /// `(target, label)` pairs as seen from `id`.
    fn object_relations(&self, id: ObjectId) -> Vec<(ObjectId, String)>;

    /// Link `id -[label]-> target` (idempotent); `target` sees the reverse label.
    fn add_relation(&mut self, id: ObjectId, target: ObjectId, label: &str) -> Result<()>;

    fn del_relation(&mut self, id: ObjectId, target: ObjectId, label: &str) -> bool;

    /// Remove an object together with all of its edges.
    fn del_object(&mut self, id: ObjectId) -> bool;

    fn reverse_relation(&self, label: &str) -> String {
        reverse_label(label)
    }

    /// Block (or unblock) the store's own change signals, returning the
    /// previous state. Stores without signals ignore this.
    fn block_signals(&mut self, _blocked: bool) -> bool {
        false
    }

    /// All values of `descriptor` over the members of `class` (subclasses
    /// included).
    fn descriptor_values(&self, class: &str, descriptor: &str) -> Vec<Value> {
        self.class_members(class, false)
            .into_iter()
            .filter_map(|id| self.get_descriptor(id, descriptor))
            .collect()
    }

    /// Insert one fully linked row of values. See [`row::add_data_row`].
    fn add_data_row(
        &mut self,
        row: &DataRow,
        relations: &BTreeSet<ClassEdge>,
        unique: &BTreeSet<String>,
        existing: &BTreeMap<String, ObjectId>,
    ) -> Result<RowBinding> {
        row::add_data_row(self, row, relations, unique, existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_label_pairs_plain_and_tilde() {
        assert_eq!(reverse_label("Drawn"), "~Drawn");
        assert_eq!(reverse_label("~Drawn"), "Drawn");
        assert_eq!(reverse_label("~~X"), "~~~X");
        assert_eq!(reverse_label("~~~X"), "~~X");
        assert_eq!(reverse_label(""), "~");
    }

    #[test]
    fn class_edge_reversed_flips_endpoints() {
        let edge = ClassEdge::new("Sample", "Drawn", "Detail");
        let rev = edge.reversed();
        assert_eq!(rev, ClassEdge::new("Detail", "~Drawn", "Sample"));
        assert_eq!(rev.reversed(), edge);
        assert!(edge.touches("Detail"));
        assert!(!edge.touches("Site"));
    }
}
