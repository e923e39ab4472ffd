//! Schema derivation
//!
//! Bindings are resolved into the classes, descriptor triples and class
//! edges they imply, then optionally materialized into a store. Nothing here
//! is cached: every structural operation resolves afresh, so the schema
//! always reflects the current bindings and the current store.

use crate::chain::Chain;
use crate::defaults::SchemaConstants;
use crate::error::Result;
use crate::settings::DescriptorBinding;
use lapdata_graph::{ClassEdge, GraphStore};
use std::collections::{BTreeMap, BTreeSet};

/// Which bindings take part in a resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SchemaScope {
    /// The model's current bindings.
    #[default]
    Full,
    /// Only the built-in default bindings.
    DefaultOnly,
    /// The model's bindings minus every default name.
    NonDefault,
}

/// `name` is stored as `descriptor` on members of `class`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DescriptorTriple {
    pub name: String,
    pub class: String,
    pub descriptor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataStructure {
    /// First-seen order.
    pub classes: Vec<String>,
    /// Unique triples, first-seen order.
    pub descriptors: Vec<DescriptorTriple>,
    /// One entry per edge; the reverse direction is never stored.
    pub relations: BTreeSet<ClassEdge>,
}

impl DataStructure {
    fn push_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    fn push_descriptor(&mut self, name: &str, class: &str, descriptor: &str) {
        let triple = DescriptorTriple {
            name: name.to_string(),
            class: class.to_string(),
            descriptor: descriptor.to_string(),
        };
        if !self.descriptors.contains(&triple) {
            self.descriptors.push(triple);
        }
    }

    fn push_relation<S: GraphStore + ?Sized>(&mut self, store: &S, edge: ClassEdge) -> bool {
        let reverse = ClassEdge::new(
            edge.to.clone(),
            store.reverse_relation(&edge.label),
            edge.from.clone(),
        );
        if self.relations.contains(&reverse) {
            return false;
        }
        self.relations.insert(edge)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// First `(class, descriptor)` bound to `name`.
    pub fn locate(&self, name: &str) -> Option<(&str, &str)> {
        self.descriptors
            .iter()
            .find(|t| t.name == name)
            .map(|t| (t.class.as_str(), t.descriptor.as_str()))
    }
}

/// Resolve `bindings` (or the defaults, per `scope`) against `store`.
///
/// Besides the edges chains declare, every store edge between two classes
/// already in the result is pulled in, unless it or its reverse is already
/// present.
pub fn resolve<S: GraphStore + ?Sized>(
    bindings: &[DescriptorBinding],
    constants: &SchemaConstants,
    store: &S,
    scope: SchemaScope,
) -> DataStructure {
    let selected: Vec<&DescriptorBinding> = match scope {
        SchemaScope::Full => bindings.iter().collect(),
        SchemaScope::DefaultOnly => constants.default_descriptors().iter().collect(),
        SchemaScope::NonDefault => bindings
            .iter()
            .filter(|b| !constants.is_default_name(&b.name))
            .collect(),
    };

    let mut structure = DataStructure::default();
    for binding in selected {
        match binding.parsed() {
            Chain::Direct { class, descriptor } => {
                structure.push_descriptor(&binding.name, &class, &descriptor);
                structure.push_class(&class);
            }
            Chain::Indirect {
                class,
                relation,
                target,
                descriptor,
            } => {
                structure.push_class(&class);
                structure.push_class(&target);
                structure.push_descriptor(&binding.name, &target, &descriptor);
                structure.push_relation(store, ClassEdge::new(class, relation, target));
            }
            Chain::Invalid => {
                tracing::warn!(
                    name = %binding.name,
                    chain = %binding.chain,
                    "chain has neither 2 nor 4 fragments; binding ignored"
                );
            }
        }
    }

    let mut implied = 0usize;
    for class in structure.classes.clone() {
        if !store.has_class(&class) {
            continue;
        }
        for (other, label) in store.class_relations(&class) {
            if !structure.has_class(&other) {
                continue;
            }
            if structure.push_relation(store, ClassEdge::new(class.clone(), label, other)) {
                implied += 1;
            }
        }
    }
    if implied > 0 {
        tracing::trace!(implied, "store edges added to schema");
    }

    structure
}

/// Result of writing a schema into a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializedSchema {
    /// name -> (class, descriptor); the last triple for a name wins
    pub descr_lookup: BTreeMap<String, (String, String)>,
    pub relations: BTreeSet<ClassEdge>,
}

impl MaterializedSchema {
    pub fn lookup(&self, name: &str) -> Option<&(String, String)> {
        self.descr_lookup.get(name)
    }
}

/// Ensure every class, class descriptor and class edge of `structure`
/// exists in `store`. Safe to repeat.
pub fn materialize<S: GraphStore + ?Sized>(
    store: &mut S,
    structure: &DataStructure,
) -> Result<MaterializedSchema> {
    for class in &structure.classes {
        store.add_class(class);
    }

    let mut descr_lookup = BTreeMap::new();
    for triple in &structure.descriptors {
        store.set_class_descriptor(&triple.class, &triple.descriptor)?;
        descr_lookup.insert(
            triple.name.clone(),
            (triple.class.clone(), triple.descriptor.clone()),
        );
    }

    for edge in &structure.relations {
        store.add_class_relation(&edge.from, &edge.to, &edge.label)?;
    }

    Ok(MaterializedSchema {
        descr_lookup,
        relations: structure.relations.clone(),
    })
}
