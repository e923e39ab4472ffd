//! Load engine

use crate::defaults::NAME_ID;
use crate::error::{ModelError, Result};
use crate::model::LapModel;
use crate::record::{Field, GroupRow, Record};
use crate::schema::SchemaScope;
use lapdata_graph::{GraphStore, ObjectId};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Lookups for reading record trees, built once and reused across roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadLookups {
    /// (class, descriptor) -> name
    pub name_lookup: BTreeMap<(String, String), String>,
    pub class_descriptors: BTreeMap<String, BTreeSet<String>>,
    pub identity_class: Option<String>,
    /// class -> label from the identity class to it
    pub rel_from_identity: BTreeMap<String, String>,
    /// Multi-hop paths `[(label, class), ...]` starting at a class next to
    /// the identity class.
    pub rel_chains: Vec<Vec<(String, String)>>,
}

impl LapModel {
    pub fn load_lookups<S: GraphStore + ?Sized>(&self, store: &S) -> LoadLookups {
        let structure = self.data_structure(store, SchemaScope::Full);
        let mut lookups = LoadLookups::default();

        for triple in &structure.descriptors {
            lookups.name_lookup.insert(
                (triple.class.clone(), triple.descriptor.clone()),
                triple.name.clone(),
            );
            lookups
                .class_descriptors
                .entry(triple.class.clone())
                .or_default()
                .insert(triple.descriptor.clone());
            if triple.name == NAME_ID {
                lookups.identity_class = Some(triple.class.clone());
            }
        }

        // (from, label, to), both directions
        let mut rel_other: BTreeSet<(String, String, String)> = BTreeSet::new();
        for edge in &structure.relations {
            if lookups.identity_class.as_ref() == Some(&edge.from) {
                lookups
                    .rel_from_identity
                    .insert(edge.to.clone(), edge.label.clone());
            } else if lookups.identity_class.as_ref() == Some(&edge.to) {
                lookups
                    .rel_from_identity
                    .insert(edge.from.clone(), store.reverse_relation(&edge.label));
            } else {
                rel_other.insert((edge.from.clone(), edge.label.clone(), edge.to.clone()));
                rel_other.insert((
                    edge.to.clone(),
                    store.reverse_relation(&edge.label),
                    edge.from.clone(),
                ));
            }
        }

        for (start, label) in &lookups.rel_from_identity {
            let mut chain = vec![(label.clone(), start.clone())];
            let mut visited = BTreeSet::from([start.clone()]);
            let mut last = start.clone();
            while let Some((label, next)) = rel_other
                .iter()
                .find(|(from, _, to)| *from == last && !visited.contains(to))
                .map(|(_, label, to)| (label.clone(), to.clone()))
            {
                visited.insert(next.clone());
                chain.push((label, next.clone()));
                last = next;
            }
            if chain.len() > 1 {
                lookups.rel_chains.push(chain);
            }
        }

        lookups
    }

    /// Read the record tree under `root`.
    ///
    /// Names in a default group (e.g. every `Detail_*` name) are collected
    /// into one [`GroupRow`] per related object, appended under the group
    /// name in edge order. Everything else is flattened into the record.
    pub fn load_object_data<S: GraphStore + ?Sized>(
        &self,
        store: &S,
        root: ObjectId,
        lookups: &LoadLookups,
    ) -> Result<Record> {
        if !store.contains_object(root) {
            return Err(ModelError::ObjectNotFound(root));
        }

        let mut primary_rels: BTreeSet<&str> =
            lookups.rel_from_identity.values().map(String::as_str).collect();
        let mut chain_classes: BTreeSet<&str> = BTreeSet::new();
        for chain in &lookups.rel_chains {
            if let Some((label, class)) = chain.first() {
                primary_rels.insert(label);
                chain_classes.insert(class);
            }
        }

        let mut data = Record::new();

        if let Some(identity_class) = &lookups.identity_class {
            for (descriptor, value) in store.object_descriptors(root) {
                if let Some(name) = lookups
                    .name_lookup
                    .get(&(identity_class.clone(), descriptor))
                {
                    data.insert(name.clone(), Field::Scalar(value));
                }
            }
        }

        for (target, label) in store.object_relations(root) {
            if !primary_rels.contains(label.as_str()) {
                continue;
            }
            let mut grouped: BTreeMap<String, GroupRow> = BTreeMap::new();
            let target_classes = store.object_classes(target);

            for class in &target_classes {
                self.collect_object(store, target, class, lookups, &mut data, &mut grouped);
            }

            for class in target_classes
                .iter()
                .filter(|c| chain_classes.contains(c.as_str()))
            {
                let heads = lookups.rel_chains.iter().filter(|chain| {
                    matches!(chain.first(), Some((l, c)) if *l == label && c == class)
                });
                for chain in heads {
                    let mut current = target;
                    for (hop_label, hop_class) in &chain[1..] {
                        let next = store
                            .object_relations(current)
                            .into_iter()
                            .find(|(object, l)| {
                                l == hop_label
                                    && store.object_classes(*object).iter().any(|c| c == hop_class)
                            })
                            .map(|(object, _)| object);
                        let Some(next) = next else {
                            break;
                        };
                        current = next;
                        self.collect_object(store, current, hop_class, lookups, &mut data, &mut grouped);
                    }
                }
            }

            for (group, row) in grouped {
                match data.entry(group) {
                    Entry::Occupied(mut entry) => match entry.get_mut() {
                        Field::Group(rows) => rows.push(row),
                        slot => *slot = Field::Group(vec![row]),
                    },
                    Entry::Vacant(entry) => {
                        entry.insert(Field::Group(vec![row]));
                    }
                }
            }
        }

        Ok(data)
    }

    pub fn load_data<S: GraphStore + ?Sized>(&self, store: &S, root: ObjectId) -> Result<Record> {
        let lookups = self.load_lookups(store);
        self.load_object_data(store, root, &lookups)
    }

    fn collect_object<S: GraphStore + ?Sized>(
        &self,
        store: &S,
        object: ObjectId,
        class: &str,
        lookups: &LoadLookups,
        data: &mut Record,
        grouped: &mut BTreeMap<String, GroupRow>,
    ) {
        let Some(descriptors) = lookups.class_descriptors.get(class) else {
            return;
        };
        for descriptor in descriptors {
            let Some(value) = store.get_descriptor(object, descriptor) else {
                continue;
            };
            let Some(name) = lookups
                .name_lookup
                .get(&(class.to_string(), descriptor.clone()))
            else {
                continue;
            };
            match self.constants().multi_group(name) {
                Some(group) => {
                    grouped
                        .entry(group.to_string())
                        .or_default()
                        .insert(name.clone(), value);
                }
                None => {
                    data.insert(name.clone(), Field::Scalar(value));
                }
            }
        }
    }
}
