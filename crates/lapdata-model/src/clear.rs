//! Clear / replace engine

use crate::defaults::NAME_ID;
use crate::error::{ModelError, Result};
use crate::model::LapModel;
use crate::schema::SchemaScope;
use lapdata_graph::{GraphStore, ObjectId, SignalGuard};
use std::collections::{BTreeMap, BTreeSet};

/// Objects touched by a clear or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Objects that lost descriptors or edges but still exist.
    pub changed: BTreeSet<ObjectId>,
    pub deleted: BTreeSet<ObjectId>,
}

impl ClearOutcome {
    fn merge(&mut self, other: ClearOutcome) {
        self.changed.extend(other.changed);
        self.deleted.extend(other.deleted);
    }
}

impl LapModel {
    /// Strip the record tree hanging off `root`, leaving `root` itself.
    ///
    /// Root descriptors of the identity class are removed. Each edge from
    /// the root to a class the schema relates to the identity class is then
    /// either unlinked, or, if the target belongs to a default class and has
    /// no other edges, the target is deleted.
    ///
    /// With `keep_default`, default names are left on the root and no class
    /// counts as default, so nothing is deleted.
    pub fn clear_data<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        root: ObjectId,
        keep_default: bool,
    ) -> Result<ClearOutcome> {
        if !store.contains_object(root) {
            return Err(ModelError::ObjectNotFound(root));
        }
        let mut store = SignalGuard::new(store);

        let scope = if keep_default {
            SchemaScope::NonDefault
        } else {
            SchemaScope::Full
        };
        let structure = self.data_structure(&*store, scope);
        let default_classes: BTreeSet<String> = if keep_default {
            BTreeSet::new()
        } else {
            self.data_structure(&*store, SchemaScope::DefaultOnly)
                .classes
                .into_iter()
                .collect()
        };

        let mut outcome = ClearOutcome::default();
        let Some((identity_class, _)) = self.cls_descr(&*store, NAME_ID) else {
            return Ok(outcome);
        };

        let mut descr_lookup: BTreeMap<&str, (&str, &str)> = BTreeMap::new();
        for triple in &structure.descriptors {
            descr_lookup.insert(
                triple.name.as_str(),
                (triple.class.as_str(), triple.descriptor.as_str()),
            );
        }
        for (name, (class, descriptor)) in descr_lookup {
            if keep_default && self.constants().is_default_name(name) {
                continue;
            }
            if class == identity_class {
                store.del_descriptor(root, descriptor);
                outcome.changed.insert(root);
            }
        }

        // other class -> label as seen from the root
        let mut rel_lookup: BTreeMap<&str, String> = BTreeMap::new();
        for edge in &structure.relations {
            if edge.from == identity_class {
                rel_lookup.insert(edge.to.as_str(), edge.label.clone());
            } else if edge.to == identity_class {
                rel_lookup.insert(edge.from.as_str(), store.reverse_relation(&edge.label));
            }
        }

        let mut to_unlink = Vec::new();
        let mut to_delete = BTreeSet::new();
        for (target, label) in store.object_relations(root) {
            let classes: Vec<String> = store
                .object_classes(target)
                .into_iter()
                .filter(|c| rel_lookup.contains_key(c.as_str()))
                .collect();
            if classes.is_empty() {
                continue;
            }
            if !classes.iter().any(|c| rel_lookup[c.as_str()] == label) {
                continue;
            }
            let has_other_rels = store
                .object_relations(target)
                .iter()
                .any(|(peer, _)| *peer != root);
            if !has_other_rels && classes.iter().any(|c| default_classes.contains(c)) {
                to_delete.insert(target);
            } else {
                to_unlink.push((target, label));
            }
        }

        for (target, label) in to_unlink {
            store.del_relation(root, target, &label);
            outcome.changed.insert(target);
        }
        for target in to_delete {
            store.del_object(target);
            outcome.deleted.insert(target);
        }
        outcome.changed.retain(|id| !outcome.deleted.contains(id));

        tracing::debug!(
            root = %root,
            changed = outcome.changed.len(),
            deleted = outcome.deleted.len(),
            "record tree cleared"
        );
        Ok(outcome)
    }

    /// Clear and delete each root in `ids`. Ids that no longer exist are
    /// skipped. No id is reported as both changed and deleted.
    pub fn delete_drawings<S: GraphStore + ?Sized>(
        &mut self,
        store: &mut S,
        ids: &[ObjectId],
    ) -> Result<ClearOutcome> {
        let mut outcome = ClearOutcome::default();
        {
            let mut store = SignalGuard::new(store);
            for &id in ids {
                if !store.contains_object(id) {
                    tracing::debug!(id = %id, "skipping missing drawing");
                    continue;
                }
                outcome.merge(self.clear_data(&mut *store, id, false)?);
                store.del_object(id);
                outcome.deleted.insert(id);
            }
        }
        outcome.changed.retain(|id| !outcome.deleted.contains(id));

        tracing::info!(deleted = outcome.deleted.len(), "drawings deleted");
        self.notify_objects(&outcome.changed, &BTreeSet::new(), None, &outcome.deleted);
        Ok(outcome)
    }
}
