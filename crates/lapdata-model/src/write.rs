//! Write engine

use crate::defaults::NAME_ID;
use crate::error::{ModelError, Result};
use crate::model::LapModel;
use crate::observer::Progress;
use crate::record::{Field, Record};
use lapdata_graph::{DataRow, GraphStore, ObjectId, SignalGuard, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const STORE_STEPS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// On replace, leave default descriptors and objects of the old tree in
    /// place.
    #[serde(default)]
    pub keep_default: bool,
    /// No progress reporting and no observer notifications.
    #[serde(default)]
    pub silent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub root: ObjectId,
    pub changed: BTreeSet<ObjectId>,
    pub added: BTreeSet<ObjectId>,
    pub deleted: BTreeSet<ObjectId>,
    pub classes: BTreeSet<String>,
}

/// Forwards the fixed store checkpoints to an optional reporter.
struct Checkpoints<'a> {
    progress: Option<&'a mut dyn Progress>,
}

impl Checkpoints<'_> {
    fn start(&mut self) {
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.show("Storing Drawing");
            progress.update_state(1, Some(STORE_STEPS));
        }
    }

    fn reach(&mut self, step: usize) {
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.update_state(step, None);
        }
    }

    fn stop(&mut self) {
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.stop();
        }
    }
}

fn convert_value(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::Int(i64::from(*b)),
        other => other.clone(),
    }
}

impl LapModel {
    /// Store `record` as a tree under `root`, or under a new root.
    ///
    /// An existing root is cleared first (see [`LapModel::clear_data`]).
    /// Top-level scalars form one row anchored at the root; objects of other
    /// classes in that row are reused when an identical one exists and its
    /// outward links agree with the row. Every
    /// group element becomes fresh objects linked back to the root.
    ///
    /// Store signals are blocked for the whole call; observers hear about
    /// the result once, at the end.
    pub fn store_data<S: GraphStore + ?Sized>(
        &mut self,
        store: &mut S,
        record: &Record,
        root: Option<ObjectId>,
        options: StoreOptions,
        progress: Option<&mut dyn Progress>,
    ) -> Result<WriteOutcome> {
        let mut checkpoints = Checkpoints {
            progress: if options.silent { None } else { progress },
        };

        let result = {
            let mut store = SignalGuard::new(store);
            checkpoints.start();
            let result = self.write_record(&mut *store, record, root, options.keep_default, &mut checkpoints);
            checkpoints.stop();
            result
        };
        let outcome = result?;

        tracing::debug!(
            root = %outcome.root,
            added = outcome.added.len(),
            changed = outcome.changed.len(),
            deleted = outcome.deleted.len(),
            "record stored"
        );

        if !options.silent {
            self.notify_objects(
                &outcome.changed,
                &outcome.classes,
                Some(&outcome.added),
                &outcome.deleted,
            );
        }
        Ok(outcome)
    }

    fn write_record<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        record: &Record,
        root: Option<ObjectId>,
        keep_default: bool,
        checkpoints: &mut Checkpoints<'_>,
    ) -> Result<WriteOutcome> {
        let schema = self.create_data_structure(store)?;

        let lookup = |name: &str| -> Result<(String, String)> {
            schema
                .lookup(name)
                .cloned()
                .ok_or_else(|| ModelError::UnknownName(name.to_string()))
        };

        // Names are checked before any object is touched.
        for (name, field) in record {
            match field {
                Field::Scalar(_) => {
                    lookup(name)?;
                }
                Field::Group(rows) => {
                    for name in rows.iter().flat_map(|row| row.keys()) {
                        lookup(name)?;
                    }
                }
            }
        }

        let mut classes: BTreeSet<String> = schema
            .descr_lookup
            .values()
            .map(|(class, _)| class.clone())
            .collect();
        let mut changed = BTreeSet::new();
        let mut added = BTreeSet::new();
        let mut deleted = BTreeSet::new();

        checkpoints.reach(2);

        let (identity_class, _) = schema
            .lookup(NAME_ID)
            .cloned()
            .ok_or(ModelError::MissingIdentity)?;

        let root = match root {
            None => {
                let root = store.add_member(&identity_class)?;
                added.insert(root);
                root
            }
            Some(root) => {
                if !store.contains_object(root) {
                    return Err(ModelError::ObjectNotFound(root));
                }
                if !store.object_classes(root).contains(&identity_class) {
                    return Err(ModelError::NotARoot {
                        id: root,
                        class: identity_class,
                    });
                }
                let cleared = self.clear_data(store, root, keep_default)?;
                changed.extend(cleared.changed);
                deleted.extend(cleared.deleted);
                root
            }
        };

        let mut row = DataRow::new();
        for (name, field) in record {
            if let Field::Scalar(value) = field {
                row.insert(lookup(name)?, convert_value(value));
            }
        }
        let unique = BTreeSet::from([identity_class.clone()]);
        let existing = BTreeMap::from([(identity_class.clone(), root)]);
        let binding = store.add_data_row(&row, &schema.relations, &unique, &existing)?;
        for (class, object) in binding.objects {
            classes.insert(class);
            added.insert(object);
        }

        // label from a class back to the identity class
        let mut rel_to_root: BTreeMap<&str, String> = BTreeMap::new();
        for edge in &schema.relations {
            if edge.from == identity_class {
                rel_to_root.insert(edge.to.as_str(), store.reverse_relation(&edge.label));
            } else if edge.to == identity_class {
                rel_to_root.insert(edge.from.as_str(), edge.label.clone());
            }
        }

        for field in record.values() {
            let Field::Group(rows) = field else {
                continue;
            };
            for item in rows {
                let mut row = DataRow::new();
                for (name, value) in item {
                    row.insert(lookup(name)?, convert_value(value));
                }
                let unique: BTreeSet<String> = row.keys().map(|(class, _)| class.clone()).collect();
                let binding = store.add_data_row(&row, &schema.relations, &unique, &BTreeMap::new())?;
                for (class, object) in binding.objects {
                    if let Some(label) = rel_to_root.get(class.as_str()) {
                        store.add_relation(object, root, label)?;
                    }
                    classes.insert(class);
                    added.insert(object);
                }
            }
        }

        checkpoints.reach(STORE_STEPS);

        Ok(WriteOutcome {
            root,
            changed,
            added,
            deleted,
            classes,
        })
    }
}
