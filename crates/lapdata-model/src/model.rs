use crate::defaults::SchemaConstants;
use crate::error::Result;
use crate::observer::ModelObserver;
use crate::schema::{self, DataStructure, MaterializedSchema, SchemaScope};
use crate::settings::{AttributeBinding, DescriptorBinding, ModelSettings};
use lapdata_graph::{GraphStore, ObjectId};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// The descriptor model: binding lists plus the engines that use them.
///
/// The model holds no store. Every operation takes the store it works on,
/// so one model can serve several stores and tests can use throwaway ones.
pub struct LapModel {
    constants: SchemaConstants,
    descriptors: Vec<DescriptorBinding>,
    attributes: Vec<AttributeBinding>,
    observers: Vec<Box<dyn ModelObserver>>,
}

impl LapModel {
    pub fn new() -> Self {
        Self::with_constants(SchemaConstants::new())
    }

    pub fn with_constants(constants: SchemaConstants) -> Self {
        Self {
            descriptors: constants.default_descriptors().to_vec(),
            attributes: constants.default_attributes().to_vec(),
            constants,
            observers: Vec::new(),
        }
    }

    pub fn constants(&self) -> &SchemaConstants {
        &self.constants
    }

    pub fn add_observer(&mut self, observer: Box<dyn ModelObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn notify(&mut self, mut f: impl FnMut(&mut dyn ModelObserver)) {
        for observer in &mut self.observers {
            f(observer.as_mut());
        }
    }

    pub(crate) fn notify_objects(
        &mut self,
        changed: &BTreeSet<ObjectId>,
        changed_classes: &BTreeSet<String>,
        added: Option<&BTreeSet<ObjectId>>,
        deleted: &BTreeSet<ObjectId>,
    ) {
        let none = BTreeSet::new();
        self.notify(|o| o.on_changed(changed, changed_classes));
        if let Some(added) = added {
            self.notify(|o| o.on_added(added, &none));
        }
        self.notify(|o| o.on_deleted(deleted, &none));
    }

    /// Replace the descriptor bindings.
    ///
    /// Caller order is kept and a repeated name keeps its first chain. Every
    /// default binding whose name is missing is appended, in default order.
    pub fn set_descriptors(&mut self, data: Vec<DescriptorBinding>) {
        let mut seen = HashSet::new();
        let mut descriptors: Vec<DescriptorBinding> = data
            .into_iter()
            .filter(|b| seen.insert(b.name.clone()))
            .collect();
        for binding in self.constants.default_descriptors() {
            if seen.insert(binding.name.clone()) {
                descriptors.push(binding.clone());
            }
        }
        tracing::debug!(count = descriptors.len(), "descriptor bindings set");
        self.descriptors = descriptors;

        let descriptors = self.descriptors.clone();
        self.notify(|o| o.on_set_descriptors(&descriptors));
    }

    pub fn descriptors(&self) -> &[DescriptorBinding] {
        &self.descriptors
    }

    /// Replace the attribute list; default attributes are appended when
    /// their name is missing.
    pub fn set_attributes(&mut self, data: Vec<AttributeBinding>) {
        let mut seen = HashSet::new();
        let mut attributes: Vec<AttributeBinding> = data
            .into_iter()
            .filter(|a| seen.insert(a.name.clone()))
            .collect();
        for attribute in self.constants.default_attributes() {
            if seen.insert(attribute.name.clone()) {
                attributes.push(attribute.clone());
            }
        }
        self.attributes = attributes;

        let attributes = self.attributes.clone();
        self.notify(|o| o.on_set_attributes(&attributes));
    }

    pub fn attributes(&self) -> &[AttributeBinding] {
        &self.attributes
    }

    pub fn settings(&self) -> ModelSettings {
        ModelSettings {
            descriptors: Some(self.descriptors.clone()),
            attributes: Some(self.attributes.clone()),
        }
    }

    pub fn apply_settings(&mut self, settings: ModelSettings) {
        if let Some(descriptors) = settings.descriptors {
            self.set_descriptors(descriptors);
        }
        if let Some(attributes) = settings.attributes {
            self.set_attributes(attributes);
        }
    }

    pub fn data_structure<S: GraphStore + ?Sized>(&self, store: &S, scope: SchemaScope) -> DataStructure {
        schema::resolve(&self.descriptors, &self.constants, store, scope)
    }

    /// Resolve the current bindings and materialize them into `store`.
    pub fn create_data_structure<S: GraphStore + ?Sized>(&self, store: &mut S) -> Result<MaterializedSchema> {
        let structure = self.data_structure(&*store, SchemaScope::Full);
        schema::materialize(store, &structure)
    }
}

impl Default for LapModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LapModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LapModel")
            .field("descriptors", &self.descriptors)
            .field("attributes", &self.attributes)
            .field("observers", &self.observers.len())
            .finish()
    }
}
