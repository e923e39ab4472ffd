//! In-memory graph store
//!
//! Classes keep their member sets as roaring bitmaps (like PathDB's type
//! index), objects live in a hash table keyed by raw id. Descriptor and
//! relation lists are plain vectors so insertion order is preserved.

use crate::{reverse_label, GraphEvent, GraphStore, ObjectId, Value};
use ahash::AHashMap;
use anyhow::{anyhow, Result};
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ClassEntry {
    descriptors: Vec<String>,
    /// (other class, label as seen from this class)
    relations: Vec<(String, String)>,
    subclasses: BTreeSet<String>,
    members: RoaringBitmap,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ObjectEntry {
    descriptors: Vec<(String, Value)>,
    /// (target, label as seen from this object)
    relations: Vec<(ObjectId, String)>,
}

/// In-memory [`GraphStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryGraph {
    classes: BTreeMap<String, ClassEntry>,
    objects: AHashMap<u32, ObjectEntry>,
    next_id: u32,
    #[serde(skip)]
    signals_blocked: bool,
    #[serde(skip)]
    events: Vec<GraphEvent>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Class names in lexical order.
    pub fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    /// Descriptor names registered on a class.
    pub fn class_descriptors(&self, class: &str) -> Vec<String> {
        self.classes
            .get(class)
            .map(|c| c.descriptors.clone())
            .unwrap_or_default()
    }

    /// Make `child` a subclass of `parent`, creating both if needed.
    pub fn add_subclass(&mut self, parent: &str, child: &str) {
        self.add_class(child);
        self.add_class(parent);
        if let Some(entry) = self.classes.get_mut(parent) {
            entry.subclasses.insert(child.to_string());
        }
    }

    /// Add an existing object to one more class.
    pub fn add_class_member(&mut self, class: &str, id: ObjectId) -> Result<()> {
        if !self.objects.contains_key(&id.raw()) {
            return Err(anyhow!("unknown object id {id}"));
        }
        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| anyhow!("unknown class `{class}`"))?;
        entry.members.insert(id.raw());
        self.emit(GraphEvent::ObjectChanged(id));
        Ok(())
    }

    pub fn signals_blocked(&self) -> bool {
        self.signals_blocked
    }

    /// Take the change signals emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: GraphEvent) {
        if !self.signals_blocked {
            self.events.push(event);
        }
    }

    fn collect_members(
        &self,
        class: &str,
        direct_only: bool,
        seen: &mut BTreeSet<String>,
        out: &mut RoaringBitmap,
    ) {
        if !seen.insert(class.to_string()) {
            return;
        }
        let Some(entry) = self.classes.get(class) else {
            return;
        };
        *out |= &entry.members;
        if direct_only {
            return;
        }
        for sub in &entry.subclasses {
            self.collect_members(sub, false, seen, out);
        }
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut ObjectEntry> {
        self.objects
            .get_mut(&id.raw())
            .ok_or_else(|| anyhow!("unknown object id {id}"))
    }
}

impl GraphStore for MemoryGraph {
    fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    fn add_class(&mut self, name: &str) {
        if self.classes.contains_key(name) {
            return;
        }
        self.classes.insert(name.to_string(), ClassEntry::default());
        self.emit(GraphEvent::ClassChanged(name.to_string()));
    }

    fn set_class_descriptor(&mut self, class: &str, descriptor: &str) -> Result<()> {
        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| anyhow!("unknown class `{class}`"))?;
        if entry.descriptors.iter().any(|d| d == descriptor) {
            return Ok(());
        }
        entry.descriptors.push(descriptor.to_string());
        self.emit(GraphEvent::ClassChanged(class.to_string()));
        Ok(())
    }

    fn add_class_relation(&mut self, class: &str, other: &str, label: &str) -> Result<()> {
        if !self.classes.contains_key(other) {
            return Err(anyhow!("unknown class `{other}`"));
        }
        let reverse = reverse_label(label);
        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| anyhow!("unknown class `{class}`"))?;
        if entry.relations.iter().any(|(c, l)| c == other && l == label) {
            return Ok(());
        }
        entry.relations.push((other.to_string(), label.to_string()));
        if let Some(peer) = self.classes.get_mut(other) {
            if !peer.relations.iter().any(|(c, l)| c == class && *l == reverse) {
                peer.relations.push((class.to_string(), reverse));
            }
        }
        self.emit(GraphEvent::ClassChanged(class.to_string()));
        self.emit(GraphEvent::ClassChanged(other.to_string()));
        Ok(())
    }

    fn class_relations(&self, class: &str) -> Vec<(String, String)> {
        self.classes
            .get(class)
            .map(|c| c.relations.clone())
            .unwrap_or_default()
    }

    fn class_members(&self, class: &str, direct_only: bool) -> Vec<ObjectId> {
        let mut out = RoaringBitmap::new();
        let mut seen = BTreeSet::new();
        self.collect_members(class, direct_only, &mut seen, &mut out);
        out.iter().map(ObjectId::new).collect()
    }

    fn add_member(&mut self, class: &str) -> Result<ObjectId> {
        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| anyhow!("unknown class `{class}`"))?;
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        entry.members.insert(id.raw());
        self.objects.insert(id.raw(), ObjectEntry::default());
        self.emit(GraphEvent::ObjectAdded(id));
        Ok(id)
    }

    fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id.raw())
    }

    fn object_classes(&self, id: ObjectId) -> Vec<String> {
        self.classes
            .iter()
            .filter(|(_, entry)| entry.members.contains(id.raw()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn object_descriptors(&self, id: ObjectId) -> Vec<(String, Value)> {
        self.objects
            .get(&id.raw())
            .map(|o| o.descriptors.clone())
            .unwrap_or_default()
    }

    fn get_descriptor(&self, id: ObjectId, descriptor: &str) -> Option<Value> {
        self.objects
            .get(&id.raw())?
            .descriptors
            .iter()
            .find(|(name, _)| name == descriptor)
            .map(|(_, value)| value.clone())
    }

    fn set_descriptor(&mut self, id: ObjectId, descriptor: &str, value: Value) -> Result<()> {
        let object = self.object_mut(id)?;
        match object.descriptors.iter().position(|(name, _)| name == descriptor) {
            Some(pos) => object.descriptors[pos].1 = value,
            None => object.descriptors.push((descriptor.to_string(), value)),
        }
        self.emit(GraphEvent::ObjectChanged(id));
        Ok(())
    }

    fn del_descriptor(&mut self, id: ObjectId, descriptor: &str) -> bool {
        let Some(object) = self.objects.get_mut(&id.raw()) else {
            return false;
        };
        let before = object.descriptors.len();
        object.descriptors.retain(|(name, _)| name != descriptor);
        let removed = object.descriptors.len() != before;
        if removed {
            self.emit(GraphEvent::ObjectChanged(id));
        }
        removed
    }

    fn object_relations(&self, id: ObjectId) -> Vec<(ObjectId, String)> {
        self.objects
            .get(&id.raw())
            .map(|o| o.relations.clone())
            .unwrap_or_default()
    }

    fn add_relation(&mut self, id: ObjectId, target: ObjectId, label: &str) -> Result<()> {
        if !self.objects.contains_key(&target.raw()) {
            return Err(anyhow!("unknown object id {target}"));
        }
        let reverse = reverse_label(label);
        let object = self.object_mut(id)?;
        if object.relations.iter().any(|(t, l)| *t == target && l == label) {
            return Ok(());
        }
        object.relations.push((target, label.to_string()));
        let peer = self.object_mut(target)?;
        if !peer.relations.iter().any(|(t, l)| *t == id && *l == reverse) {
            peer.relations.push((id, reverse));
        }
        self.emit(GraphEvent::ObjectChanged(id));
        self.emit(GraphEvent::ObjectChanged(target));
        Ok(())
    }

    fn del_relation(&mut self, id: ObjectId, target: ObjectId, label: &str) -> bool {
        let reverse = reverse_label(label);
        let Some(object) = self.objects.get_mut(&id.raw()) else {
            return false;
        };
        let before = object.relations.len();
        object.relations.retain(|(t, l)| !(*t == target && l == label));
        if object.relations.len() == before {
            return false;
        }
        if let Some(peer) = self.objects.get_mut(&target.raw()) {
            peer.relations.retain(|(t, l)| !(*t == id && *l == reverse));
        }
        self.emit(GraphEvent::ObjectChanged(id));
        self.emit(GraphEvent::ObjectChanged(target));
        true
    }

    fn del_object(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.objects.remove(&id.raw()) else {
            return false;
        };
        for (peer, _) in &object.relations {
            if let Some(entry) = self.objects.get_mut(&peer.raw()) {
                entry.relations.retain(|(t, _)| *t != id);
            }
        }
        for entry in self.classes.values_mut() {
            entry.members.remove(id.raw());
        }
        self.emit(GraphEvent::ObjectDeleted(id));
        true
    }

    fn block_signals(&mut self, blocked: bool) -> bool {
        std::mem::replace(&mut self.signals_blocked, blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relations_are_visible_from_both_ends() {
        let mut g = MemoryGraph::new();
        g.add_class("Sample");
        g.add_class("Detail");
        let a = g.add_member("Sample").unwrap();
        let b = g.add_member("Detail").unwrap();

        g.add_relation(a, b, "Drawn").unwrap();
        g.add_relation(a, b, "Drawn").unwrap();

        assert_eq!(g.object_relations(a), vec![(b, "Drawn".to_string())]);
        assert_eq!(g.object_relations(b), vec![(a, "~Drawn".to_string())]);

        assert!(g.del_relation(b, a, "~Drawn"));
        assert!(g.object_relations(a).is_empty());
        assert!(g.object_relations(b).is_empty());
    }

    #[test]
    fn deleting_an_object_drops_its_edges_and_membership() {
        let mut g = MemoryGraph::new();
        g.add_class("Sample");
        let a = g.add_member("Sample").unwrap();
        let b = g.add_member("Sample").unwrap();
        g.add_relation(a, b, "Next").unwrap();

        assert!(g.del_object(b));
        assert!(!g.del_object(b));
        assert!(g.object_relations(a).is_empty());
        assert_eq!(g.class_members("Sample", true), vec![a]);
        assert!(g.object_classes(b).is_empty());
    }

    #[test]
    fn subclass_members_only_without_direct_only() {
        let mut g = MemoryGraph::new();
        g.add_subclass("Sample", "Sherd");
        let a = g.add_member("Sample").unwrap();
        let b = g.add_member("Sherd").unwrap();

        assert_eq!(g.class_members("Sample", true), vec![a]);
        assert_eq!(g.class_members("Sample", false), vec![a, b]);
    }

    #[test]
    fn object_can_join_a_second_class() {
        let mut g = MemoryGraph::new();
        g.add_class("Sample");
        g.add_class("Site");
        let a = g.add_member("Sample").unwrap();
        g.add_class_member("Site", a).unwrap();

        assert_eq!(g.class_members("Site", true), vec![a]);
        assert!(g.object_classes(a).contains(&"Site".to_string()));
        assert!(g.add_class_member("Region", a).is_err());
    }

    #[test]
    fn class_relations_record_the_reverse_label() {
        let mut g = MemoryGraph::new();
        g.add_class("Sample");
        g.add_class("Detail");
        g.add_class_relation("Sample", "Detail", "Drawn").unwrap();
        g.add_class_relation("Sample", "Detail", "Drawn").unwrap();

        assert_eq!(
            g.class_relations("Sample"),
            vec![("Detail".to_string(), "Drawn".to_string())]
        );
        assert_eq!(
            g.class_relations("Detail"),
            vec![("Sample".to_string(), "~Drawn".to_string())]
        );
    }

    #[test]
    fn blocked_signals_are_not_journaled() {
        let mut g = MemoryGraph::new();
        g.add_class("Sample");
        g.drain_events();

        let previous = g.block_signals(true);
        assert!(!previous);
        g.add_member("Sample").unwrap();
        assert!(g.block_signals(previous));
        assert!(g.drain_events().is_empty());

        let id = g.add_member("Sample").unwrap();
        assert_eq!(g.drain_events(), vec![GraphEvent::ObjectAdded(id)]);
    }
}
