//! Notification seams
//!
//! Every hook has a no-op default, so implementors override only what they
//! listen to.

use crate::settings::{AttributeBinding, DescriptorBinding};
use lapdata_graph::ObjectId;
use std::collections::BTreeSet;

pub trait ModelObserver {
    fn on_set_descriptors(&mut self, _descriptors: &[DescriptorBinding]) {}

    fn on_set_attributes(&mut self, _attributes: &[AttributeBinding]) {}

    fn on_changed(&mut self, _objects: &BTreeSet<ObjectId>, _classes: &BTreeSet<String>) {}

    fn on_added(&mut self, _objects: &BTreeSet<ObjectId>, _classes: &BTreeSet<String>) {}

    fn on_deleted(&mut self, _objects: &BTreeSet<ObjectId>, _classes: &BTreeSet<String>) {}
}

/// Progress reporting for long writes. Calls are advisory; nothing here can
/// cancel an operation.
pub trait Progress {
    fn show(&mut self, _label: &str) {}

    fn update_state(&mut self, _value: usize, _maximum: Option<usize>) {}

    fn stop(&mut self) {}
}
