//! Scoped suppression of store change signals.

use crate::GraphStore;
use std::ops::{Deref, DerefMut};

/// Blocks the store's signals for as long as the guard lives and restores
/// the previous state on drop, so guards nest.
///
/// This only hides intermediate states from observers; nothing is rolled
/// back if the guarded work fails part way.
pub struct SignalGuard<'a, S: GraphStore + ?Sized> {
    store: &'a mut S,
    previous: bool,
}

impl<'a, S: GraphStore + ?Sized> SignalGuard<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        let previous = store.block_signals(true);
        Self { store, previous }
    }
}

impl<S: GraphStore + ?Sized> Deref for SignalGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.store
    }
}

impl<S: GraphStore + ?Sized> DerefMut for SignalGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.store
    }
}

impl<S: GraphStore + ?Sized> Drop for SignalGuard<'_, S> {
    fn drop(&mut self) {
        self.store.block_signals(self.previous);
    }
}
