//! Class loader → namespace registry.
//!
//! Entries hold a [`Weak`] reference to the class loader so the registry
//! never keeps one alive. A class loader that has been dropped simply stops
//! matching; its entry is never reaped and never reused.

use crate::handle::NamespaceHandle;
use std::sync::{Arc, Weak};

/// Host view of a class loader: identity plus its parent chain.
pub trait ClassLoader {
    /// The delegation parent, or `None` at the boot class loader.
    fn parent(&self) -> Option<Arc<Self>>;
}

/// Namespaces created so far, in creation order.
#[derive(Debug)]
pub struct NamespaceRegistry<C> {
    entries: Vec<(Weak<C>, NamespaceHandle)>,
}

impl<C> Default for NamespaceRegistry<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C: ClassLoader> NamespaceRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace registered for exactly this class loader.
    pub fn find(&self, class_loader: &Arc<C>) -> Option<&NamespaceHandle> {
        self.entries
            .iter()
            .find(|(weak, _)| is_same(weak, class_loader))
            .map(|(_, handle)| handle)
    }

    /// Namespace of the nearest registered ancestor of `class_loader`.
    /// `class_loader` itself is not considered.
    pub fn find_parent(&self, class_loader: &Arc<C>) -> Option<&NamespaceHandle> {
        let mut ancestor = class_loader.parent();
        while let Some(current) = ancestor {
            if let Some(handle) = self.find(&current) {
                return Some(handle);
            }
            ancestor = current.parent();
        }
        None
    }

    /// Appends an entry. Callers check [`Self::find`] first; duplicates are
    /// not detected here.
    pub fn insert(&mut self, class_loader: &Arc<C>, handle: NamespaceHandle) -> &NamespaceHandle {
        self.entries.push((Arc::downgrade(class_loader), handle));
        let (_, handle) = &self.entries[self.entries.len() - 1];
        handle
    }

    /// Total entries, including those whose class loader is gone.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose class loader is still alive.
    pub fn live_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|(weak, _)| weak.strong_count() > 0)
            .count()
    }
}

fn is_same<C>(weak: &Weak<C>, class_loader: &Arc<C>) -> bool {
    weak.strong_count() > 0 && std::ptr::eq(weak.as_ptr(), Arc::as_ptr(class_loader))
}
