use std::sync::Arc;

use crate::catalog::CountryCatalog;
use crate::resolver::{ResolvedRecord, resolve};

/// The (identifier, name) pair of the selected region. Both absent means no selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub identifier: Option<String>,
    pub name: Option<String>,
}

impl Selection {
    pub fn new(identifier: Option<String>, name: Option<String>) -> Self {
        Self { identifier, name }
    }

    pub fn is_empty(&self) -> bool {
        self.identifier.is_none() && self.name.is_none()
    }
}

/// Single source of truth for hover and selection. The resolved record is
/// memoized on the selection pair.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    catalog: Arc<CountryCatalog>,
    hovered: Option<String>,
    selection: Selection,
    resolved: Option<ResolvedRecord>,
    resolve_passes: u64,
}

impl InteractionState {
    pub fn new(catalog: Arc<CountryCatalog>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn resolved(&self) -> Option<&ResolvedRecord> {
        self.resolved.as_ref()
    }

    /// How many times the resolver has run.
    pub fn resolve_passes(&self) -> u64 {
        self.resolve_passes
    }

    pub fn set_hover(&mut self, identifier: Option<String>) {
        self.hovered = identifier;
    }

    /// Replace the selection atomically. Re-selecting the same pair reuses the record.
    pub fn set_selection(&mut self, identifier: Option<String>, name: Option<String>) {
        let next = Selection::new(identifier, name);
        if next == self.selection {
            return;
        }
        self.selection = next;
        self.refresh();
    }

    /// Clears identifier and name together, never just the record.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
        self.resolved = None;
    }

    /// Swap the metadata dataset (e.g. once it finishes loading).
    pub fn set_catalog(&mut self, catalog: Arc<CountryCatalog>) {
        self.catalog = catalog;
        self.refresh();
    }

    fn refresh(&mut self) {
        if self.selection.is_empty() {
            self.resolved = None;
            return;
        }
        self.resolve_passes += 1;
        self.resolved = resolve(
            &self.catalog,
            self.selection.identifier.as_deref(),
            self.selection.name.as_deref(),
        );
    }
}
