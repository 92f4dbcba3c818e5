//! Per-derivation handler state.
//!
//! A `HandlerState` is never mutated after construction. Deriving builds a
//! new attribute or group sequence and leaves the parent's untouched; the
//! sequences sit behind `Arc` only so cloning a handler for a scheduled
//! dispatch stays cheap.

use std::sync::Arc;

use crate::handler::consolidate;
use crate::record::Attr;

/// Accumulated attributes and group stack of one handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerState {
    attrs: Arc<Vec<Attr>>,
    groups: Arc<Vec<String>>,
}

impl HandlerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes accumulated through derivation, already group-scoped.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Group stack, outermost first.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Innermost group, if any.
    pub fn active_group(&self) -> Option<&str> {
        self.groups.last().map(String::as_str)
    }

    /// Derive a state with `attrs` added under the active group, or flat when
    /// no group is active.
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }

        let mut next = Vec::with_capacity(self.attrs.len() + attrs.len());
        next.extend(self.attrs.iter().cloned());
        next.extend(consolidate::scope(self.active_group(), attrs));

        Self {
            attrs: Arc::new(next),
            groups: Arc::clone(&self.groups),
        }
    }

    /// Derive a state with `name` pushed as the active group.
    /// An empty name yields an identical state.
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }

        let mut groups = Vec::with_capacity(self.groups.len() + 1);
        groups.extend(self.groups.iter().cloned());
        groups.push(name.to_string());

        Self {
            attrs: Arc::clone(&self.attrs),
            groups: Arc::new(groups),
        }
    }

    /// Merge this state with a record's attributes.
    pub fn consolidate(&self, record_attrs: &[Attr]) -> Vec<Attr> {
        consolidate::consolidate(&self.attrs, self.active_group(), record_attrs)
    }
}
