//! Per-traversal identity tables.
//!
//! A [`VisitedTable`] maps the identity of a source composite to whatever
//! the traversal produced for it (an id string, a copy). A
//! [`ReferenceTable`] maps encoded ids back to reconstructed values.
//! Both live for exactly one top-level call.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Address of a composite allocation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    /// Creates an identity from a raw allocation pointer.
    #[must_use]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr.addr())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{:#x}", self.0)
    }
}

// =============================================================================
// VisitedTable
// =============================================================================

/// Identity-keyed table of traversal results.
///
/// The table holds a handle to every source it records, so an address
/// cannot be freed and reused by a different value during the traversal.
pub struct VisitedTable<T> {
    entries: HashMap<Identity, (Value, T)>,
}

impl<T> VisitedTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Number of identities recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry recorded for `value`'s identity.
    ///
    /// Primitives never have an entry.
    #[must_use]
    pub fn get(&self, value: &Value) -> Option<&T> {
        let id = value.identity()?;
        self.entries.get(&id).map(|(_, entry)| entry)
    }

    /// Returns true if `value`'s identity has been recorded.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.get(value).is_some()
    }

    /// Records `entry` for `value`'s identity.
    ///
    /// The first record wins: returns false and leaves the table unchanged
    /// if the identity is already present or `value` is a primitive.
    pub fn insert(&mut self, value: &Value, entry: T) -> bool {
        let Some(id) = value.identity() else {
            return false;
        };
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, (value.clone(), entry));
        true
    }
}

impl<T> Default for VisitedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for VisitedTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(id, (_, entry))| (id, entry)))
            .finish()
    }
}

// =============================================================================
// ReferenceTable
// =============================================================================

/// Id-keyed table of reconstructed values, used while decoding.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    values: HashMap<String, Value>,
}

impl ReferenceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Records the shell reconstructed for `id`.
    ///
    /// A repeated id keeps its first shell.
    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.values.entry(id.into()).or_insert(value);
    }

    /// Resolves a back-reference.
    ///
    /// # Errors
    ///
    /// Returns a dangling reference error if `id` was never recorded.
    pub fn resolve(&self, id: &str) -> Result<Value> {
        self.values
            .get(id)
            .cloned()
            .ok_or_else(|| Error::dangling_reference(id))
    }
}
