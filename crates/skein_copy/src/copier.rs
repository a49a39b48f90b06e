//! Depth-limited deep copy.
//!
//! The copier walks a graph the same way the encoder does: it keys every
//! composite it reaches by identity, and a composite reached a second time
//! yields the copy already produced for it. Shared structure and cycles in
//! the source therefore appear with the same topology in the copy.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use skein_foundation::{ClassRegistry, Recipe, Value, VisitedTable};

/// How many levels of composites a copy detaches from its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Depth {
    /// Copy the whole reachable graph.
    #[default]
    Unlimited,
    /// Copy the root plus this many levels below it. Composites further
    /// down are shared with the source.
    Levels(u32),
}

impl Depth {
    /// A copy of only the top composite; its children are shared.
    #[must_use]
    pub const fn shallow() -> Self {
        Self::Levels(0)
    }

    /// The remaining budget for the top-level call.
    const fn top(self) -> Self {
        match self {
            Self::Unlimited => Self::Unlimited,
            Self::Levels(n) => Self::Levels(n.saturating_add(1)),
        }
    }

    const fn descend(self) -> Self {
        match self {
            Self::Unlimited => Self::Unlimited,
            Self::Levels(n) => Self::Levels(n.saturating_sub(1)),
        }
    }

    const fn is_exhausted(self) -> bool {
        matches!(self, Self::Levels(0))
    }
}

impl From<u32> for Depth {
    fn from(levels: u32) -> Self {
        Self::Levels(levels)
    }
}

/// Produces deep copies of value graphs.
#[derive(Clone, Copy, Debug)]
pub struct DeepCopier<'r> {
    registry: &'r ClassRegistry,
}

impl<'r> DeepCopier<'r> {
    /// Creates a copier that resolves kinds against `registry`.
    #[must_use]
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Self { registry }
    }

    /// Copies `root` down to `depth`.
    ///
    /// Primitives are returned unchanged. With [`Depth::shallow`] the result
    /// is a new top shell whose children are the source's own children.
    #[must_use]
    pub fn copy(&self, root: &Value, depth: Depth) -> Value {
        let mut walk = CopyWalk {
            registry: self.registry,
            seen: VisitedTable::new(),
        };
        let copy = walk.copy_node(root, depth.top());
        log::trace!("copied {} composite(s)", walk.seen.len());
        copy
    }
}

/// State of one top-level copy call.
struct CopyWalk<'a> {
    registry: &'a ClassRegistry,
    seen: VisitedTable<Value>,
}

impl CopyWalk<'_> {
    fn copy_node(&mut self, value: &Value, level: Depth) -> Value {
        if !value.is_composite() {
            return value.clone();
        }
        if let Some(copy) = self.seen.get(value) {
            return copy.clone();
        }
        if level.is_exhausted() {
            return value.clone();
        }

        let Some(shell) = self.allocate(value) else {
            log::debug!(
                "no registered kind for {}; sharing the original",
                value.type_name()
            );
            return value.clone();
        };
        // Recorded before descending so that cycles land on this shell.
        self.seen.insert(value, shell.clone());
        self.populate(&shell, value, level.descend());
        shell
    }

    /// Allocates an empty shell for `value`, or `None` for an instance
    /// whose class is not registered.
    fn allocate(&self, value: &Value) -> Option<Value> {
        let shell = match (value, self.registry.kind_of(value)) {
            (Value::Timestamp(at), _) => Value::timestamp(*at.borrow()),
            (_, Some((_, recipe))) => recipe.allocate(),
            (Value::Seq(_), None) => Recipe::Sequence.allocate(),
            (Value::Set(_), None) => Recipe::Set.allocate(),
            (Value::Map(_), None) => Recipe::Map.allocate(),
            (Value::Record(_), None) => Recipe::Record.allocate(),
            _ => return None,
        };
        if let (Value::Instance(source), Value::Instance(target)) = (value, &shell) {
            target.borrow_mut().managed = source.borrow().managed;
        }
        Some(shell)
    }

    fn populate(&mut self, shell: &Value, source: &Value, level: Depth) {
        match (shell, source) {
            (Value::Seq(target), Value::Seq(items)) => {
                let items = items.borrow().clone();
                for item in &items {
                    let copy = self.copy_node(item, level);
                    target.borrow_mut().push(copy);
                }
            }
            (Value::Set(target), Value::Set(members)) => {
                let members = members.borrow().clone();
                for member in &members {
                    let copy = self.copy_node(member, level);
                    target.borrow_mut().insert(copy);
                }
            }
            (Value::Map(target), Value::Map(entries)) => {
                let entries = entries.borrow().clone();
                for (key, value) in &entries {
                    let key = self.copy_node(key, level);
                    let value = self.copy_node(value, level);
                    target.borrow_mut().insert(key, value);
                }
            }
            (_, Value::Record(props)) => {
                let props = props.borrow().clone();
                for (name, value) in &props {
                    let copy = self.copy_node(value, level);
                    shell.assign_unless_defined(name, copy);
                }
            }
            (_, Value::Instance(instance)) => {
                let props = instance.borrow().properties.clone();
                for (name, value) in &props {
                    let copy = self.copy_node(value, level);
                    shell.assign_unless_defined(name, copy);
                }
            }
            _ => {}
        }
    }
}
