//! Core value type for all Skein data.

use std::borrow::Cow;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};

use crate::identity::Identity;
use crate::registry::{ARRAY, DATE, MAP, OBJECT, SET};

/// Own properties of a record or instance, in insertion order.
pub type Properties = IndexMap<String, Value>;

/// Insertion-ordered hash set of values.
pub type ValueSet = IndexSet<Value>;

/// Insertion-ordered key-value map.
pub type ValueMap = IndexMap<Value, Value>;

/// A point in time, always normalized to UTC.
pub type Timestamp = DateTime<Utc>;

/// Prefix a host wrapper adds to a class name (e.g. `"bound Person"`).
const WRAPPER_PREFIX: &str = "bound ";

// =============================================================================
// Shared
// =============================================================================

/// A reference-counted, interiorly mutable handle to a composite payload.
///
/// Two handles are equal exactly when they point at the same allocation.
/// The payload is never consulted for equality or hashing.
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    /// Allocates a new handle around `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Immutably borrows the payload.
    ///
    /// # Panics
    ///
    /// Panics if the payload is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrows the payload.
    ///
    /// # Panics
    ///
    /// Panics if the payload is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Returns true if both handles point at the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the identity of the allocation behind this handle.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::from_ptr(Rc::as_ptr(&self.0))
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Shared<T> {}

impl<T> Hash for Shared<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:?})", self.identity())
    }
}

// =============================================================================
// Instance
// =============================================================================

/// An instance of a registered class.
#[derive(Clone, Debug, Default)]
pub struct Instance {
    /// Runtime class name, possibly carrying a wrapper prefix.
    pub class: Arc<str>,
    /// Own properties.
    pub properties: Properties,
    /// Marks the instance as managed by a host framework.
    pub managed: bool,
}

impl Instance {
    /// Creates an instance of `class` with no properties.
    #[must_use]
    pub fn new(class: impl Into<Arc<str>>) -> Self {
        Self {
            class: class.into(),
            properties: Properties::new(),
            managed: false,
        }
    }

    /// Builder method to set a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Builder method to mark the instance as managed.
    #[must_use]
    pub fn with_managed(mut self, managed: bool) -> Self {
        self.managed = managed;
        self
    }

    /// Returns the class name with any wrapper prefix removed.
    #[must_use]
    pub fn class_name(&self) -> &str {
        strip_wrapper_prefix(&self.class)
    }
}

/// Removes host wrapper prefixes (`"bound bound Foo"` -> `"Foo"`).
#[must_use]
pub fn strip_wrapper_prefix(name: &str) -> &str {
    let mut name = name;
    while let Some(rest) = name.strip_prefix(WRAPPER_PREFIX) {
        name = rest;
    }
    name
}

// =============================================================================
// Value
// =============================================================================

/// Core value type for all Skein data.
///
/// Primitives are compared and hashed by value. Composites are reference
/// types: cloning a composite clones the handle, and equality is identity.
/// Use [`Value::structurally_eq`](crate::equality) to compare graphs.
#[derive(Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(Arc<str>),
    /// Ordered sequence.
    Seq(Shared<Vec<Value>>),
    /// Insertion-ordered hash set.
    Set(Shared<ValueSet>),
    /// Insertion-ordered key-value map.
    Map(Shared<ValueMap>),
    /// Timestamp.
    Timestamp(Shared<Timestamp>),
    /// Instance of a class.
    Instance(Shared<Instance>),
    /// Plain record with no class.
    Record(Shared<Properties>),
}

impl Value {
    /// Creates a new sequence from the given elements.
    pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Seq(Shared::new(items.into_iter().collect()))
    }

    /// Creates a new set from the given members.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Set(Shared::new(items.into_iter().collect()))
    }

    /// Creates a new map from the given entries.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::Map(Shared::new(entries.into_iter().collect()))
    }

    /// Creates a new timestamp.
    #[must_use]
    pub fn timestamp(at: Timestamp) -> Self {
        Self::Timestamp(Shared::new(at))
    }

    /// Creates a new record from the given properties.
    pub fn record<K: Into<String>>(props: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Record(Shared::new(
            props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Wraps an instance in a new handle.
    #[must_use]
    pub fn instance(instance: Instance) -> Self {
        Self::Instance(Shared::new(instance))
    }

    /// Returns true for every variant that has identity.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        !matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_)
        )
    }

    /// Returns true if this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the identity of a composite value.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_) => None,
            Self::Seq(s) => Some(s.identity()),
            Self::Set(s) => Some(s.identity()),
            Self::Map(m) => Some(m.identity()),
            Self::Timestamp(t) => Some(t.identity()),
            Self::Instance(i) => Some(i.identity()),
            Self::Record(r) => Some(r.identity()),
        }
    }

    /// Returns true if both values denote the same composite.
    #[must_use]
    pub fn same_identity(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Returns the runtime type name used for registry lookup.
    ///
    /// Instances report their class name with wrapper prefixes stripped.
    #[must_use]
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            Self::Null => Cow::Borrowed("null"),
            Self::Bool(_) => Cow::Borrowed("boolean"),
            Self::Int(_) | Self::Float(_) => Cow::Borrowed("number"),
            Self::String(_) => Cow::Borrowed("string"),
            Self::Seq(_) => Cow::Borrowed(ARRAY),
            Self::Set(_) => Cow::Borrowed(SET),
            Self::Map(_) => Cow::Borrowed(MAP),
            Self::Timestamp(_) => Cow::Borrowed(DATE),
            Self::Record(_) => Cow::Borrowed(OBJECT),
            Self::Instance(i) => Cow::Owned(i.borrow().class_name().to_string()),
        }
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a sequence handle.
    #[must_use]
    pub const fn as_seq(&self) -> Option<&Shared<Vec<Value>>> {
        match self {
            Self::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a set handle.
    #[must_use]
    pub const fn as_set(&self) -> Option<&Shared<ValueSet>> {
        match self {
            Self::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a map handle.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Shared<ValueMap>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Attempts to extract a timestamp handle.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<&Shared<Timestamp>> {
        match self {
            Self::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// Attempts to extract an instance handle.
    #[must_use]
    pub const fn as_instance(&self) -> Option<&Shared<Instance>> {
        match self {
            Self::Instance(i) => Some(i),
            _ => None,
        }
    }

    /// Attempts to extract a record handle.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Shared<Properties>> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Reads a named property of a record or instance.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<Value> {
        match self {
            Self::Record(r) => r.borrow().get(name).cloned(),
            Self::Instance(i) => i.borrow().properties.get(name).cloned(),
            _ => None,
        }
    }

    /// Sets a named property on a record or instance.
    ///
    /// Returns false (and does nothing) for any other variant.
    pub fn set_property(&self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        match self {
            Self::Record(r) => {
                r.borrow_mut().insert(name.into(), value.into());
                true
            }
            Self::Instance(i) => {
                i.borrow_mut().properties.insert(name.into(), value.into());
                true
            }
            _ => false,
        }
    }

    /// Sets a property during shell population.
    ///
    /// The assignment is skipped when the shell already defines `name` as a
    /// non-null value (for example a member supplied by a class recipe).
    /// Returns true if the property was written.
    pub fn assign_unless_defined(&self, name: &str, value: Value) -> bool {
        match self {
            Self::Record(r) => assign_into(&mut r.borrow_mut(), name, value),
            Self::Instance(i) => assign_into(&mut i.borrow_mut().properties, name, value),
            _ => false,
        }
    }
}

fn assign_into(props: &mut Properties, name: &str, value: Value) -> bool {
    if props.get(name).is_some_and(|existing| !existing.is_null()) {
        log::debug!("shell already defines {name}; keeping existing value");
        return false;
    }
    props.insert(name.to_string(), value);
    true
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            _ => self.same_identity(other),
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Float(n) => n.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::Seq(s) => s.hash(state),
            Self::Set(s) => s.hash(state),
            Self::Map(m) => m.hash(state),
            Self::Timestamp(t) => t.hash(state),
            Self::Instance(i) => i.hash(state),
            Self::Record(r) => r.hash(state),
        }
    }
}

// =============================================================================
// Debug
// =============================================================================

/// Debug view that prints composites until it meets an ancestor again.
struct GraphDebug<'a> {
    value: &'a Value,
    ancestors: &'a RefCell<HashSet<Identity>>,
}

impl GraphDebug<'_> {
    fn child<'b>(&'b self, value: &'b Value) -> GraphDebug<'b> {
        GraphDebug {
            value,
            ancestors: self.ancestors,
        }
    }
}

impl fmt::Debug for GraphDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(id) = self.value.identity() else {
            return match self.value {
                Value::Null => write!(f, "null"),
                Value::Bool(b) => write!(f, "{b}"),
                Value::Int(n) => write!(f, "{n}"),
                Value::Float(n) => write!(f, "{n:?}"),
                Value::String(s) => write!(f, "{s:?}"),
                _ => Ok(()),
            };
        };
        if !self.ancestors.borrow_mut().insert(id) {
            return write!(f, "<cycle {}>", self.value.type_name());
        }
        let result = match self.value {
            Value::Seq(s) => f
                .debug_list()
                .entries(s.borrow().iter().map(|v| self.child(v)))
                .finish(),
            Value::Set(s) => {
                write!(f, "#")?;
                f.debug_set()
                    .entries(s.borrow().iter().map(|v| self.child(v)))
                    .finish()
            }
            Value::Map(m) => f
                .debug_map()
                .entries(m.borrow().iter().map(|(k, v)| (self.child(k), self.child(v))))
                .finish(),
            Value::Timestamp(t) => write!(f, "Date({})", t.borrow().to_rfc3339()),
            Value::Instance(i) => {
                let instance = i.borrow();
                let mut s = f.debug_struct(&instance.class);
                for (k, v) in &instance.properties {
                    s.field(k, &self.child(v));
                }
                s.finish()
            }
            Value::Record(r) => {
                let props = r.borrow();
                let mut s = f.debug_struct("Object");
                for (k, v) in props.iter() {
                    s.field(k, &self.child(v));
                }
                s.finish()
            }
            _ => Ok(()),
        };
        self.ancestors.borrow_mut().remove(&id);
        result
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ancestors = RefCell::new(HashSet::new());
        fmt::Debug::fmt(
            &GraphDebug {
                value: self,
                ancestors: &ancestors,
            },
            f,
        )
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<Timestamp> for Value {
    fn from(at: Timestamp) -> Self {
        Self::timestamp(at)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::instance(instance)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::seq(v.into_iter().map(Into::into))
    }
}
