//! Registry of recognized composite kinds.
//!
//! Maps a runtime type name to the recipe used to allocate an empty shell
//! of that kind. The built-in kinds are registered on construction; further
//! classes may be registered at any time. Registration is append-only and
//! the last writer for a name wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::value::{Instance, Properties, Shared, Timestamp, Value, ValueMap, ValueSet};

/// Type name of ordered sequences.
pub const ARRAY: &str = "Array";
/// Type name of hash sets.
pub const SET: &str = "Set";
/// Type name of key-value maps.
pub const MAP: &str = "Map";
/// Type name of timestamps.
pub const DATE: &str = "Date";
/// Type name of plain records.
pub const OBJECT: &str = "Object";

/// Produces the members every fresh instance of a class starts with.
pub type MemberFactory = Arc<dyn Fn() -> Properties + Send + Sync>;

// =============================================================================
// Recipe
// =============================================================================

/// How to build and recognise one kind of composite.
#[derive(Clone, Debug)]
pub enum Recipe {
    /// Ordered sequence.
    Sequence,
    /// Insertion-ordered hash set.
    Set,
    /// Insertion-ordered key-value map.
    Map,
    /// Timestamp.
    Timestamp,
    /// Plain record.
    Record,
    /// Registered class.
    Class(ClassRecipe),
}

impl Recipe {
    /// Allocates an empty shell of this kind.
    ///
    /// Timestamp shells start at the Unix epoch and are expected to be
    /// overwritten by the caller. Class shells carry the class members.
    #[must_use]
    pub fn allocate(&self) -> Value {
        match self {
            Self::Sequence => Value::Seq(Shared::new(Vec::new())),
            Self::Set => Value::Set(Shared::new(ValueSet::new())),
            Self::Map => Value::Map(Shared::new(ValueMap::new())),
            Self::Timestamp => Value::Timestamp(Shared::new(Timestamp::UNIX_EPOCH)),
            Self::Record => Value::Record(Shared::new(Properties::new())),
            Self::Class(class) => Value::instance(class.allocate()),
        }
    }

    /// Returns true if `value` is an instance of this kind.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Sequence, Value::Seq(_))
            | (Self::Set, Value::Set(_))
            | (Self::Map, Value::Map(_))
            | (Self::Timestamp, Value::Timestamp(_))
            | (Self::Record, Value::Record(_)) => true,
            (Self::Class(class), Value::Instance(i)) => i.borrow().class_name() == class.name(),
            _ => false,
        }
    }
}

/// Recipe for a registered class.
#[derive(Clone)]
pub struct ClassRecipe {
    name: Arc<str>,
    members: Option<MemberFactory>,
}

impl ClassRecipe {
    /// Creates a recipe for a class whose shells start with no members.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            members: None,
        }
    }

    /// Builder method to supply the members of every fresh shell.
    ///
    /// Decoding never overwrites a member the factory defines as non-null.
    #[must_use]
    pub fn with_members(
        mut self,
        members: impl Fn() -> Properties + Send + Sync + 'static,
    ) -> Self {
        self.members = Some(Arc::new(members));
        self
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allocates a blank instance. No constructor logic runs.
    #[must_use]
    pub fn allocate(&self) -> Instance {
        Instance {
            class: Arc::clone(&self.name),
            properties: self.members.as_ref().map(|m| m()).unwrap_or_default(),
            managed: false,
        }
    }
}

impl fmt::Debug for ClassRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRecipe")
            .field("name", &self.name)
            .field("members", &self.members.is_some())
            .finish()
    }
}

// =============================================================================
// ClassRegistry
// =============================================================================

/// Registry for looking up kinds by runtime type name.
#[derive(Clone, Debug)]
pub struct ClassRegistry {
    /// Map from type name to recipe.
    entries: HashMap<String, Recipe>,
}

impl ClassRegistry {
    /// Creates a registry with the built-in kinds pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };
        registry.register(ARRAY, Recipe::Sequence);
        registry.register(SET, Recipe::Set);
        registry.register(MAP, Recipe::Map);
        registry.register(DATE, Recipe::Timestamp);
        registry.register(OBJECT, Recipe::Record);
        registry
    }

    /// Registers a recipe under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, recipe: Recipe) {
        let name = name.into();
        if self.entries.insert(name.clone(), recipe).is_some() {
            log::debug!("class registry: replaced entry for {name}");
        }
    }

    /// Registers a class under its own name.
    pub fn register_class(&mut self, class: ClassRecipe) {
        let name = class.name().to_string();
        self.register(name, Recipe::Class(class));
    }

    /// Looks up a recipe by type name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Recipe> {
        self.entries.get(name)
    }

    /// Checks if a recipe is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns all registered names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Resolves the kind of a composite value.
    ///
    /// Returns the type name and recipe when `value`'s runtime type name is
    /// registered and the recipe recognises the value. Primitives and
    /// unregistered classes yield `None`.
    #[must_use]
    pub fn kind_of(&self, value: &Value) -> Option<(String, &Recipe)> {
        if !value.is_composite() {
            return None;
        }
        let name = value.type_name();
        let recipe = self.lookup(&name)?;
        recipe.matches(value).then(|| (name.into_owned(), recipe))
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Process-wide registry
// =============================================================================

fn global() -> &'static RwLock<ClassRegistry> {
    static GLOBAL: OnceLock<RwLock<ClassRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(ClassRegistry::new()))
}

/// Read access to the process-wide registry.
///
/// Hold the guard for the duration of one traversal.
pub fn read_global() -> RwLockReadGuard<'static, ClassRegistry> {
    global().read().unwrap_or_else(|poisoned| {
        log::warn!("class registry lock poisoned; continuing with last state");
        PoisonError::into_inner(poisoned)
    })
}

fn write_global() -> RwLockWriteGuard<'static, ClassRegistry> {
    global().write().unwrap_or_else(|poisoned| {
        log::warn!("class registry lock poisoned; continuing with last state");
        PoisonError::into_inner(poisoned)
    })
}

/// Registers a recipe in the process-wide registry.
pub fn register_global(name: impl Into<String>, recipe: Recipe) {
    write_global().register(name, recipe);
}

/// Registers a class in the process-wide registry.
pub fn register_global_class(class: ClassRecipe) {
    write_global().register_class(class);
}
