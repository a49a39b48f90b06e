//! Skein - Object graph serialization and deep copy
//!
//! This crate re-exports all layers of the Skein system and binds the
//! encoder, decoder, and copier to one process-wide class registry.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: skein_codec      - Tagged JSON encoder and decoder
//!          skein_copy       - Depth-limited deep copy
//! Layer 0: skein_foundation - Core types (Value, ClassRegistry, Error)
//! ```
//!
//! # Example
//!
//! ```
//! use skein::foundation::Value;
//!
//! let shared = Value::seq([Value::Int(1)]);
//! let root = Value::record([("a", shared.clone()), ("b", shared)]);
//!
//! let text = skein::serialize(&root).unwrap();
//! let back = skein::deserialize(&text).unwrap();
//! let (a, b) = (back.property("a").unwrap(), back.property("b").unwrap());
//! assert!(a.same_identity(&b));
//! ```

pub use skein_codec as codec;
pub use skein_copy as copy;
pub use skein_foundation as foundation;

use std::sync::RwLockReadGuard;

use skein_codec::{Decoder, Encoder};
use skein_copy::{DeepCopier, Depth};
use skein_foundation::registry::{read_global, register_global, register_global_class};
use skein_foundation::{ClassRecipe, ClassRegistry, Recipe, Result, Value};

/// Read access to the process-wide class registry.
pub fn global_registry() -> RwLockReadGuard<'static, ClassRegistry> {
    read_global()
}

/// Registers a recipe under `name` in the process-wide registry.
///
/// A previous entry under the same name is replaced.
pub fn register(name: impl Into<String>, recipe: Recipe) {
    register_global(name, recipe);
}

/// Registers a class in the process-wide registry.
pub fn register_class(class: ClassRecipe) {
    register_global_class(class);
}

/// Serializes `value` to JSON text using the process-wide registry.
///
/// # Errors
///
/// Returns a serialization error if the encoded tree cannot be rendered.
pub fn serialize(value: &Value) -> Result<String> {
    Encoder::new(&global_registry()).serialize(value)
}

/// Rebuilds a value from JSON text using the process-wide registry.
///
/// # Errors
///
/// Returns a parse error for malformed text and a dangling reference error
/// for a back-reference to an unknown id.
pub fn deserialize(text: &str) -> Result<Value> {
    Decoder::new(&global_registry()).deserialize(text)
}

/// Copies the whole graph reachable from `value`.
#[must_use]
pub fn copy(value: &Value) -> Value {
    copy_with_depth(value, Depth::Unlimited)
}

/// Copies `value` down to `depth` using the process-wide registry.
#[must_use]
pub fn copy_with_depth(value: &Value, depth: impl Into<Depth>) -> Value {
    DeepCopier::new(&global_registry()).copy(value, depth.into())
}
