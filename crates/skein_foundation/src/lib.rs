//! Core values, identity tracking, class registry, and errors for Skein.
//!
//! This crate provides:
//! - [`Value`] - The value type flowing through every traversal
//! - [`Shared`] - Identity-carrying handles for composite values
//! - [`ClassRegistry`] - Type name to construction recipe mapping
//! - [`VisitedTable`] / [`ReferenceTable`] - Per-traversal identity tables
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod equality;
pub mod error;
pub mod identity;
pub mod registry;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use identity::{Identity, ReferenceTable, VisitedTable};
pub use registry::{ClassRecipe, ClassRegistry, Recipe};
pub use value::{Instance, Properties, Shared, Timestamp, Value, ValueMap, ValueSet};
