//! Deep copying for Skein value graphs.
//!
//! This crate provides:
//! - [`DeepCopier`] - Identity-preserving, depth-limited graph copy
//! - [`Depth`] - How far below the root a copy detaches
//! - [`assign_matching`] - Property copy onto an existing shell

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod assign;
pub mod copier;

pub use assign::assign_matching;
pub use copier::{DeepCopier, Depth};
