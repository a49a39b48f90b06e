//! Cross-layer integration tests for Skein
//!
//! Tests that drive the codec and copier together through the root crate
//! and its process-wide registry.

mod global;
