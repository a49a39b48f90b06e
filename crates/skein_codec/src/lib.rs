//! Graph encoder and decoder for Skein.
//!
//! This crate provides:
//! - [`Encoder`] - Live value graph to tagged JSON text
//! - [`Decoder`] - Tagged JSON text back to a live value graph
//! - [`CodecConfig`] - Output options
//!
//! Composites are tagged with their kind and a document-unique id; a
//! composite reached a second time is written as a back-reference to that
//! id, so shared structure and cycles survive a round trip.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod node;

pub use config::CodecConfig;
pub use decoder::Decoder;
pub use encoder::Encoder;
