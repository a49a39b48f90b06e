//! Configuration for encoding.

use serde::{Deserialize, Serialize};

/// Configuration for the encoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Render indented, multi-line text.
    pub pretty: bool,

    /// Write the managed marker for managed instances.
    pub emit_managed: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            emit_managed: true,
        }
    }
}

impl CodecConfig {
    /// Creates a configuration for human-readable output.
    #[must_use]
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Builder method to set pretty printing.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Builder method to enable/disable the managed marker.
    #[must_use]
    pub fn with_emit_managed(mut self, emit: bool) -> Self {
        self.emit_managed = emit;
        self
    }
}
