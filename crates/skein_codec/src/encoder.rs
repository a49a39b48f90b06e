//! Graph encoder.
//!
//! Walks a live value graph in pre-order and produces a tree of JSON nodes.
//! Every composite receives an id the first time it is reached; every later
//! encounter (a shared reference or a cycle) becomes a back-reference.

use chrono::SecondsFormat;
use serde_json::{Map, Number, Value as Json};
use skein_foundation::registry::OBJECT;
use skein_foundation::{ClassRegistry, Error, Properties, Result, Value, VisitedTable};

use crate::config::CodecConfig;
use crate::node::{
    ENTRIES_KEY, ISO_KEY, ITEMS_KEY, MANAGED_KEY, PROPS_KEY, back_reference, tagged,
};

/// Encodes value graphs against a class registry.
#[derive(Clone, Debug)]
pub struct Encoder<'r> {
    registry: &'r ClassRegistry,
    config: CodecConfig,
}

impl<'r> Encoder<'r> {
    /// Creates an encoder with the default configuration.
    #[must_use]
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Self {
            registry,
            config: CodecConfig::default(),
        }
    }

    /// Builder method to set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes `root` into a JSON node tree.
    #[must_use]
    pub fn encode(&self, root: &Value) -> Json {
        let mut walk = EncodeWalk {
            registry: self.registry,
            config: &self.config,
            visited: VisitedTable::new(),
        };
        let tree = walk.encode_node(root);
        log::trace!("encoded {} composite(s)", walk.visited.len());
        tree
    }

    /// Encodes `root` and renders it as JSON text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the tree cannot be rendered.
    pub fn serialize(&self, root: &Value) -> Result<String> {
        let tree = self.encode(root);
        let text = if self.config.pretty {
            serde_json::to_string_pretty(&tree)
        } else {
            serde_json::to_string(&tree)
        };
        text.map_err(|e| Error::serialization(e.to_string()))
    }
}

/// State of one top-level encode call.
struct EncodeWalk<'a> {
    registry: &'a ClassRegistry,
    config: &'a CodecConfig,
    visited: VisitedTable<String>,
}

impl EncodeWalk<'_> {
    fn encode_node(&mut self, value: &Value) -> Json {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            // Non-finite floats have no JSON spelling.
            Value::Float(n) => Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Value::String(s) => Json::String(s.to_string()),
            _ => self.encode_composite(value),
        }
    }

    fn encode_composite(&mut self, value: &Value) -> Json {
        if let Some(id) = self.visited.get(value) {
            log::trace!("back-reference to {id}");
            return back_reference(id);
        }

        let kind = match self.registry.kind_of(value) {
            Some((name, _)) => name,
            None => self.fallback_kind(value),
        };

        // Recorded before descending so that children can refer back to it.
        let id = format!("{kind}_{}", self.visited.len());
        self.visited.insert(value, id.clone());
        log::trace!("assigned {id}");

        let mut node = tagged(&kind, &id);
        match value {
            Value::Seq(items) => {
                let items = items.borrow().iter().map(|v| self.encode_node(v)).collect();
                node.insert(ITEMS_KEY.to_string(), Json::Array(items));
            }
            Value::Set(members) => {
                let items = members.borrow().iter().map(|v| self.encode_node(v)).collect();
                node.insert(ITEMS_KEY.to_string(), Json::Array(items));
            }
            Value::Map(entries) => {
                let entries = entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| Json::Array(vec![self.encode_node(k), self.encode_node(v)]))
                    .collect();
                node.insert(ENTRIES_KEY.to_string(), Json::Array(entries));
            }
            Value::Timestamp(at) => {
                let iso = at.borrow().to_rfc3339_opts(SecondsFormat::AutoSi, true);
                node.insert(ISO_KEY.to_string(), Json::String(iso));
            }
            Value::Record(props) => {
                let props = self.encode_properties(&props.borrow());
                node.insert(PROPS_KEY.to_string(), props);
            }
            Value::Instance(instance) => {
                let instance = instance.borrow();
                let props = self.encode_properties(&instance.properties);
                node.insert(PROPS_KEY.to_string(), props);
                if instance.managed && self.config.emit_managed {
                    node.insert(MANAGED_KEY.to_string(), Json::Bool(true));
                }
            }
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => {}
        }
        Json::Object(node)
    }

    /// Tag for a composite whose natural kind is unregistered or claimed by
    /// a recipe of another shape.
    fn fallback_kind(&self, value: &Value) -> String {
        let natural = value.type_name();
        if let Value::Instance(_) = value {
            log::debug!("no registered kind for {natural}; encoding as {OBJECT}");
            return OBJECT.to_string();
        }
        if self.registry.contains(&natural) {
            // Decoding will build the registered recipe's shell, not this kind.
            log::warn!(
                "kind {natural} is registered with a different recipe; payload will not decode"
            );
        }
        natural.into_owned()
    }

    fn encode_properties(&mut self, props: &Properties) -> Json {
        let encoded: Map<String, Json> = props
            .iter()
            .map(|(name, v)| (name.clone(), self.encode_node(v)))
            .collect();
        Json::Object(encoded)
    }
}
