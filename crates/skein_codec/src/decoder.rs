//! Graph decoder.
//!
//! Rebuilds live values from an encoded node tree. Each tagged node is
//! allocated as an empty shell of its kind and recorded under its id before
//! its children are decoded, so a child that refers back to an ancestor
//! receives the live shell.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value as Json};
use skein_foundation::{ClassRegistry, Error, Recipe, ReferenceTable, Result, Value};

use crate::node::{Node, TaggedNode};

/// Decodes encoded trees against a class registry.
#[derive(Clone, Copy, Debug)]
pub struct Decoder<'r> {
    registry: &'r ClassRegistry,
}

impl<'r> Decoder<'r> {
    /// Creates a decoder.
    #[must_use]
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Self { registry }
    }

    /// Parses JSON text and decodes it.
    ///
    /// # Errors
    ///
    /// Returns a parse error if `text` is not well-formed JSON or a node is
    /// malformed, and a dangling reference error if a back-reference names
    /// an id that was never decoded. No partially built graph is returned.
    pub fn deserialize(&self, text: &str) -> Result<Value> {
        // Each composite nests two JSON levels; graph depth is bounded only
        // by the stack.
        let mut parser = serde_json::Deserializer::from_str(text);
        parser.disable_recursion_limit();
        let tree = Json::deserialize(&mut parser).map_err(parse_error)?;
        parser.end().map_err(parse_error)?;
        self.decode(&tree)
    }

    /// Decodes an already parsed node tree.
    ///
    /// # Errors
    ///
    /// See [`Decoder::deserialize`].
    pub fn decode(&self, tree: &Json) -> Result<Value> {
        let mut walk = DecodeWalk {
            registry: self.registry,
            refs: ReferenceTable::new(),
        };
        let value = walk.decode_node(tree)?;
        log::trace!("decoded {} identified composite(s)", walk.refs.len());
        Ok(value)
    }
}

/// State of one top-level decode call.
struct DecodeWalk<'a> {
    registry: &'a ClassRegistry,
    refs: ReferenceTable,
}

impl DecodeWalk<'_> {
    fn decode_node(&mut self, json: &Json) -> Result<Value> {
        match Node::classify(json)? {
            Node::Primitive(p) => Ok(primitive(p)),
            Node::BackReference(id) => {
                log::trace!("resolving back-reference {id}");
                self.refs.resolve(id)
            }
            Node::List(items) => {
                let shell = Recipe::Sequence.allocate();
                self.populate_items(&shell, items)?;
                Ok(shell)
            }
            Node::Plain(object) => {
                let shell = Recipe::Record.allocate();
                self.populate_object(&shell, object)?;
                Ok(shell)
            }
            Node::Tagged(node) => self.decode_tagged(node),
        }
    }

    fn decode_tagged(&mut self, node: TaggedNode<'_>) -> Result<Value> {
        let recipe = match self.registry.lookup(node.type_name) {
            Some(recipe) => recipe.clone(),
            None => {
                log::debug!("unknown kind {}; decoding as plain record", node.type_name);
                Recipe::Record
            }
        };

        let shell = match &recipe {
            Recipe::Timestamp => Value::timestamp(parse_instant(node.iso()?)?),
            _ => recipe.allocate(),
        };
        // Recorded before populating so that cycles resolve to this shell.
        if let Some(id) = node.id {
            self.refs.insert(id, shell.clone());
        }

        match recipe {
            Recipe::Sequence | Recipe::Set => self.populate_items(&shell, node.items()?)?,
            Recipe::Map => self.populate_entries(&shell, &node)?,
            Recipe::Record | Recipe::Class(_) => {
                for (name, child) in node.properties()? {
                    let value = self.decode_node(child).map_err(|e| e.with_frame(name))?;
                    shell.assign_unless_defined(name, value);
                }
            }
            Recipe::Timestamp => {}
        }
        // The managed marker is not restored; hosts read it from the tree.
        Ok(shell)
    }

    fn populate_items(&mut self, shell: &Value, items: &[Json]) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            let value = self
                .decode_node(item)
                .map_err(|e| e.with_frame(format!("[{i}]")))?;
            match shell {
                Value::Seq(seq) => seq.borrow_mut().push(value),
                Value::Set(set) => {
                    set.borrow_mut().insert(value);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn populate_entries(&mut self, shell: &Value, node: &TaggedNode<'_>) -> Result<()> {
        let Value::Map(map) = shell else {
            return Ok(());
        };
        for (i, (key, value)) in node.entries()?.into_iter().enumerate() {
            let frame = || format!("[{i}]");
            let key = self.decode_node(key).map_err(|e| e.with_frame(frame()))?;
            let value = self.decode_node(value).map_err(|e| e.with_frame(frame()))?;
            map.borrow_mut().insert(key, value);
        }
        Ok(())
    }

    fn populate_object(&mut self, shell: &Value, object: &Map<String, Json>) -> Result<()> {
        for (name, child) in object {
            let value = self
                .decode_node(child)
                .map_err(|e| e.with_frame(name.as_str()))?;
            shell.assign_unless_defined(name, value);
        }
        Ok(())
    }
}

fn primitive(json: &Json) -> Value {
    match json {
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        Json::String(s) => Value::from(s.as_str()),
        Json::Null | Json::Array(_) | Json::Object(_) => Value::Null,
    }
}

fn parse_error(e: serde_json::Error) -> Error {
    Error::parse(e.to_string(), e.line(), e.column())
}

fn parse_instant(iso: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(iso)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::malformed(format!("invalid timestamp {iso:?}: {e}")))
}
