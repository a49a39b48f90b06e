//! Shapes of encoded nodes.
//!
//! ```text
//! {"$type": "Set",  "$id": "Set_0",  "$items": [1, 2, 3]}
//! {"$type": "Map",  "$id": "Map_1",  "$entries": [["k", "v"]]}
//! {"$type": "Date", "$id": "Date_2", "$iso": "2020-01-01T00:00:00Z"}
//! {"$type": "Person", "$id": "Person_3", "$props": {...}, "$managed": true}
//! {"$ref": "Set_0"}
//! ```

use serde_json::{Map, Value as Json};
use skein_foundation::{Error, Result};

/// Kind tag.
pub const TYPE_KEY: &str = "$type";
/// Unique id within one encoded document.
pub const ID_KEY: &str = "$id";
/// Back-reference to a previously encoded id.
pub const REF_KEY: &str = "$ref";
/// Elements of a sequence or members of a set.
pub const ITEMS_KEY: &str = "$items";
/// `[key, value]` pairs of a map.
pub const ENTRIES_KEY: &str = "$entries";
/// ISO-8601 instant of a timestamp.
pub const ISO_KEY: &str = "$iso";
/// Own properties of a record or instance.
pub const PROPS_KEY: &str = "$props";
/// Managed-instance marker.
pub const MANAGED_KEY: &str = "$managed";

const RESERVED: [&str; 8] = [
    TYPE_KEY,
    ID_KEY,
    REF_KEY,
    ITEMS_KEY,
    ENTRIES_KEY,
    ISO_KEY,
    PROPS_KEY,
    MANAGED_KEY,
];

/// Builds a back-reference node.
#[must_use]
pub fn back_reference(id: &str) -> Json {
    let mut node = Map::new();
    node.insert(REF_KEY.to_string(), Json::String(id.to_string()));
    Json::Object(node)
}

/// Starts a tagged node with its kind and id.
#[must_use]
pub fn tagged(kind: &str, id: &str) -> Map<String, Json> {
    let mut node = Map::new();
    node.insert(TYPE_KEY.to_string(), Json::String(kind.to_string()));
    node.insert(ID_KEY.to_string(), Json::String(id.to_string()));
    node
}

/// A JSON value classified by the role it plays in an encoded tree.
#[derive(Debug)]
pub enum Node<'a> {
    /// Null, boolean, number, or string.
    Primitive(&'a Json),
    /// Untagged array.
    List(&'a [Json]),
    /// `{"$ref": id}`.
    BackReference(&'a str),
    /// Node carrying a `$type` tag.
    Tagged(TaggedNode<'a>),
    /// Untagged object.
    Plain(&'a Map<String, Json>),
}

impl<'a> Node<'a> {
    /// Classifies a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a malformed-node error when `$ref`, `$type`, or `$id` has
    /// the wrong JSON type.
    pub fn classify(json: &'a Json) -> Result<Self> {
        let object = match json {
            Json::Array(items) => return Ok(Self::List(items.as_slice())),
            Json::Object(object) => object,
            _ => return Ok(Self::Primitive(json)),
        };

        if let Some(target) = object.get(REF_KEY) {
            return target
                .as_str()
                .map(Self::BackReference)
                .ok_or_else(|| Error::malformed(format!("{REF_KEY} must be a string")));
        }

        let Some(tag) = object.get(TYPE_KEY) else {
            return Ok(Self::Plain(object));
        };
        let type_name = tag
            .as_str()
            .ok_or_else(|| Error::malformed(format!("{TYPE_KEY} must be a string")))?;
        let id = match object.get(ID_KEY) {
            None => None,
            Some(Json::String(id)) => Some(id.as_str()),
            Some(_) => return Err(Error::malformed(format!("{ID_KEY} must be a string"))),
        };

        Ok(Self::Tagged(TaggedNode {
            type_name,
            id,
            body: object,
        }))
    }
}

/// A node with a kind tag.
#[derive(Debug, Clone, Copy)]
pub struct TaggedNode<'a> {
    /// The kind tag.
    pub type_name: &'a str,
    /// The node's id, if it has one.
    pub id: Option<&'a str>,
    body: &'a Map<String, Json>,
}

impl<'a> TaggedNode<'a> {
    /// Returns the `$items` array (empty if absent).
    ///
    /// # Errors
    ///
    /// Returns a malformed-node error if `$items` is not an array.
    pub fn items(&self) -> Result<&'a [Json]> {
        match self.body.get(ITEMS_KEY) {
            None => Ok(&[]),
            Some(Json::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(self.malformed(format!("{ITEMS_KEY} must be an array"))),
        }
    }

    /// Returns the `$entries` pairs (empty if absent).
    ///
    /// # Errors
    ///
    /// Returns a malformed-node error unless every entry is a two-element array.
    pub fn entries(&self) -> Result<Vec<(&'a Json, &'a Json)>> {
        let entries = match self.body.get(ENTRIES_KEY) {
            None => return Ok(Vec::new()),
            Some(Json::Array(entries)) => entries,
            Some(_) => return Err(self.malformed(format!("{ENTRIES_KEY} must be an array"))),
        };
        entries
            .iter()
            .map(|entry| match entry.as_array().map(Vec::as_slice) {
                Some([key, value]) => Ok((key, value)),
                _ => Err(self.malformed("map entry must be a [key, value] pair")),
            })
            .collect()
    }

    /// Returns the `$iso` string.
    ///
    /// # Errors
    ///
    /// Returns a malformed-node error if `$iso` is absent or not a string.
    pub fn iso(&self) -> Result<&'a str> {
        self.body
            .get(ISO_KEY)
            .and_then(Json::as_str)
            .ok_or_else(|| self.malformed(format!("{ISO_KEY} must be a string")))
    }

    /// Returns the node's own properties.
    ///
    /// These are the `$props` entries when present. Otherwise every
    /// non-reserved key of the node is taken as a property, which lets
    /// hand-written or foreign nodes degrade to plain records.
    ///
    /// # Errors
    ///
    /// Returns a malformed-node error if `$props` is not an object.
    pub fn properties(&self) -> Result<Vec<(&'a str, &'a Json)>> {
        match self.body.get(PROPS_KEY) {
            Some(Json::Object(props)) => Ok(props.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            Some(_) => Err(self.malformed(format!("{PROPS_KEY} must be an object"))),
            None => Ok(self
                .body
                .iter()
                .filter(|(k, _)| !RESERVED.contains(&k.as_str()))
                .map(|(k, v)| (k.as_str(), v))
                .collect()),
        }
    }

    /// Returns true if the node carries the managed marker.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.body.get(MANAGED_KEY).and_then(Json::as_bool) == Some(true)
    }

    fn malformed(&self, message: impl AsRef<str>) -> Error {
        let label = self.id.unwrap_or(self.type_name);
        Error::malformed(format!("{label}: {}", message.as_ref()))
    }
}
