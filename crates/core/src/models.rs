//! Domain model types shared by the parser, the hierarchy builder and the
//! JSON writer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

/// The value stored under one attribute name of an [`Entry`].
///
/// Serialized untagged, so JSON sees a string, an array of strings, or an
/// array of nested entry objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// The attribute occurred exactly once in the record.
    Single(String),
    /// The attribute occurred two or more times, in file order.
    Multi(Vec<String>),
    /// Child entries attached by the hierarchy builder.
    Nested(Vec<Entry>),
}

impl AttrValue {
    /// The scalar value, if this is a single-valued attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            _ => None,
        }
    }

    /// All string values in order; empty for nested child lists.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Multi(v) => v.iter().map(String::as_str).collect(),
            Self::Nested(_) => Vec::new(),
        }
    }

    /// The child entries, if this value is a nested child list.
    pub fn as_nested(&self) -> Option<&[Entry]> {
        match self {
            Self::Nested(children) => Some(children),
            _ => None,
        }
    }

    /// Append another occurrence of the attribute, promoting a scalar to a
    /// two-element list.
    fn push(&mut self, value: String) {
        match self {
            Self::Single(prev) => {
                let prev = std::mem::take(prev);
                *self = Self::Multi(vec![prev, value]);
            }
            Self::Multi(values) => values.push(value),
            Self::Nested(_) => *self = Self::Single(value),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One LDIF record: attribute names mapped to values, in the order the
/// attributes first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry {
    attributes: IndexMap<String, AttrValue>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an entry with a single `dn` attribute.
    pub fn with_dn(dn: impl Into<String>) -> Self {
        let mut entry = Self::new();
        entry.insert("dn", AttrValue::Single(dn.into()));
        entry
    }

    /// The entry's distinguished name, if present and single-valued.
    pub fn dn(&self) -> Option<&str> {
        self.get("dn").and_then(AttrValue::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Record one more occurrence of `name`.
    pub fn add_value(&mut self, name: &str, value: String) {
        match self.attributes.get_mut(name) {
            Some(existing) => existing.push(value),
            None => {
                self.attributes
                    .insert(name.to_string(), AttrValue::Single(value));
            }
        }
    }

    /// Set `name` to `value`, replacing any previous value in place.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) -> Option<AttrValue> {
        self.attributes.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attribute names in first-occurrence order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a Entry {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = indexmap::map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}
