//! Rows exchanged with the data stores.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::value::Value;

/// A single row: an ordered mapping from attribute names to values.
///
/// Rows may carry only a subset of the attributes of the relation they are
/// stored in; a missing attribute reads as [Value::Null].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

const NULL: Value = Value::Null;

impl Row {
    /// Create an empty [Row].
    pub fn new() -> Self {
        Self::default()
    }

    /// The value of the given attribute, if the row carries it.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// The value of the given attribute, reading missing attributes as null.
    pub fn value(&self, attribute: &str) -> &Value {
        self.values.get(attribute).unwrap_or(&NULL)
    }

    /// Set the value of an attribute.
    pub fn set<Name: Into<String>>(&mut self, attribute: Name, value: Value) {
        self.values.insert(attribute.into(), value);
    }

    /// The names of the attributes this row carries.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// The attributes this row shares with another row.
    pub fn common_attributes(&self, other: &Row) -> BTreeSet<String> {
        self.values
            .keys()
            .filter(|attribute| other.values.contains_key(*attribute))
            .cloned()
            .collect()
    }

    /// Restrict this row to the given attributes, dropping all others.
    pub fn project(&self, attributes: &BTreeSet<String>) -> Row {
        Row {
            values: self
                .values
                .iter()
                .filter(|(attribute, _)| attributes.contains(*attribute))
                .map(|(attribute, value)| (attribute.clone(), value.clone()))
                .collect(),
        }
    }

    /// The values of the given attributes in iteration order of `attributes`,
    /// reading missing attributes as null. Used as grouping and join keys.
    pub fn key(&self, attributes: &BTreeSet<String>) -> Vec<Value> {
        attributes
            .iter()
            .map(|attribute| self.value(attribute).clone())
            .collect()
    }

    /// Combine this row with another one; on shared attributes the values of
    /// `self` win.
    pub fn merge(&self, other: &Row) -> Row {
        let mut values = other.values.clone();
        values.extend(self.values.clone());
        Row { values }
    }

    /// Number of attributes this row carries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether this row carries no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the attribute-value pairs of this row.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(attribute, value)| (attribute.as_str(), value))
    }
}

impl<Name: Into<String>> FromIterator<(Name, Value)> for Row {
    fn from_iter<Iter: IntoIterator<Item = (Name, Value)>>(iter: Iter) -> Self {
        Row {
            values: iter
                .into_iter()
                .map(|(attribute, value)| (attribute.into(), value))
                .collect(),
        }
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
