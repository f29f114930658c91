//! Relations and their attribute schemas.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Storage type of an attribute.
///
/// Source column types are folded into this small set the same way the
/// warehouse does it: anything string- or date-like becomes [AttributeType::Text].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// 64-bit signed integers
    Integer,
    /// 64-bit floating point numbers
    Float,
    /// Booleans
    Boolean,
    /// Unbounded text; also used for dates and other stringly-typed data
    Text,
}

impl Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Integer => write!(f, "integer"),
            AttributeType::Float => write!(f, "float"),
            AttributeType::Boolean => write!(f, "boolean"),
            AttributeType::Text => write!(f, "text"),
        }
    }
}

/// A source table seen as a relation: a name, a typed attribute set and an
/// optional primary key. Immutable for the duration of a transformation run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation {
    /// Name of the relation
    pub name: String,
    /// Attributes of the relation with their types
    pub attributes: BTreeMap<String, AttributeType>,
    /// Names of the primary key attributes; may be empty if no key is known
    #[serde(default)]
    pub pk: BTreeSet<String>,
}

impl Relation {
    /// Create a new [Relation].
    pub fn new<Name: Into<String>>(
        name: Name,
        attributes: BTreeMap<String, AttributeType>,
        pk: BTreeSet<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            pk,
        }
    }

    /// The set of attribute names of this relation.
    pub fn attribute_names(&self) -> BTreeSet<String> {
        self.attributes.keys().cloned().collect()
    }

    /// Whether this relation defines the given attribute.
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }
}

/// All attributes found in the given relations, merged into one typed schema.
///
/// Attributes sharing a name across relations are merged; the type of the
/// first relation defining the attribute wins.
pub fn all_attributes<'a, Relations>(relations: Relations) -> BTreeMap<String, AttributeType>
where
    Relations: IntoIterator<Item = &'a Relation>,
{
    let mut result = BTreeMap::new();
    for relation in relations {
        for (name, attribute_type) in &relation.attributes {
            result.entry(name.clone()).or_insert(*attribute_type);
        }
    }
    result
}

/// The set of attribute names appearing in at least one of the given relations.
pub fn attribute_union<'a, Relations>(relations: Relations) -> BTreeSet<String>
where
    Relations: IntoIterator<Item = &'a Relation>,
{
    relations
        .into_iter()
        .flat_map(|relation| relation.attributes.keys().cloned())
        .collect()
}

/// Find the first relation among the given ones that defines the attribute.
pub fn containing_relation<'a>(
    relations: &'a [Relation],
    attribute: &str,
) -> Result<&'a Relation, Error> {
    relations
        .iter()
        .find(|relation| relation.has_attribute(attribute))
        .ok_or_else(|| Error::UnknownAttribute {
            relation: relations
                .iter()
                .map(|relation| relation.name.clone())
                .collect::<Vec<_>>()
                .join(", "),
            attribute: attribute.to_string(),
        })
}
