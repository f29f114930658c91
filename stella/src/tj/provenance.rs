//! Provenance vectors: per-row tags identifying which relations
//! contributed a row to a table of joins.

use crate::error::Error;
use crate::model::{Row, Value};

/// Name of the reserved provenance attribute of every table of joins.
pub const PROVENANCE_ATTRIBUTE: &str = "g";

/// Capacity of the provenance column: the serialized vector must fit into
/// a bounded string of this many characters.
pub const PROVENANCE_CAPACITY: usize = 10_000;

/// An ordered, duplicate-free list of relation names recording which
/// relations produced a row.
///
/// The vector is persisted in the reserved provenance column as a JSON
/// array, so relation names may contain arbitrary characters without
/// colliding with a separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Provenance {
    relations: Vec<String>,
}

impl Provenance {
    /// Create a [Provenance] from relation names, keeping the first
    /// occurrence of every name.
    pub fn new<Names, Name>(names: Names) -> Self
    where
        Names: IntoIterator<Item = Name>,
        Name: Into<String>,
    {
        let mut relations = Vec::new();
        for name in names {
            let name = name.into();
            if !relations.contains(&name) {
                relations.push(name);
            }
        }
        Self { relations }
    }

    /// The relation names of this vector, in insertion order.
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    /// Whether the named relation is part of this vector.
    pub fn contains(&self, name: &str) -> bool {
        self.relations.iter().any(|relation| relation == name)
    }

    /// Whether this vector is covered by `other`: every relation recorded
    /// here also appears there, irrespective of order.
    pub fn is_less_or_equal(&self, other: &Provenance) -> bool {
        self.relations.iter().all(|name| other.contains(name))
    }

    /// Keep only the relations whose name occurs in `names`.
    pub fn restrict<'a, Names>(&self, names: Names) -> Provenance
    where
        Names: IntoIterator<Item = &'a str>,
    {
        let keep: Vec<&str> = names.into_iter().collect();
        Provenance {
            relations: self
                .relations
                .iter()
                .filter(|name| keep.contains(&name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Serialize this vector into the value stored in the provenance
    /// column. Fails if the serialized form exceeds the column capacity.
    pub fn to_value(&self) -> Result<Value, Error> {
        let serialized = serde_json::to_string(&self.relations)?;
        if serialized.len() > PROVENANCE_CAPACITY {
            return Err(Error::ProvenanceCapacity {
                length: serialized.len(),
                capacity: PROVENANCE_CAPACITY,
            });
        }
        Ok(Value::Text(serialized))
    }

    /// Read the provenance vector a row carries in its reserved column.
    pub fn from_row(row: &Row) -> Result<Provenance, Error> {
        match row.get(PROVENANCE_ATTRIBUTE) {
            Some(Value::Text(serialized)) => {
                let relations: Vec<String> = serde_json::from_str(serialized)?;
                Ok(Provenance { relations })
            }
            _ => Err(Error::MissingProvenance),
        }
    }
}
