//! Functional dependencies between attribute sets.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::schema::Relation;

/// A functional dependency `left → right`: the values of the `left`
/// attributes uniquely determine the values of the `right` attributes.
///
/// User-supplied multi-valued dependencies are promoted to this
/// representation as well; the join-discovery algorithms treat them alike.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionalDependency {
    /// The determining attributes
    pub left: BTreeSet<String>,
    /// The determined attributes
    pub right: BTreeSet<String>,
}

impl FunctionalDependency {
    /// Create a new [FunctionalDependency].
    pub fn new<Left, Right, Name>(left: Left, right: Right) -> Self
    where
        Left: IntoIterator<Item = Name>,
        Right: IntoIterator<Item = Name>,
        Name: Into<String>,
    {
        Self {
            left: left.into_iter().map(Into::into).collect(),
            right: right.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether every attribute this dependency mentions is contained in the
    /// given attribute set, i.e. whether the dependency is applicable to a
    /// context with those attributes.
    pub fn applies_to(&self, attributes: &BTreeSet<String>) -> bool {
        self.left.union(&self.right).all(|attribute| attributes.contains(attribute))
    }
}

impl Display for FunctionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = self.left.iter().cloned().collect::<Vec<_>>().join(", ");
        let right = self.right.iter().cloned().collect::<Vec<_>>().join(", ");
        write!(f, "{{{left}}} -> {{{right}}}")
    }
}

/// Derive the functional dependencies implied by a relation's keys: the
/// primary key and every unique key determine all remaining attributes.
pub fn key_dependencies(
    relation: &Relation,
    unique_keys: &[BTreeSet<String>],
) -> Vec<FunctionalDependency> {
    let attributes = relation.attribute_names();

    let mut result = Vec::new();
    if !relation.pk.is_empty() {
        result.push(FunctionalDependency {
            left: relation.pk.clone(),
            right: attributes.difference(&relation.pk).cloned().collect(),
        });
    }
    for key in unique_keys {
        if key.is_empty() || *key == relation.pk {
            continue;
        }
        result.push(FunctionalDependency {
            left: key.clone(),
            right: attributes.difference(key).cloned().collect(),
        });
    }
    result
}
