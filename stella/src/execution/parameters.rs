//! Parameters of a transformation run, read from a JSON file.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constraints::Constraint;
use crate::error::Error;
use crate::model::{AttributeType, FunctionalDependency, Relation};

/// Declaration of one source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableParameters {
    /// Name of the relation
    pub name: String,
    /// File to load the table's rows from, if any
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// The attributes of the relation with their types
    pub attributes: BTreeMap<String, AttributeType>,
    /// Primary key attributes
    #[serde(default)]
    pub pk: BTreeSet<String>,
    /// Additional unique keys
    #[serde(default)]
    pub unique: Vec<BTreeSet<String>>,
}

impl TableParameters {
    /// The relation this declaration describes.
    pub fn relation(&self) -> Relation {
        Relation::new(self.name.clone(), self.attributes.clone(), self.pk.clone())
    }
}

/// One dimension of the transformation: a set of attribute references that
/// should end up in a common table of joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionParameters {
    /// Optional name, used only for log messages
    #[serde(default)]
    pub name: Option<String>,
    /// Attribute references of the form `Relation.Attribute`
    pub attributes: Vec<String>,
}

/// All parameters of a transformation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationParameters {
    /// The source tables
    pub tables: Vec<TableParameters>,
    /// Reference to the measure attribute, of the form `Relation.Attribute`
    pub measure: String,
    /// The dimensions of the transformation
    #[serde(default)]
    pub dimensions: Vec<DimensionParameters>,
    /// User-supplied multi-valued dependencies, promoted to functional
    /// dependencies for the join-discovery algorithms
    #[serde(default)]
    pub multi_valued_dependencies: Vec<FunctionalDependency>,
    /// Row-level constraint restricting the transformation
    #[serde(default)]
    pub constraint: Constraint,
    /// Registry file of the table-of-joins cache; absent disables caching
    #[serde(default)]
    pub cache: Option<PathBuf>,
}

impl TransformationParameters {
    /// Read parameters from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let serialized = fs::read_to_string(path).map_err(|error| Error::IoFile {
            error,
            filename: path.to_path_buf(),
        })?;
        Ok(serde_json::from_str(&serialized)?)
    }
}

/// The relation part of an attribute reference of the form
/// `Relation.Attribute`.
pub fn relation_of(reference: &str) -> Result<&str, Error> {
    match reference.split_once('.') {
        Some((relation, attribute)) if !relation.is_empty() && !attribute.is_empty() => {
            Ok(relation)
        }
        _ => Err(Error::MalformedAttributeReference {
            reference: reference.to_string(),
        }),
    }
}

/// The attribute part of an attribute reference of the form
/// `Relation.Attribute`.
pub fn attribute_of(reference: &str) -> Result<&str, Error> {
    match reference.split_once('.') {
        Some((relation, attribute)) if !relation.is_empty() && !attribute.is_empty() => {
            Ok(attribute)
        }
        _ => Err(Error::MalformedAttributeReference {
            reference: reference.to_string(),
        }),
    }
}

#[cfg(test)]
mod test {
    use crate::model::AttributeType;

    use super::{attribute_of, relation_of, TransformationParameters};

    #[test]
    fn references_split_into_relation_and_attribute() {
        assert_eq!(relation_of("film.title").unwrap(), "film");
        assert_eq!(attribute_of("film.title").unwrap(), "title");

        assert!(relation_of("film").is_err());
        assert!(relation_of(".title").is_err());
        assert!(relation_of("film.").is_err());
    }

    #[test]
    fn parameters_deserialize_with_defaults() {
        let parameters: TransformationParameters = serde_json::from_str(
            r#"{
                "tables": [
                    {
                        "name": "film",
                        "attributes": {
                            "film_id": "integer",
                            "title": "text"
                        },
                        "pk": ["film_id"]
                    }
                ],
                "measure": "film.film_id"
            }"#,
        )
        .unwrap();

        assert_eq!(parameters.tables.len(), 1);
        assert_eq!(
            parameters.tables[0].attributes.get("title"),
            Some(&AttributeType::Text)
        );
        assert!(parameters.dimensions.is_empty());
        assert!(parameters.multi_valued_dependencies.is_empty());
        assert!(parameters.constraint.is_empty());
        assert!(parameters.cache.is_none());
    }

    #[test]
    fn constraints_deserialize_from_dnf_lists() {
        let parameters: TransformationParameters = serde_json::from_str(
            r#"{
                "tables": [],
                "measure": "film.film_id",
                "constraint": [
                    [
                        {"attribute": "rating", "operator": ">=", "value": 8.0},
                        {"attribute": "category", "operator": "IN", "value": ["Horror", "Sci-Fi"]}
                    ]
                ],
                "multi_valued_dependencies": [
                    {"left": ["film_id"], "right": ["actor_id"]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(parameters.constraint.clauses().len(), 1);
        assert_eq!(parameters.constraint.clauses()[0].len(), 2);
        assert_eq!(parameters.multi_valued_dependencies.len(), 1);
    }
}
