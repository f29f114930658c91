//! Error-handling module for the crate

use std::path::PathBuf;

use thiserror::Error;

/// Error-collection for all the possible errors occurring in this crate
#[derive(Error, Debug)]
pub enum Error {
    /// The source database contains no relations
    #[error("The source schema contains no relations")]
    EmptySchema,
    /// A relation was referenced which is not part of the schema
    #[error("Unknown relation \"{name}\"")]
    UnknownRelation {
        /// Name of the missing relation
        name: String,
    },
    /// An attribute was referenced which no relation defines
    #[error("Relation \"{relation}\" does not define attribute \"{attribute}\"")]
    UnknownAttribute {
        /// Name of the relation that was searched
        relation: String,
        /// Name of the missing attribute
        attribute: String,
    },
    /// An attribute reference was not of the form `Relation.Attribute`
    #[error("Attribute reference \"{reference}\" is not of the form \"Relation.Attribute\"")]
    MalformedAttributeReference {
        /// The offending reference
        reference: String,
    },
    /// A cell value could not be converted into the declared attribute type
    #[error("Value \"{value}\" cannot be read as type {type_name} for attribute \"{attribute}\"")]
    ValueParse {
        /// The raw value
        value: String,
        /// Name of the declared type
        type_name: String,
        /// Attribute the value was read for
        attribute: String,
    },
    /// A serialized provenance vector exceeds the reserved column capacity
    #[error("Serialized provenance vector of length {length} exceeds the capacity of {capacity}")]
    ProvenanceCapacity {
        /// Length of the serialized vector
        length: usize,
        /// Capacity of the provenance column
        capacity: usize,
    },
    /// A table-of-joins row carries no provenance vector
    #[error("Row carries no provenance vector")]
    MissingProvenance,
    /// The cache was asked to restore a table without an enabled entry
    #[error("No cache entry has been enabled for restoring")]
    CacheDisabled,
    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Error while reading or writing a file
    #[error("Failed to access \"{filename}\": {error}")]
    IoFile {
        /// Underlying IO error
        error: std::io::Error,
        /// Name of the file that could not be accessed
        filename: PathBuf,
    },
    /// CSV serialization/deserialization error
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// JSON serialization/deserialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
