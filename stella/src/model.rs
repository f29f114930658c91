//! Typed representation of the relational world the transformation operates
//! on: relations with attributes and keys, functional dependencies, and the
//! rows that flow between the source database and the warehouse.

pub mod dependency;
pub mod row;
pub mod schema;
pub mod value;

pub use dependency::FunctionalDependency;
pub use row::Row;
pub use schema::{AttributeType, Relation};
pub use value::Value;
