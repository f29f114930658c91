//! The outer transformation pipeline: run parameters and the engine that
//! turns a source database into a warehouse of tables of joins.

pub mod engine;
pub mod parameters;

pub use engine::TransformationEngine;
pub use parameters::{
    attribute_of, relation_of, DimensionParameters, TableParameters, TransformationParameters,
};
