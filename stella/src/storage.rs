//! Abstractions over the databases the transformation reads from and
//! writes to, plus delimiter-separated file import and export.

pub mod dsv;
pub mod memory;

use std::collections::BTreeMap;

use crate::constraints::Constraint;
use crate::error::Error;
use crate::model::{AttributeType, FunctionalDependency, Relation, Row};

pub use memory::MemoryStore;

/// A database the transformation can read relations from and materialize
/// tables of joins into.
///
/// The same store type may play both roles; source stores only need the
/// read operations to succeed.
pub trait DataStore {
    /// The relations of this store together with the functional
    /// dependencies derivable from their declared keys.
    fn schema(&self) -> Result<(Vec<Relation>, Vec<FunctionalDependency>), Error>;

    /// Natural join of the given relations, projected onto `attributes`.
    ///
    /// Relations without shared attributes contribute their cross product;
    /// null never joins with anything, including another null.
    fn natural_join(
        &self,
        relations: &[Relation],
        attributes: &BTreeMap<String, AttributeType>,
    ) -> Result<Vec<Row>, Error>;

    /// Create a table for the given relation. Creating a table that
    /// already exists leaves it untouched.
    fn create_table(&mut self, relation: &Relation) -> Result<(), Error>;

    /// All rows currently stored for the given relation.
    fn rows(&self, relation: &Relation) -> Result<Vec<Row>, Error>;

    /// Append the given rows to the relation's table.
    fn insert_rows(&mut self, relation: &Relation, rows: &[Row]) -> Result<(), Error>;

    /// Delete every stored row equal to one of the given rows.
    fn delete_rows(&mut self, relation: &Relation, rows: &[Row]) -> Result<(), Error>;

    /// Delete the rows matched by `filter` that do not satisfy
    /// `constraint`. Rows outside the filter are left untouched.
    fn delete_unsatisfied(
        &mut self,
        relation: &Relation,
        constraint: &Constraint,
        filter: &Constraint,
    ) -> Result<(), Error>;
}
