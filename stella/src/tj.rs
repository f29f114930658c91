//! Construction and incremental maintenance of tables of joins: wide
//! warehouse tables assembled from the natural joins of a context's
//! relation subsets, with per-row provenance and subordination-based
//! merging.

pub mod builder;
pub mod provenance;
pub mod subordination;

pub use builder::{build, table_schema};
pub use provenance::{Provenance, PROVENANCE_ATTRIBUTE, PROVENANCE_CAPACITY};
pub use subordination::{is_subordinate, subordinate_rows};
