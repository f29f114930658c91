//! Discovery of joinable relation subsets: attribute closure, relation
//! prioritization and the enumeration of lossless contexts.

pub mod closure;
pub mod contexts;
pub mod priority;

pub use closure::closure;
pub use contexts::{contexts, ContextEnumerator};
pub use priority::{prioritized_relations, Priority};
