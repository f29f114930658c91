//! A warehouse builder that turns a normalized relational database into
//! denormalized analysis tables by discovering joinable relation subsets
//! through the lossless-join property and merging their joins into a single
//! wide table of joins.

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod error;
pub mod model;

pub mod constraints;
pub mod lossless;
pub mod transformation;

pub mod cache;
pub mod storage;
pub mod tj;

pub mod execution;
