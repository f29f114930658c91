//! Attribute closure under functional dependencies.

use std::collections::BTreeSet;

use crate::model::FunctionalDependency;

/// Compute the closure of an attribute set under the given functional
/// dependencies: the set of all attributes determined by the input
/// attributes. See Ullman, "Database Systems - The Complete Book", p. 75.
///
/// The result grows monotonically and is bounded by the universe of
/// attribute names occurring in the dependencies, so the fixed-point
/// iteration terminates; the outcome does not depend on the order in which
/// dependencies are listed.
pub fn closure(
    attributes: &BTreeSet<String>,
    dependencies: &[FunctionalDependency],
) -> BTreeSet<String> {
    let mut result = attributes.clone();

    let mut added = true;
    while added {
        added = false;
        for dependency in dependencies {
            if dependency.left.is_subset(&result) && !dependency.right.is_subset(&result) {
                result.extend(dependency.right.iter().cloned());
                added = true;
            }
        }
    }
    result
}
