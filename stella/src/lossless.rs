//! The chase test for the lossless-join property.
//!
//! Given a set of relations and the functional dependencies that hold over
//! them, the chase decides whether the natural join of the relations
//! reconstructs exactly the information contained in them, with no spurious
//! and no lost tuples. See Ullman, "Database Systems - The Complete Book",
//! ch. 3 for the classical construction this implements.

use std::collections::BTreeMap;

use crate::model::{schema, FunctionalDependency, Relation};

/// A cell of the chase tableau.
///
/// A clear symbol means "any relation could supply this value
/// consistently"; a distinguished symbol means "only the named relation is
/// known to supply it". The derived order makes a clear symbol smaller than
/// any distinguished one for the same attribute, which is exactly the
/// property unification relies on: the more general symbol wins.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Symbol {
    /// The attribute is resolved
    Clear(String),
    /// The attribute is only supplied by the named relation
    Distinguished(String, String),
}

type TableauRow = BTreeMap<String, Symbol>;

/// Build the initial tableau: one row per relation, one column per
/// attribute in the union of all relations' attributes. A cell is clear iff
/// the row's relation defines the attribute.
fn build_tableau(relations: &[&Relation]) -> Vec<TableauRow> {
    let all_attributes = schema::attribute_union(relations.iter().copied());
    relations
        .iter()
        .map(|relation| {
            all_attributes
                .iter()
                .map(|attribute| {
                    let symbol = if relation.has_attribute(attribute) {
                        Symbol::Clear(attribute.clone())
                    } else {
                        Symbol::Distinguished(attribute.clone(), relation.name.clone())
                    };
                    (attribute.clone(), symbol)
                })
                .collect()
        })
        .collect()
}

/// Whether the given tableau row consists only of clear symbols.
fn is_clear(row: &TableauRow) -> bool {
    row.values().all(|symbol| matches!(symbol, Symbol::Clear(_)))
}

/// Decide the lossless-join property for the given relations by chasing
/// their tableau with the given dependencies.
///
/// `dependencies` must be pre-filtered to those whose attributes all occur
/// in the union of the relations' attributes; dependencies referencing
/// other attributes are skipped.
pub fn is_lossless(relations: &[&Relation], dependencies: &[FunctionalDependency]) -> bool {
    let mut tableau = build_tableau(relations);

    loop {
        let mut changed = false;
        for dependency in dependencies {
            changed |= apply_dependency(&mut tableau, dependency);
        }
        if tableau.iter().any(is_clear) {
            return true;
        }
        if !changed {
            return false;
        }
    }
}

/// One chase step: group the tableau rows by their projection onto the
/// dependency's left side and unify the right-side cells within each group
/// towards their minimum. Returns whether any cell changed.
fn apply_dependency(tableau: &mut [TableauRow], dependency: &FunctionalDependency) -> bool {
    let mut groups: BTreeMap<Vec<&Symbol>, Vec<usize>> = BTreeMap::new();
    for (index, row) in tableau.iter().enumerate() {
        let mut key = Vec::with_capacity(dependency.left.len());
        for attribute in &dependency.left {
            match row.get(attribute) {
                Some(symbol) => key.push(symbol),
                // dependency references an attribute outside the tableau
                None => return false,
            }
        }
        groups.entry(key).or_default().push(index);
    }

    let unifications: Vec<(Vec<usize>, Vec<(String, Symbol)>)> = groups
        .into_values()
        .filter(|indices| indices.len() > 1)
        .map(|indices| {
            let minima = dependency
                .right
                .iter()
                .filter_map(|attribute| {
                    indices
                        .iter()
                        .filter_map(|&index| tableau[index].get(attribute))
                        .min()
                        .map(|minimum| (attribute.clone(), minimum.clone()))
                })
                .collect();
            (indices, minima)
        })
        .collect();

    let mut changed = false;
    for (indices, minima) in unifications {
        for index in indices {
            for (attribute, minimum) in &minima {
                if tableau[index].get(attribute) != Some(minimum) {
                    tableau[index].insert(attribute.clone(), minimum.clone());
                    changed = true;
                }
            }
        }
    }
    changed
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use crate::model::{AttributeType, FunctionalDependency, Relation};

    use super::{build_tableau, is_clear, is_lossless, Symbol};

    fn relation(name: &str, attributes: &[&str]) -> Relation {
        Relation::new(
            name,
            attributes
                .iter()
                .map(|attribute| (attribute.to_string(), AttributeType::Text))
                .collect(),
            BTreeSet::new(),
        )
    }

    #[test]
    fn tableau_of_identical_relations_is_all_clear() {
        let r1 = relation("R1", &["A", "B", "C", "D"]);
        let r2 = relation("R2", &["A", "B", "C", "D"]);
        let tableau = build_tableau(&[&r1, &r2]);
        for row in &tableau {
            assert!(is_clear(row));
        }
    }

    #[test]
    fn tableau_of_disjoint_relations() {
        let r1 = relation("R1", &["A", "B"]);
        let r2 = relation("R2", &["C", "D"]);
        let tableau = build_tableau(&[&r1, &r2]);

        assert_eq!(tableau[0]["A"], Symbol::Clear("A".to_string()));
        assert_eq!(tableau[0]["B"], Symbol::Clear("B".to_string()));
        assert_eq!(
            tableau[0]["C"],
            Symbol::Distinguished("C".to_string(), "R1".to_string())
        );
        assert_eq!(
            tableau[0]["D"],
            Symbol::Distinguished("D".to_string(), "R1".to_string())
        );
        assert_eq!(
            tableau[1]["A"],
            Symbol::Distinguished("A".to_string(), "R2".to_string())
        );
        assert_eq!(tableau[1]["C"], Symbol::Clear("C".to_string()));
    }

    #[test]
    fn tableau_of_overlapping_relations() {
        let r1 = relation("R1", &["A", "B", "C"]);
        let r2 = relation("R2", &["B", "C", "D"]);
        let tableau = build_tableau(&[&r1, &r2]);

        assert_eq!(tableau[0]["B"], Symbol::Clear("B".to_string()));
        assert_eq!(tableau[0]["C"], Symbol::Clear("C".to_string()));
        assert_eq!(
            tableau[0]["D"],
            Symbol::Distinguished("D".to_string(), "R1".to_string())
        );
        assert_eq!(tableau[1]["B"], Symbol::Clear("B".to_string()));
    }

    #[test]
    fn clear_symbols_win_unification() {
        assert!(
            Symbol::Clear("A".to_string())
                < Symbol::Distinguished("A".to_string(), "R1".to_string())
        );
    }

    #[test]
    fn single_relation_is_lossless() {
        let r1 = relation("R1", &["A", "B"]);
        assert!(is_lossless(&[&r1], &[]));
        assert!(is_lossless(
            &[&r1],
            &[FunctionalDependency::new(["A"], ["B"])]
        ));
    }

    #[test]
    fn empty_relation_list_is_lossy() {
        assert!(!is_lossless(&[], &[]));
    }

    #[test]
    fn cartesian_product_is_lossy() {
        let r1 = relation("R1", &["A", "B"]);
        let r2 = relation("R2", &["C", "D"]);
        assert!(!is_lossless(&[&r1, &r2], &[]));
    }

    #[test]
    fn chain_of_dependencies_is_lossless() {
        // Ullman's positive example
        let r1 = relation("R1", &["A", "D"]);
        let r2 = relation("R2", &["A", "C"]);
        let r3 = relation("R3", &["B", "C", "D"]);
        let dependencies = vec![
            FunctionalDependency::new(["A"], ["B"]),
            FunctionalDependency::new(["B"], ["C"]),
            FunctionalDependency::new(["C", "D"], ["A"]),
        ];
        assert!(is_lossless(&[&r1, &r2, &r3], &dependencies));
    }

    #[test]
    fn insufficient_dependencies_are_lossy() {
        // Ullman's negative example
        let r1 = relation("R1", &["A", "B"]);
        let r2 = relation("R2", &["B", "C"]);
        let r3 = relation("R3", &["C", "D"]);
        let dependencies = vec![FunctionalDependency::new(["B"], ["A", "D"])];
        assert!(!is_lossless(&[&r1, &r2, &r3], &dependencies));
    }

    #[test]
    fn joined_pair_with_key_dependency() {
        let r1 = relation("R1", &["A", "B", "C"]);
        let r2 = relation("R2", &["C", "D"]);
        let dependencies = vec![FunctionalDependency::new(["C"], ["D"])];
        assert!(is_lossless(&[&r1, &r2], &dependencies));
    }
}
