//! Constraint-level operations built on top of predicate domains:
//! domain inclusion and structural equivalence.

use super::domains::Domain;
use super::{Constraint, Predicate};

/// Whether the domain of `p1` is contained in the domain of `p2`.
///
/// Predicates over different attributes never contain each other; malformed
/// predicates (whose operator and value shape do not form a domain) are
/// treated as not contained.
fn is_predicate_domain_included(p1: &Predicate, p2: &Predicate) -> bool {
    if p1.attribute != p2.attribute {
        return false;
    }
    match (Domain::from_predicate(p1), Domain::from_predicate(p2)) {
        (Some(d1), Some(d2)) => d1.is_subset(&d2),
        _ => false,
    }
}

/// Whether the row set admitted by the conjunction `clause_1` is contained
/// in the one admitted by `clause_2`. This holds iff every predicate of
/// `clause_2` is implied by some predicate of `clause_1`.
fn is_clause_domain_included(clause_1: &[Predicate], clause_2: &[Predicate]) -> bool {
    clause_2.iter().all(|predicate_2| {
        clause_1
            .iter()
            .any(|predicate_1| is_predicate_domain_included(predicate_1, predicate_2))
    })
}

/// Whether the value domain implied by `c1` is a subset of the one implied
/// by `c2`, i.e. whether `c1 → c2` is a tautology.
///
/// The empty constraint is universal: everything is included in it, and it
/// is included only in itself.
pub fn is_domain_included(c1: &Constraint, c2: &Constraint) -> bool {
    if c2.is_empty() {
        return true;
    }
    if c1.is_empty() {
        return false;
    }
    c1.clauses().iter().all(|clause_1| {
        c2.clauses()
            .iter()
            .any(|clause_2| is_clause_domain_included(clause_1, clause_2))
    })
}

/// Whether two conjunction clauses contain the same predicates, in any order.
fn clauses_equal(clause_1: &[Predicate], clause_2: &[Predicate]) -> bool {
    if clause_1.len() != clause_2.len() {
        return false;
    }
    let mut sorted_1 = clause_1.to_vec();
    let mut sorted_2 = clause_2.to_vec();
    sorted_1.sort();
    sorted_2.sort();
    sorted_1 == sorted_2
}

/// Whether two constraints are structurally identical up to the order of
/// clauses and of predicates within clauses.
pub fn equivalent(c1: &Constraint, c2: &Constraint) -> bool {
    if c1.clauses().len() != c2.clauses().len() {
        return false;
    }
    c1.clauses().iter().all(|clause_1| {
        c2.clauses()
            .iter()
            .any(|clause_2| clauses_equal(clause_1, clause_2))
    })
}
