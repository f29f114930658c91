//! Ranking of candidate relations by their likelihood of satisfying the
//! lossless-join property together with a set of base relations.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::model::{schema, FunctionalDependency, Relation};

use super::closure::closure;

/// Priority tier of a candidate relation. The ordering is a search
/// heuristic only: it changes in which order contexts are discovered, never
/// which contexts exist, and no candidate is ever excluded because of its
/// tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// No relevant overlap with the base relations
    Fallback = 1,
    /// Shares at least one attribute with the base relations
    Overlapping = 2,
    /// The relation's key alone determines every attribute in the universe
    Determining = 3,
}

/// Rank `relations` by their priority with respect to `base_relations`,
/// sorted descending; the sort is stable, so relations of equal priority
/// keep their input order.
pub fn prioritized_relations<'a>(
    relations: &[&'a Relation],
    base_relations: &[&'a Relation],
    dependencies: &[FunctionalDependency],
    all_attributes: &BTreeSet<String>,
) -> Vec<(&'a Relation, Priority)> {
    let base_attributes = schema::attribute_union(base_relations.iter().copied());

    let mut result: Vec<(&Relation, Priority)> = relations
        .iter()
        .map(|&relation| {
            let priority = if closure(&relation.pk, dependencies).is_superset(all_attributes) {
                Priority::Determining
            } else if relation
                .attributes
                .keys()
                .any(|attribute| base_attributes.contains(attribute))
            {
                Priority::Overlapping
            } else {
                Priority::Fallback
            };
            (relation, priority)
        })
        .collect();
    result.sort_by_key(|(_, priority)| Reverse(*priority));
    result
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use crate::model::{AttributeType, FunctionalDependency, Relation};

    use super::{prioritized_relations, Priority};

    fn relation(name: &str, attributes: &[&str], pk: &[&str]) -> Relation {
        Relation::new(
            name,
            attributes
                .iter()
                .map(|attribute| (attribute.to_string(), AttributeType::Text))
                .collect(),
            pk.iter().map(|attribute| attribute.to_string()).collect(),
        )
    }

    fn attributes(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn priorities(ranked: &[(&Relation, Priority)]) -> Vec<Priority> {
        ranked.iter().map(|(_, priority)| *priority).collect()
    }

    #[test]
    fn all_fallback_without_base_and_dependencies() {
        let r1 = relation("R1", &["A", "B"], &["A"]);
        let r2 = relation("R2", &["C", "D"], &["C"]);
        let r3 = relation("R3", &["E", "F"], &["E"]);

        let ranked = prioritized_relations(
            &[&r1, &r2, &r3],
            &[],
            &[],
            &attributes(&["A", "B", "C", "D", "E", "F"]),
        );
        assert_eq!(priorities(&ranked), vec![Priority::Fallback; 3]);
    }

    #[test]
    fn base_overlap_raises_priority() {
        let base = relation("R1", &["A", "B", "E"], &["A"]);
        let r2 = relation("R2", &["B", "C"], &["C"]);
        let r3 = relation("R3", &["E", "F"], &["E"]);

        let ranked = prioritized_relations(
            &[&r2, &r3],
            &[&base],
            &[],
            &attributes(&["A", "B", "C", "D", "E", "F"]),
        );
        assert_eq!(priorities(&ranked), vec![Priority::Overlapping; 2]);
    }

    #[test]
    fn determining_key_requires_full_closure() {
        let r1 = relation("R1", &["A", "B", "C"], &["A", "B"]);
        let r2 = relation("R2", &["C", "D"], &["C"]);
        let r3 = relation("R3", &["D", "E"], &["D"]);
        let dependencies = vec![
            FunctionalDependency::new(["A", "B"], ["C"]),
            FunctionalDependency::new(["B", "C"], ["A", "D"]),
            FunctionalDependency::new(["D"], ["E"]),
        ];

        // an attribute outside every closure keeps all priorities low
        let ranked = prioritized_relations(
            &[&r1, &r2, &r3],
            &[],
            &dependencies,
            &attributes(&["A", "B", "C", "D", "E", "F"]),
        );
        assert_eq!(priorities(&ranked), vec![Priority::Fallback; 3]);

        // with the universe shrunk to the closure, R1's key determines it all
        let ranked = prioritized_relations(
            &[&r1, &r2, &r3],
            &[],
            &dependencies,
            &attributes(&["A", "B", "C", "D", "E"]),
        );
        assert_eq!(
            priorities(&ranked),
            vec![Priority::Determining, Priority::Fallback, Priority::Fallback]
        );
        assert_eq!(ranked[0].0.name, "R1");
    }

    #[test]
    fn all_tiers_sorted_descending() {
        let r1 = relation("R1", &["A", "B", "C"], &["A", "B"]);
        let r2 = relation("R2", &["C", "D"], &["C"]);
        let r3 = relation("R3", &["D", "E"], &["D"]);
        let base = relation("R4", &["C", "A"], &["D"]);
        let dependencies = vec![
            FunctionalDependency::new(["A", "B"], ["C"]),
            FunctionalDependency::new(["B", "C"], ["A", "D"]),
            FunctionalDependency::new(["D"], ["E"]),
        ];

        let ranked = prioritized_relations(
            &[&r1, &r2, &r3],
            &[&base],
            &dependencies,
            &attributes(&["A", "B", "C", "D", "E"]),
        );
        assert_eq!(
            priorities(&ranked),
            vec![Priority::Determining, Priority::Overlapping, Priority::Fallback]
        );
    }
}
