//! Enumeration of contexts: relation subsets that satisfy the
//! lossless-join property.

use std::collections::BTreeSet;
use std::ops::Range;

use itertools::structs::Combinations;
use itertools::Itertools;

use crate::lossless::is_lossless;
use crate::model::{schema, FunctionalDependency, Relation};

use super::priority::prioritized_relations;

/// Lazily enumerate the contexts that can be built on top of the given base
/// relations.
///
/// The base relations (those whose name occurs in `base`) are part of every
/// candidate context; the remaining relations are ranked by
/// [priority][super::Priority] and added in combinations of growing size,
/// starting with the empty combination, i.e. the base relations alone.
/// Every combination whose relations admit a lossless join is yielded.
/// Because smaller combinations come first and candidates are pre-sorted by
/// descending priority, the first yielded context is the smallest, most
/// relevant one; callers taking only that first context must handle an
/// exhausted enumeration themselves (no lossless context is a normal
/// outcome, not an error).
pub fn contexts<'a>(
    all_relations: &'a [Relation],
    base: &BTreeSet<String>,
    dependencies: &'a [FunctionalDependency],
) -> ContextEnumerator<'a> {
    let base_relations: Vec<&Relation> = all_relations
        .iter()
        .filter(|relation| base.contains(&relation.name))
        .collect();
    let other_relations: Vec<&Relation> = all_relations
        .iter()
        .filter(|relation| !base.contains(&relation.name))
        .collect();

    let all_attributes = schema::attribute_union(all_relations);
    let candidates: Vec<&Relation> =
        prioritized_relations(&other_relations, &base_relations, dependencies, &all_attributes)
            .into_iter()
            .map(|(relation, _)| relation)
            .collect();

    let combinations = (0..candidates.len()).combinations(0);
    ContextEnumerator {
        base: base_relations,
        candidates,
        dependencies,
        size: 0,
        combinations,
    }
}

/// Iterator over the lossless contexts of a relation set; see [contexts].
///
/// The sequence is finite and non-restartable; a fresh call to [contexts]
/// starts over.
#[derive(Debug)]
pub struct ContextEnumerator<'a> {
    base: Vec<&'a Relation>,
    candidates: Vec<&'a Relation>,
    dependencies: &'a [FunctionalDependency],
    size: usize,
    combinations: Combinations<Range<usize>>,
}

impl Iterator for ContextEnumerator<'_> {
    type Item = Vec<Relation>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(indices) = self.combinations.next() else {
                if self.size >= self.candidates.len() {
                    return None;
                }
                self.size += 1;
                self.combinations = (0..self.candidates.len()).combinations(self.size);
                continue;
            };

            let mut context = self.base.clone();
            context.extend(indices.into_iter().map(|index| self.candidates[index]));

            let attributes = schema::attribute_union(context.iter().copied());
            let applicable: Vec<FunctionalDependency> = self
                .dependencies
                .iter()
                .filter(|dependency| dependency.applies_to(&attributes))
                .cloned()
                .collect();

            if is_lossless(&context, &applicable) {
                return Some(context.into_iter().cloned().collect());
            }
        }
    }
}
