//! Assembly of a table of joins for a chosen context.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::cache::TjCache;
use crate::constraints::{ComparisonOperator, Constraint, Predicate};
use crate::error::Error;
use crate::model::{schema, AttributeType, FunctionalDependency, Relation};
use crate::storage::DataStore;
use crate::transformation::contexts;

use super::provenance::{Provenance, PROVENANCE_ATTRIBUTE};
use super::subordination::subordinate_rows;

/// Deterministic name of the table of joins for a context.
fn table_name(context: &[Relation]) -> String {
    format!(
        "tj_{}",
        context.iter().map(|relation| relation.name.as_str()).join("_")
    )
}

/// Schema of the table of joins for a context: the union of the context
/// relations' attributes plus the reserved provenance column.
pub fn table_schema(context: &[Relation]) -> Relation {
    let mut attributes = schema::all_attributes(context);
    attributes.insert(PROVENANCE_ATTRIBUTE.to_string(), AttributeType::Text);
    Relation::new(table_name(context), attributes, BTreeSet::new())
}

/// All sub-combinations of the context's relations that are themselves
/// lossless, with the full context appended if the enumeration did not
/// already produce it. Later packs are more complete than earlier ones and
/// may override their rows during the merge.
fn relation_packs(
    context: &[Relation],
    dependencies: &[FunctionalDependency],
) -> Vec<Vec<Relation>> {
    let attributes = schema::attribute_union(context);
    let applicable: Vec<FunctionalDependency> = dependencies
        .iter()
        .filter(|dependency| dependency.applies_to(&attributes))
        .cloned()
        .collect();

    let mut packs: Vec<Vec<Relation>> =
        contexts(context, &BTreeSet::new(), &applicable).collect();

    let full: BTreeSet<&str> = context.iter().map(|relation| relation.name.as_str()).collect();
    let full_included = packs.iter().any(|pack| {
        pack.iter().map(|relation| relation.name.as_str()).collect::<BTreeSet<_>>() == full
    });
    if !full_included {
        packs.push(context.to_vec());
    }
    packs
}

/// Build the table of joins for `context` in the target store.
///
/// Every lossless relation pack of the context is joined against the
/// source store, its rows tagged with the pack's provenance vector, and
/// folded into the table: rows subordinate to the incoming ones are
/// deleted, the incoming rows inserted, and rows violating the applicable
/// part of `constraint` removed again - restricted to this pack's rows, so
/// other packs' contributions stay untouched. When two packs disagree on a
/// shared attribute, the later pack wins by processing order.
///
/// With a cache present, a table previously built for the exact same
/// context and constraint is reused instead of being rebuilt, and every
/// freshly built table is registered.
pub fn build<Source, Target>(
    context: &[Relation],
    dependencies: &[FunctionalDependency],
    constraint: &Constraint,
    source: &Source,
    target: &mut Target,
    mut cache: Option<&mut TjCache>,
) -> Result<Relation, Error>
where
    Source: DataStore,
    Target: DataStore,
{
    if let Some(cache) = cache.as_deref_mut() {
        if let Some(relation) = cache.full_match(context, constraint) {
            log::info!("reusing cached table of joins \"{}\"", relation.name);
            return Ok(relation.clone());
        }
    }

    let table = table_schema(context);
    target.create_table(&table)?;
    log::info!(
        "building table of joins \"{}\" over {} relation(s)",
        table.name,
        context.len()
    );

    for pack in relation_packs(context, dependencies) {
        let provenance = Provenance::new(pack.iter().map(|relation| relation.name.clone()));
        let tag = provenance.to_value()?;

        let pack_attributes = schema::all_attributes(&pack);
        let mut rows = source.natural_join(&pack, &pack_attributes)?;
        log::debug!(
            "pack [{}] contributed {} row(s)",
            provenance.relations().join(", "),
            rows.len()
        );
        for row in &mut rows {
            row.set(PROVENANCE_ATTRIBUTE, tag.clone());
        }

        let existing = target.rows(&table)?;
        let obsolete = subordinate_rows(&existing, &rows, context)?;
        target.delete_rows(&table, &obsolete)?;
        target.insert_rows(&table, &rows)?;

        let projected = constraint.project(&pack_attributes.keys().cloned().collect());
        if !projected.is_empty() {
            let pack_filter = Constraint::new(vec![vec![Predicate::new(
                PROVENANCE_ATTRIBUTE,
                ComparisonOperator::Equal,
                tag,
            )]]);
            target.delete_unsatisfied(&table, &projected, &pack_filter)?;
        }
    }

    if let Some(cache) = cache {
        cache.add(table.clone(), context, constraint)?;
    }
    Ok(table)
}
