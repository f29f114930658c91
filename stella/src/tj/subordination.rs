//! The row-level merge rule of the table-of-joins builder: a row becomes
//! obsolete when a more complete row covers it.

use crate::error::Error;
use crate::model::{Relation, Row};

use super::provenance::{Provenance, PROVENANCE_ATTRIBUTE};

/// Whether any relation recorded in `provenance` defines the attribute,
/// resolved against the relations of the surrounding context.
fn provenance_defines(provenance: &Provenance, context: &[Relation], attribute: &str) -> bool {
    context
        .iter()
        .filter(|relation| provenance.contains(&relation.name))
        .any(|relation| relation.has_attribute(attribute))
}

/// Whether `row` is made redundant by `other` and should be deleted.
///
/// This holds iff `other`'s provenance covers `row`'s, and on every shared
/// attribute the two rows agree - where a null in `row` counts as agreement
/// when none of `row`'s contributing relations defines the attribute (the
/// value is legitimately missing rather than conflicting).
pub fn is_subordinate(row: &Row, other: &Row, context: &[Relation]) -> Result<bool, Error> {
    let provenance = Provenance::from_row(row)?;
    let other_provenance = Provenance::from_row(other)?;

    if !provenance.is_less_or_equal(&other_provenance) {
        return Ok(false);
    }

    for attribute in row.common_attributes(other) {
        if attribute == PROVENANCE_ATTRIBUTE {
            continue;
        }
        if row.value(&attribute) == other.value(&attribute) {
            continue;
        }
        let legitimately_empty = row.value(&attribute).is_null()
            && !provenance_defines(&provenance, context, &attribute);
        if !legitimately_empty {
            // conflicting values, keep both rows
            return Ok(false);
        }
    }
    Ok(true)
}

/// Collect every row of `existing` that is subordinate to some row of
/// `incoming`. Each existing row is reported at most once, on its first
/// covering row.
///
/// The result is materialized eagerly: callers delete the reported rows
/// from the same table they fetched `existing` from, and that table is
/// being mutated between fetch and delete.
pub fn subordinate_rows(
    existing: &[Row],
    incoming: &[Row],
    context: &[Relation],
) -> Result<Vec<Row>, Error> {
    let mut result = Vec::new();
    for row in existing {
        for other in incoming {
            if is_subordinate(row, other, context)? {
                result.push(row.clone());
                break;
            }
        }
    }
    Ok(result)
}
