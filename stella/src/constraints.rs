//! Logical constraints restricting which rows take part in a
//! transformation.
//!
//! A constraint is a predicate list in disjunctive normal form: the outer
//! list is a disjunction of conjunction clauses, each clause a list of
//! atomic comparison predicates.

pub mod domains;
pub mod operations;

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::model::{Row, Value};

/// Comparison operator of an atomic predicate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Equality
    #[serde(rename = "=")]
    Equal,
    /// Inequality
    #[serde(rename = "<>")]
    NotEqual,
    /// Strictly less than
    #[serde(rename = "<")]
    LessThan,
    /// Less than or equal
    #[serde(rename = "<=")]
    LessOrEqual,
    /// Strictly greater than
    #[serde(rename = ">")]
    GreaterThan,
    /// Greater than or equal
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// Membership in a finite list of values
    #[serde(rename = "IN")]
    In,
    /// Containment in a closed interval given as a two-element list
    #[serde(rename = "BETWEEN")]
    Between,
}

impl Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::In => "IN",
            ComparisonOperator::Between => "BETWEEN",
        };
        write!(f, "{symbol}")
    }
}

/// Right-hand side of a predicate: a single value, or a list of values for
/// the [In][ComparisonOperator::In] and [Between][ComparisonOperator::Between]
/// operators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateValue {
    /// A single comparison value
    Single(Value),
    /// A list of comparison values
    List(Vec<Value>),
}

/// An atomic comparison of one attribute against constant values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Predicate {
    /// The attribute being restricted
    pub attribute: String,
    /// The comparison operator
    pub operator: ComparisonOperator,
    /// The value(s) compared against
    pub value: PredicateValue,
}

impl Predicate {
    /// Create a new [Predicate] with a single comparison value.
    pub fn new<Name: Into<String>>(
        attribute: Name,
        operator: ComparisonOperator,
        value: Value,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: PredicateValue::Single(value),
        }
    }

    /// Create a new [Predicate] comparing against a list of values.
    pub fn with_list<Name: Into<String>>(
        attribute: Name,
        operator: ComparisonOperator,
        values: Vec<Value>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: PredicateValue::List(values),
        }
    }

    /// Evaluate this predicate against a row. Missing attributes read as
    /// null; comparisons against incomparable types are unsatisfied.
    pub fn matches(&self, row: &Row) -> bool {
        let value = row.value(&self.attribute);
        match (&self.operator, &self.value) {
            (ComparisonOperator::Equal, PredicateValue::Single(operand)) => {
                if operand.is_null() {
                    value.is_null()
                } else {
                    !value.is_null() && value == operand
                }
            }
            (ComparisonOperator::NotEqual, PredicateValue::Single(operand)) => {
                if operand.is_null() {
                    !value.is_null()
                } else {
                    !value.is_null() && value != operand
                }
            }
            (ComparisonOperator::LessThan, PredicateValue::Single(operand)) => {
                value.comparable(operand) && value < operand
            }
            (ComparisonOperator::LessOrEqual, PredicateValue::Single(operand)) => {
                value.comparable(operand) && value <= operand
            }
            (ComparisonOperator::GreaterThan, PredicateValue::Single(operand)) => {
                value.comparable(operand) && value > operand
            }
            (ComparisonOperator::GreaterOrEqual, PredicateValue::Single(operand)) => {
                value.comparable(operand) && value >= operand
            }
            (ComparisonOperator::In, PredicateValue::List(operands)) => {
                !value.is_null() && operands.contains(value)
            }
            (ComparisonOperator::Between, PredicateValue::List(operands)) => {
                match operands.as_slice() {
                    [lower, upper] => {
                        value.comparable(lower)
                            && value.comparable(upper)
                            && lower <= value
                            && value <= upper
                    }
                    _ => false,
                }
            }
            // operator/operand shape mismatch
            _ => false,
        }
    }
}

/// A logical constraint in disjunctive normal form.
///
/// An empty constraint places no restriction at all; its domain is the
/// universal one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraint {
    clauses: Vec<Vec<Predicate>>,
}

impl Constraint {
    /// Create a [Constraint] from its conjunction clauses.
    pub fn new(clauses: Vec<Vec<Predicate>>) -> Self {
        Self { clauses }
    }

    /// The unrestricted constraint.
    pub fn none() -> Self {
        Self::default()
    }

    /// A constraint requiring all the given attributes to be non-null.
    pub fn not_null<Names, Name>(attributes: Names) -> Self
    where
        Names: IntoIterator<Item = Name>,
        Name: Into<String>,
    {
        Self {
            clauses: vec![attributes
                .into_iter()
                .map(|attribute| {
                    Predicate::new(attribute, ComparisonOperator::NotEqual, Value::Null)
                })
                .collect()],
        }
    }

    /// The conjunction clauses of this constraint.
    pub fn clauses(&self) -> &[Vec<Predicate>] {
        &self.clauses
    }

    /// Whether this constraint places no restriction.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Contraction projection onto the given attributes: every predicate
    /// over another attribute is dropped, and clauses emptied by this are
    /// removed entirely. The projected constraint is implied by the
    /// original one, never the other way around.
    pub fn project(&self, attributes: &BTreeSet<String>) -> Constraint {
        let clauses = self
            .clauses
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .filter(|predicate| attributes.contains(&predicate.attribute))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .filter(|clause| !clause.is_empty())
            .collect();
        Constraint { clauses }
    }

    /// Evaluate this constraint against a row: some clause must hold with
    /// all of its predicates. The empty constraint holds for every row.
    pub fn satisfied_by(&self, row: &Row) -> bool {
        if self.clauses.is_empty() {
            return true;
        }
        self.clauses
            .iter()
            .any(|clause| clause.iter().all(|predicate| predicate.matches(row)))
    }
}
