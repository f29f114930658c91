//! Value domains implied by atomic predicates.
//!
//! Every predicate describes a set of values its attribute may take; domain
//! containment between two predicates reduces to a subset test between
//! these sets. Containment is decided conservatively: whenever a pair of
//! domain shapes cannot be compared exactly, the answer is "not contained".

use std::collections::BTreeSet;

use crate::model::Value;

use super::{ComparisonOperator, Predicate, PredicateValue};

/// One end of an interval domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// The boundary value
    pub value: Value,
    /// Whether the boundary value itself belongs to the domain
    pub inclusive: bool,
}

/// The set of values an atomic predicate admits for its attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// Exactly one value
    Point(Value),
    /// A finite set of values
    Set(BTreeSet<Value>),
    /// A contiguous range; a missing boundary means unbounded on that side
    Interval {
        /// Lower end of the range
        lower: Option<Boundary>,
        /// Upper end of the range
        upper: Option<Boundary>,
    },
    /// Every value except one
    Excluded(Value),
}

impl Domain {
    /// The domain described by a predicate, or `None` if the predicate's
    /// operator and value shape do not combine into a well-formed domain.
    pub fn from_predicate(predicate: &Predicate) -> Option<Domain> {
        match (&predicate.operator, &predicate.value) {
            (ComparisonOperator::Equal, PredicateValue::Single(value)) => {
                Some(Domain::Point(value.clone()))
            }
            (ComparisonOperator::NotEqual, PredicateValue::Single(value)) => {
                Some(Domain::Excluded(value.clone()))
            }
            (ComparisonOperator::LessThan, PredicateValue::Single(value)) => {
                Some(Domain::Interval {
                    lower: None,
                    upper: Some(Boundary {
                        value: value.clone(),
                        inclusive: false,
                    }),
                })
            }
            (ComparisonOperator::LessOrEqual, PredicateValue::Single(value)) => {
                Some(Domain::Interval {
                    lower: None,
                    upper: Some(Boundary {
                        value: value.clone(),
                        inclusive: true,
                    }),
                })
            }
            (ComparisonOperator::GreaterThan, PredicateValue::Single(value)) => {
                Some(Domain::Interval {
                    lower: Some(Boundary {
                        value: value.clone(),
                        inclusive: false,
                    }),
                    upper: None,
                })
            }
            (ComparisonOperator::GreaterOrEqual, PredicateValue::Single(value)) => {
                Some(Domain::Interval {
                    lower: Some(Boundary {
                        value: value.clone(),
                        inclusive: true,
                    }),
                    upper: None,
                })
            }
            (ComparisonOperator::In, PredicateValue::List(values)) => {
                Some(Domain::Set(values.iter().cloned().collect()))
            }
            (ComparisonOperator::Between, PredicateValue::List(values)) => {
                match values.as_slice() {
                    [lower, upper] => Some(Domain::Interval {
                        lower: Some(Boundary {
                            value: lower.clone(),
                            inclusive: true,
                        }),
                        upper: Some(Boundary {
                            value: upper.clone(),
                            inclusive: true,
                        }),
                    }),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Whether a single value belongs to this domain.
    pub fn contains_value(&self, value: &Value) -> bool {
        match self {
            Domain::Point(point) => point == value,
            Domain::Set(elements) => elements.contains(value),
            Domain::Interval { lower, upper } => {
                let above_lower = match lower {
                    None => true,
                    Some(boundary) => {
                        value.comparable(&boundary.value)
                            && (value > &boundary.value
                                || (boundary.inclusive && value == &boundary.value))
                    }
                };
                let below_upper = match upper {
                    None => true,
                    Some(boundary) => {
                        value.comparable(&boundary.value)
                            && (value < &boundary.value
                                || (boundary.inclusive && value == &boundary.value))
                    }
                };
                above_lower && below_upper
            }
            Domain::Excluded(excluded) => value != excluded,
        }
    }

    /// If this domain consists of exactly one value, that value.
    fn as_point(&self) -> Option<&Value> {
        match self {
            Domain::Point(value) => Some(value),
            Domain::Interval {
                lower: Some(lower),
                upper: Some(upper),
            } if lower.inclusive && upper.inclusive && lower.value == upper.value => {
                Some(&lower.value)
            }
            Domain::Set(elements) if elements.len() == 1 => elements.iter().next(),
            _ => None,
        }
    }

    /// Whether this domain places no restriction at all.
    fn is_universal(&self) -> bool {
        matches!(
            self,
            Domain::Interval {
                lower: None,
                upper: None
            }
        )
    }

    /// Whether every value of this domain is also contained in `other`.
    pub fn is_subset(&self, other: &Domain) -> bool {
        if other.is_universal() {
            return true;
        }
        match self {
            Domain::Point(value) => other.contains_value(value),
            Domain::Set(elements) => {
                elements.iter().all(|value| other.contains_value(value))
            }
            Domain::Interval { lower, upper } => {
                if let Some(point) = self.as_point() {
                    return other.contains_value(point);
                }
                match other {
                    Domain::Interval {
                        lower: other_lower,
                        upper: other_upper,
                    } => {
                        boundary_below(other_lower.as_ref(), lower.as_ref())
                            && boundary_above(other_upper.as_ref(), upper.as_ref())
                    }
                    Domain::Excluded(excluded) => !self.contains_value(excluded),
                    // a proper interval never fits into a finite domain
                    _ => false,
                }
            }
            Domain::Excluded(excluded) => match other {
                Domain::Excluded(other_excluded) => excluded == other_excluded,
                _ => false,
            },
        }
    }
}

/// Whether the lower boundary `outer` admits every value admitted by the
/// lower boundary `inner`.
fn boundary_below(outer: Option<&Boundary>, inner: Option<&Boundary>) -> bool {
    match (outer, inner) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(outer), Some(inner)) => {
            if !outer.value.comparable(&inner.value) {
                return false;
            }
            outer.value < inner.value
                || (outer.value == inner.value && (outer.inclusive || !inner.inclusive))
        }
    }
}

/// Whether the upper boundary `outer` admits every value admitted by the
/// upper boundary `inner`.
fn boundary_above(outer: Option<&Boundary>, inner: Option<&Boundary>) -> bool {
    match (outer, inner) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(outer), Some(inner)) => {
            if !outer.value.comparable(&inner.value) {
                return false;
            }
            outer.value > inner.value
                || (outer.value == inner.value && (outer.inclusive || !inner.inclusive))
        }
    }
}

#[cfg(test)]
mod test {
    use crate::constraints::{ComparisonOperator, Predicate};
    use crate::model::Value;

    use super::{Boundary, Domain};

    fn interval(lower: Option<(f64, bool)>, upper: Option<(f64, bool)>) -> Domain {
        Domain::Interval {
            lower: lower.map(|(value, inclusive)| Boundary {
                value: Value::Float(value),
                inclusive,
            }),
            upper: upper.map(|(value, inclusive)| Boundary {
                value: Value::Float(value),
                inclusive,
            }),
        }
    }

    #[test]
    fn point_in_point() {
        let point = Domain::Point(Value::Float(33.5));
        assert!(point.is_subset(&point));
        assert!(point.is_subset(&Domain::Point(Value::Float(33.50))));
        assert!(!point.is_subset(&Domain::Point(Value::Float(66.5))));
    }

    #[test]
    fn point_in_text_point() {
        let point = Domain::Point(Value::from("random string"));
        assert!(point.is_subset(&Domain::Point(Value::from("random string"))));
        assert!(!point.is_subset(&Domain::Point(Value::from("another string"))));
    }

    #[test]
    fn point_in_interval() {
        let point = Domain::Point(Value::Float(33.5));
        assert!(point.is_subset(&interval(Some((30.0, true)), Some((66.5, true)))));
        // on an exclusive border
        assert!(!point.is_subset(&interval(Some((33.5, false)), Some((66.5, true)))));
        // on an inclusive border
        assert!(point.is_subset(&interval(Some((33.5, true)), Some((66.5, true)))));
    }

    #[test]
    fn degenerate_interval_is_a_point() {
        let degenerate = interval(Some((33.5, true)), Some((33.5, true)));
        assert!(degenerate.is_subset(&Domain::Point(Value::Float(33.5))));
        let exclusive = interval(Some((33.5, false)), Some((33.5, false)));
        assert!(!exclusive.is_subset(&Domain::Point(Value::Float(33.5))));
        // a proper interval never fits into a point
        let proper = interval(Some((30.0, true)), Some((66.5, true)));
        assert!(!proper.is_subset(&Domain::Point(Value::Float(33.5))));
    }

    #[test]
    fn interval_in_interval() {
        let inner = interval(Some((3.0, true)), Some((15.0, true)));
        let outer = interval(Some((2.0, true)), Some((11.0, true)));
        // overlapping but neither contains the other
        assert!(!inner.is_subset(&outer));
        assert!(!outer.is_subset(&inner));

        let wide = interval(Some((0.0, true)), Some((20.0, false)));
        assert!(inner.is_subset(&wide));
        assert!(!wide.is_subset(&inner));

        // equal boundary values with differing inclusivity
        let open = interval(Some((3.0, false)), Some((15.0, false)));
        assert!(open.is_subset(&inner));
        assert!(!inner.is_subset(&open));

        // unbounded sides
        let half_open = interval(Some((3.0, true)), None);
        assert!(inner.is_subset(&half_open));
        assert!(!half_open.is_subset(&inner));
    }

    #[test]
    fn set_membership() {
        let set = Domain::Set(
            [Value::Integer(3), Value::Integer(5), Value::Integer(6)]
                .into_iter()
                .collect(),
        );
        assert!(Domain::Point(Value::Integer(3)).is_subset(&set));
        assert!(!Domain::Point(Value::Integer(4)).is_subset(&set));

        let subset = Domain::Set([Value::Integer(3), Value::Integer(5)].into_iter().collect());
        assert!(subset.is_subset(&set));
        assert!(!set.is_subset(&subset));
    }

    #[test]
    fn excluded_value() {
        let excluded = Domain::Excluded(Value::Integer(16));
        assert!(Domain::Point(Value::Integer(15)).is_subset(&excluded));
        assert!(!Domain::Point(Value::Integer(16)).is_subset(&excluded));
        assert!(excluded.is_subset(&excluded));
        assert!(!excluded.is_subset(&Domain::Excluded(Value::Integer(17))));
        // everything except a value fits into the unbounded interval
        assert!(excluded.is_subset(&interval(None, None)));
        // an interval avoiding the excluded value fits
        let below = interval(None, Some((10.0, true)));
        assert!(below.is_subset(&excluded));
        let around = interval(Some((10.0, true)), Some((20.0, true)));
        assert!(!around.is_subset(&excluded));
    }

    #[test]
    fn factory_rejects_malformed_predicates() {
        let predicate = Predicate::with_list(
            "A",
            ComparisonOperator::Between,
            vec![Value::Integer(1)],
        );
        assert!(Domain::from_predicate(&predicate).is_none());

        let predicate = Predicate::new("A", ComparisonOperator::In, Value::Integer(1));
        assert!(Domain::from_predicate(&predicate).is_none());
    }

    #[test]
    fn factory_builds_expected_shapes() {
        let predicate = Predicate::new("A", ComparisonOperator::LessThan, Value::Integer(4));
        assert_eq!(
            Domain::from_predicate(&predicate),
            Some(Domain::Interval {
                lower: None,
                upper: Some(Boundary {
                    value: Value::Integer(4),
                    inclusive: false
                })
            })
        );

        let predicate = Predicate::with_list(
            "A",
            ComparisonOperator::Between,
            vec![Value::Integer(3), Value::Integer(15)],
        );
        let domain = Domain::from_predicate(&predicate).unwrap();
        assert!(domain.contains_value(&Value::Integer(3)));
        assert!(domain.contains_value(&Value::Integer(15)));
        assert!(!domain.contains_value(&Value::Integer(16)));
    }
}
