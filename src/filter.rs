//! Read-side row filters.
//!
//! A `Filter` is pure data: building one never touches storage, and
//! evaluating one twice over the same row gives the same answer. The scope
//! predicates in [`crate::scope`] only ever produce values of this type; the
//! storage collaborator is what turns them into `WHERE` clauses.

use crate::cache::CourseOffering;
use crate::storage::Row;
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// No constraint at all.
    Unrestricted,
    /// `field = value`.
    Eq(&'static str, i64),
    /// `field ∈ set`. Never empty; an empty set normalizes to `DenyAll`.
    In(&'static str, BTreeSet<i64>),
    /// Conjunction of the children.
    All(Vec<Filter>),
    /// Disjunction of the children.
    Any(Vec<Filter>),
    /// Matches nothing. "No access path" is this, never an error.
    DenyAll,
}

impl Filter {
    /// `field ∈ values`, normalizing the empty set to `DenyAll`.
    pub fn in_set(field: &'static str, values: impl IntoIterator<Item = i64>) -> Filter {
        let set: BTreeSet<i64> = values.into_iter().collect();
        if set.is_empty() {
            Filter::DenyAll
        } else {
            Filter::In(field, set)
        }
    }

    /// Disjunction of independent access paths. No path means no access.
    pub fn any_of(paths: Vec<Filter>) -> Filter {
        let mut kept: Vec<Filter> = paths
            .into_iter()
            .filter(|p| *p != Filter::DenyAll)
            .collect();

        if kept.iter().any(|p| *p == Filter::Unrestricted) {
            return Filter::Unrestricted;
        }

        match kept.len() {
            0 => Filter::DenyAll,
            1 => kept.remove(0),
            _ => Filter::Any(kept),
        }
    }

    /// Scope to an exact set of (course, period) pairs. A bare `In` over each
    /// column would also admit cross products like (course A, period B) when
    /// the cache only holds (A, A') and (B, B').
    pub fn offerings(
        course_field: &'static str,
        period_field: &'static str,
        offerings: &[CourseOffering],
    ) -> Filter {
        let pairs: BTreeSet<(i64, i64)> = offerings
            .iter()
            .map(|o| (o.course_id, o.period_id))
            .collect();

        Filter::any_of(
            pairs
                .into_iter()
                .map(|(course, period)| {
                    Filter::All(vec![
                        Filter::Eq(course_field, course),
                        Filter::Eq(period_field, period),
                    ])
                })
                .collect(),
        )
    }

    /// Conjunctive merge: the result admits a row only if both sides do.
    /// Used to append a scope predicate to whatever constraint the request
    /// already carries, so the predicate narrows and never widens.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Unrestricted, f) | (f, Filter::Unrestricted) => f,
            (Filter::DenyAll, _) | (_, Filter::DenyAll) => Filter::DenyAll,
            (Filter::All(mut left), Filter::All(right)) => {
                left.extend(right);
                Filter::All(left)
            }
            (Filter::All(mut left), f) => {
                left.push(f);
                Filter::All(left)
            }
            (f, Filter::All(mut right)) => {
                right.insert(0, f);
                Filter::All(right)
            }
            (a, b) => Filter::All(vec![a, b]),
        }
    }

    /// Evaluate against one row. A field that is missing or non-numeric
    /// fails the clause that mentions it.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Unrestricted => true,
            Filter::DenyAll => false,
            Filter::Eq(field, value) => field_i64(row, field) == Some(*value),
            Filter::In(field, set) => {
                field_i64(row, field).map_or(false, |v| set.contains(&v))
            }
            Filter::All(parts) => parts.iter().all(|p| p.matches(row)),
            Filter::Any(parts) => parts.iter().any(|p| p.matches(row)),
        }
    }
}

fn field_i64(row: &Row, field: &str) -> Option<i64> {
    row.get(field).and_then(Value::as_i64)
}
