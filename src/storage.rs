//! Collaborator seams. The core never executes queries itself; it asks a
//! `Relations` implementation for the point and set lookups its cache loader
//! and write guards need, and hands a `Store` implementation the filter to
//! append to read queries.

use crate::cache::{CourseOffering, TeachingAssignment};
use crate::filter::Filter;
use serde_json::Value;
use thiserror::Error;

/// A storage record at this seam. Column types richer than numbers and
/// strings are the storage layer's concern, not the resolver's.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not acquire a database connection: {0}")]
    Pool(String),
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

/// Read-only relationship lookups. Every method is point-in-time; the loader
/// calls each at most once per request.
pub trait Relations {
    /// Active course registrations of a student for the current period.
    fn student_enrollments(&self, student_id: i64) -> Result<Vec<CourseOffering>, StorageError>;

    /// Active teaching assignments of a teacher for the current period.
    fn teacher_assignments(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeachingAssignment>, StorageError>;

    /// Ids of students actively enrolled in any of the given offerings.
    fn students_in(&self, offerings: &[CourseOffering]) -> Result<Vec<i64>, StorageError>;

    /// Monitor-student id owning the listing a schedule slot belongs to.
    /// `None` for a dangling slot id.
    fn slot_monitor(&self, slot_id: i64) -> Result<Option<i64>, StorageError>;

    /// Monitor-student id owning the listing a tutoring session belongs to.
    /// `None` for a dangling session id.
    fn session_monitor(&self, session_id: i64) -> Result<Option<i64>, StorageError>;
}

/// Query execution, keyed by a resource's storage path. Reads take the
/// already-merged filter; writes run only after the gate/guard decision.
pub trait Store {
    fn list(&self, path: &str, filter: &Filter) -> Result<Vec<Row>, StorageError>;

    /// Point read: the row with this id, provided the filter admits it.
    fn get(&self, path: &str, filter: &Filter, id: i64) -> Result<Option<Row>, StorageError> {
        let narrowed = filter.clone().and(Filter::Eq("id", id));
        Ok(self.list(path, &narrowed)?.into_iter().next())
    }

    fn insert(&self, path: &str, row: Row) -> Result<Row, StorageError>;

    fn update(&self, path: &str, id: i64, changes: Row) -> Result<Option<Row>, StorageError>;

    /// Returns whether a row was actually removed.
    fn delete(&self, path: &str, id: i64) -> Result<bool, StorageError>;
}
