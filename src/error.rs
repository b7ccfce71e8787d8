//! Request-level error taxonomy. Every class is terminal: nothing here is
//! retried, and a denial is never downgraded into a weaker operation.

use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No principal on the request. Surfaced before any cache loading.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Role gate or ownership guard denial. Dangling foreign keys in guarded
    /// creates collapse into this class too.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// The row does not exist, or the scope predicate excludes it. The two
    /// are deliberately indistinguishable so a read never confirms the
    /// existence of a row the principal cannot see.
    #[error("not found")]
    NotFound,

    /// The verb is not mounted for this resource.
    #[error("no such operation")]
    NoSuchOperation,

    /// Collaborator failure during cache loading, guard resolution, or the
    /// storage call. Aborts the whole request; a filter is never partially
    /// applied.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
