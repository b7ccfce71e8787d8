//! Access-scoping core for an academic-records backend.
//!
//! Given an already-verified [`Principal`], this crate decides which rows of
//! each resource that principal may read and whether a given write is
//! permitted. Visibility is derived from relationships (a teacher sees the
//! students enrolled in the offerings they teach; a student sees their own
//! records and the tutoring that covers their courses), not from a static
//! per-row owner column.
//!
//! The moving parts, leaves first:
//!
//! * [`cache::RelationshipCache`] — request-scoped relationship sets, loaded
//!   once per request through the [`storage::Relations`] seam.
//! * [`scope`] — per-resource pure predicates producing a [`Filter`].
//! * [`gate`] — the coarse role gate, with the administrative override.
//! * [`guard`] — ownership guards for the two guarded creates.
//! * [`pipeline::Pipeline`] — assembles the stages per resource and verb and
//!   hands the merged filter to the [`storage::Store`] collaborator.
//!
//! Token verification, password hashing, HTTP routing, and query execution
//! all live outside this crate; it consumes their interfaces only.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod gate;
pub mod guard;
pub mod memory;
pub mod pipeline;
pub mod principal;
pub mod resource;
pub mod schema;
pub mod scope;
pub mod storage;

pub use cache::RelationshipCache;
pub use error::Error;
pub use filter::Filter;
pub use gate::Decision;
pub use pipeline::Pipeline;
pub use principal::{Principal, Role};
pub use scope::Resource;
pub use storage::{Relations, Row, StorageError, Store};
