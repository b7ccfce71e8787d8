//! The per-request pipeline, one assembly per resource and verb:
//!
//! verify principal → load relationship caches → (reads: role gate unless
//! public, then scope-predicate merge) | (writes: verb gate, then optional
//! ownership guard) → storage call.
//!
//! Everything short-circuits: a denial never reaches storage, and a read the
//! predicate excludes reports plain "not found".

use crate::cache::RelationshipCache;
use crate::error::Error;
use crate::filter::Filter;
use crate::gate::{self, Decision};
use crate::guard;
use crate::principal::Principal;
use crate::resource::{descriptor, Guarded, ResourceDescriptor, Verb};
use crate::scope::{self, Resource};
use crate::storage::{Relations, Row, Store};
use log::{debug, warn};

pub struct Pipeline<B> {
    backend: B,
}

impl<B: Relations + Store> Pipeline<B> {
    pub fn new(backend: B) -> Pipeline<B> {
        Pipeline { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// List the rows of `resource` visible to the principal, further narrowed
    /// by whatever constraint the request already carries (`base`). The scope
    /// predicate only ever narrows `base`.
    pub fn list(
        &self,
        resource: Resource,
        principal: Option<&Principal>,
        base: Filter,
    ) -> Result<Vec<Row>, Error> {
        let principal = require(principal)?;
        let (desc, scope) = self.read_scope(resource, principal)?;
        Ok(self.backend.list(desc.storage_path, &base.and(scope))?)
    }

    /// Point read: list narrowed by id, exactly one row expected. A row the
    /// predicate excludes is reported as not found, never as forbidden.
    pub fn get(
        &self,
        resource: Resource,
        principal: Option<&Principal>,
        id: i64,
    ) -> Result<Row, Error> {
        let principal = require(principal)?;
        let (desc, scope) = self.read_scope(resource, principal)?;
        self.backend
            .get(desc.storage_path, &scope, id)?
            .ok_or(Error::NotFound)
    }

    pub fn create(
        &self,
        resource: Resource,
        principal: Option<&Principal>,
        body: Row,
    ) -> Result<Row, Error> {
        let principal = require(principal)?;
        let desc = self.write_gate(resource, Verb::Create, principal)?;

        if let Some(guarded) = desc.create_guard {
            let decision = match guarded {
                Guarded::SessionCreate => {
                    guard::session_create(&self.backend, &body, principal)?
                }
                Guarded::AttendanceCreate => {
                    guard::attendance_create(&self.backend, &body, principal)?
                }
            };
            if let Decision::Deny(reason) = decision {
                warn!(
                    "principal {} denied create on {}: {}",
                    principal.id, desc.name, reason
                );
                return Err(Error::Forbidden(reason));
            }
        }

        let row = whitelist(body, desc.writable_fields);
        Ok(self.backend.insert(desc.storage_path, row)?)
    }

    pub fn update(
        &self,
        resource: Resource,
        principal: Option<&Principal>,
        id: i64,
        changes: Row,
    ) -> Result<Row, Error> {
        let principal = require(principal)?;
        let desc = self.write_gate(resource, Verb::Update, principal)?;
        let changes = whitelist(changes, desc.writable_fields);
        self.backend
            .update(desc.storage_path, id, changes)?
            .ok_or(Error::NotFound)
    }

    pub fn delete(
        &self,
        resource: Resource,
        principal: Option<&Principal>,
        id: i64,
    ) -> Result<(), Error> {
        let principal = require(principal)?;
        let desc = self.write_gate(resource, Verb::Delete, principal)?;
        if self.backend.delete(desc.storage_path, id)? {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// Shared read prefix: cache load, gate (unless the resource is a public
    /// view), predicate resolution.
    fn read_scope(
        &self,
        resource: Resource,
        principal: &Principal,
    ) -> Result<(&'static ResourceDescriptor, Filter), Error> {
        let desc = descriptor(resource);
        let cache = RelationshipCache::load(&self.backend, principal)?;
        if let Some(roles) = desc.read_roles {
            if let Decision::Deny(reason) = gate::check(roles, principal) {
                debug!(
                    "principal {} denied read on {}: {}",
                    principal.id, desc.name, reason
                );
                return Err(Error::Forbidden(reason));
            }
        }
        Ok((desc, scope::resolve(resource, principal, &cache)))
    }

    /// Shared write prefix: cache load, verb-mount check, verb gate.
    fn write_gate(
        &self,
        resource: Resource,
        verb: Verb,
        principal: &Principal,
    ) -> Result<&'static ResourceDescriptor, Error> {
        let desc = descriptor(resource);
        // Writes load the cache too; the loader is the one stage shape shared
        // by every verb.
        let _cache = RelationshipCache::load(&self.backend, principal)?;
        let roles = desc.write_roles(verb).ok_or(Error::NoSuchOperation)?;
        if let Decision::Deny(reason) = gate::check(roles, principal) {
            debug!(
                "principal {} denied {:?} on {}: {}",
                principal.id, verb, desc.name, reason
            );
            return Err(Error::Forbidden(reason));
        }
        Ok(desc)
    }
}

fn require(principal: Option<&Principal>) -> Result<&Principal, Error> {
    principal.ok_or(Error::Unauthenticated)
}

fn whitelist(body: Row, allowed: &[&str]) -> Row {
    body.into_iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist_drops_unknown_fields() {
        let body: Row = serde_json::json!({"name": "Science", "id": 9, "role": "ADMIN"})
            .as_object()
            .unwrap()
            .clone();
        let kept = whitelist(body, &["name"]);
        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key("name"));
    }

    #[test]
    fn missing_principal_is_unauthenticated() {
        assert!(matches!(require(None), Err(Error::Unauthenticated)));
    }
}
