//! The coarse role gate. Resource/verb level only; it never inspects row
//! identity, and for most writes it is the whole decision.

use crate::principal::{Principal, Role};
use crate::resource::{descriptor, Verb};
use crate::scope::Resource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Allow if the principal is administrative, or holds any of the allowed
/// roles. The administrative override applies even when `Administrative` is
/// absent from `allowed`.
pub fn check(allowed: &[Role], principal: &Principal) -> Decision {
    if principal.is_administrative() {
        return Decision::Allow;
    }
    if allowed.iter().any(|role| principal.has(*role)) {
        Decision::Allow
    } else {
        Decision::Deny("role not permitted for this operation")
    }
}

/// Resource/verb entry point for route-mounting code, reading the declared
/// role lists off the static resource table. Public-view reads always pass;
/// an unmounted write verb always denies (the route should not exist).
pub fn check_verb(resource: Resource, verb: Verb, principal: &Principal) -> Decision {
    let desc = descriptor(resource);
    match verb {
        Verb::List | Verb::Get => match desc.read_roles {
            Some(roles) => check(roles, principal),
            None => Decision::Allow,
        },
        Verb::Create | Verb::Update | Verb::Delete => match desc.write_roles(verb) {
            Some(roles) => check(roles, principal),
            None => Decision::Deny("operation not mounted"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_allows() {
        let p = Principal::new(1, [Role::Teacher]);
        assert!(check(&[Role::Teacher], &p).allowed());
        assert!(check(&[Role::Student, Role::Teacher], &p).allowed());
    }

    #[test]
    fn disjoint_roles_deny() {
        let p = Principal::new(1, [Role::Student]);
        assert_eq!(
            check(&[Role::Teacher], &p),
            Decision::Deny("role not permitted for this operation")
        );
        assert!(!check(&[], &p).allowed());
    }

    #[test]
    fn administrative_override_is_unconditional() {
        // ADMINISTRATIVE is not in the allowed list, and passes anyway.
        let p = Principal::new(1, [Role::Administrative]);
        assert!(check(&[Role::Teacher], &p).allowed());
        assert!(check(&[], &p).allowed());
    }

    #[test]
    fn check_verb_reads_the_resource_table() {
        let student = Principal::new(5, [Role::Student]);
        // Public-view read.
        assert!(check_verb(Resource::Faculties, Verb::List, &student).allowed());
        // Gated read and write.
        assert!(check_verb(Resource::Students, Verb::Get, &student).allowed());
        assert!(!check_verb(Resource::Students, Verb::Create, &student).allowed());
        // Unmounted verb denies even for administrative principals.
        let admin = Principal::new(1, [Role::Administrative]);
        assert!(!check_verb(Resource::Grades, Verb::Delete, &admin).allowed());
    }
}
