use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A role tag as issued by the identity verifier.
///
/// `Administrative` is a universal override: it passes every role gate and
/// turns every scope predicate into an unrestricted filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Teacher,
    Administrative,
}

impl Role {
    pub fn as_tag(self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Teacher => "TEACHER",
            Role::Administrative => "ADMINISTRATIVE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Role> {
        match tag {
            "STUDENT" => Some(Role::Student),
            "TEACHER" => Some(Role::Teacher),
            "ADMINISTRATIVE" => Some(Role::Administrative),
            _ => None,
        }
    }
}

/// The verified identity behind one request. Produced by the external
/// identity verifier and trusted as-is; immutable for the request's lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub roles: HashSet<Role>,
}

impl Principal {
    pub fn new(id: i64, roles: impl IntoIterator<Item = Role>) -> Principal {
        Principal {
            id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_administrative(&self) -> bool {
        self.has(Role::Administrative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for role in [Role::Student, Role::Teacher, Role::Administrative] {
            assert_eq!(Role::from_tag(role.as_tag()), Some(role));
        }
        assert_eq!(Role::from_tag("JANITOR"), None);
    }

    #[test]
    fn roles_deserialize_from_verifier_tags() {
        let p: Principal =
            serde_json::from_str(r#"{"id":7,"roles":["STUDENT","TEACHER"]}"#).unwrap();
        assert_eq!(p.id, 7);
        assert!(p.has(Role::Student));
        assert!(p.has(Role::Teacher));
        assert!(!p.is_administrative());
    }
}
