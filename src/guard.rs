//! Ownership guards for the two guarded creates: tutoring sessions (body
//! references a schedule slot) and tutoring attendance (body references a
//! session). The decision itself is a pure function over the resolved owner;
//! the single storage lookup happens in the thin resolving wrappers.

use crate::gate::Decision;
use crate::principal::Principal;
use crate::storage::{Relations, Row, StorageError};
use serde_json::Value;

/// Allow iff the resolved monitor owns the parent listing. A dangling (or
/// missing) foreign key resolves to `None` and is a denial, never a separate
/// error class: a nonexistent parent can never authorize a write.
pub fn monitor_decision(monitor: Option<i64>, principal: &Principal) -> Decision {
    if principal.is_administrative() {
        return Decision::Allow;
    }
    match monitor {
        Some(id) if id == principal.id => Decision::Allow,
        _ => Decision::Deny("not authorized to create this sub-resource"),
    }
}

/// Guard for creating a tutoring session: `slot_id` in the body must resolve
/// to a listing monitored by the principal.
pub fn session_create(
    relations: &impl Relations,
    body: &Row,
    principal: &Principal,
) -> Result<Decision, StorageError> {
    if principal.is_administrative() {
        return Ok(Decision::Allow);
    }
    let monitor = match body.get("slot_id").and_then(Value::as_i64) {
        Some(slot_id) => relations.slot_monitor(slot_id)?,
        None => None,
    };
    Ok(monitor_decision(monitor, principal))
}

/// Guard for recording tutoring attendance: `session_id` in the body must
/// resolve to a listing monitored by the principal.
pub fn attendance_create(
    relations: &impl Relations,
    body: &Row,
    principal: &Principal,
) -> Result<Decision, StorageError> {
    if principal.is_administrative() {
        return Ok(Decision::Allow);
    }
    let monitor = match body.get("session_id").and_then(Value::as_i64) {
        Some(session_id) => relations.session_monitor(session_id)?,
        None => None,
    };
    Ok(monitor_decision(monitor, principal))
}
