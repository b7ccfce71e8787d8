//! The static resource table: one immutable descriptor per resource type,
//! declared at process start and read-only afterwards. The pipeline
//! assembler consumes this table instead of any ambient state.

use crate::principal::Role;
use crate::scope::Resource;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verb {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Which custom create guard a resource carries, if any.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Guarded {
    SessionCreate,
    AttendanceCreate,
}

pub struct ResourceDescriptor {
    pub resource: Resource,
    pub name: &'static str,
    pub storage_path: &'static str,
    /// Body fields a write may touch; everything else is dropped.
    pub writable_fields: &'static [&'static str],
    /// Roles allowed to read. `None` means public to any authenticated
    /// principal (the read gate is skipped; the scope predicate still runs).
    pub read_roles: Option<&'static [Role]>,
    /// Roles per write verb. `None` means the verb is not mounted at all:
    /// the operation does not exist for this resource, it is not a 403.
    pub create_roles: Option<&'static [Role]>,
    pub update_roles: Option<&'static [Role]>,
    pub delete_roles: Option<&'static [Role]>,
    pub create_guard: Option<Guarded>,
}

impl ResourceDescriptor {
    pub fn write_roles(&self, verb: Verb) -> Option<&'static [Role]> {
        match verb {
            Verb::Create => self.create_roles,
            Verb::Update => self.update_roles,
            Verb::Delete => self.delete_roles,
            Verb::List | Verb::Get => None,
        }
    }
}

const ADMIN: &[Role] = &[Role::Administrative];
const TEACH: &[Role] = &[Role::Teacher];
const STUDY: &[Role] = &[Role::Student];
const MEMBERS: &[Role] = &[Role::Student, Role::Teacher];

/// Catalog resource: public reads, administrative writes.
const fn catalog(
    resource: Resource,
    name: &'static str,
    path: &'static str,
    writable: &'static [&'static str],
) -> ResourceDescriptor {
    ResourceDescriptor {
        resource,
        name,
        storage_path: path,
        writable_fields: writable,
        read_roles: None,
        create_roles: Some(ADMIN),
        update_roles: Some(ADMIN),
        delete_roles: Some(ADMIN),
        create_guard: None,
    }
}

pub static RESOURCES: &[ResourceDescriptor] = &[
    catalog(Resource::Faculties, "faculties", "faculties", &["name"]),
    catalog(
        Resource::Programs,
        "programs",
        "programs",
        &["name", "faculty_id"],
    ),
    catalog(
        Resource::Subjects,
        "subjects",
        "subjects",
        &["name", "code", "program_id"],
    ),
    catalog(
        Resource::Periods,
        "periods",
        "periods",
        &["name", "starts_on", "ends_on"],
    ),
    catalog(
        Resource::Courses,
        "courses",
        "courses",
        &["subject_id", "name", "credits"],
    ),
    catalog(
        Resource::AdvisoryTypes,
        "advisory-types",
        "advisory_types",
        &["name", "description"],
    ),
    ResourceDescriptor {
        resource: Resource::Teachers,
        name: "teachers",
        storage_path: "teachers",
        writable_fields: &["first_name", "last_name", "email", "faculty_id"],
        read_roles: Some(MEMBERS),
        create_roles: Some(ADMIN),
        update_roles: Some(ADMIN),
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::Students,
        name: "students",
        storage_path: "students",
        writable_fields: &["first_name", "last_name", "email", "program_id"],
        read_roles: Some(MEMBERS),
        create_roles: Some(ADMIN),
        update_roles: Some(ADMIN),
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::Enrollments,
        name: "enrollments",
        storage_path: "enrollments",
        writable_fields: &["student_id", "course_id", "period_id", "active"],
        read_roles: Some(MEMBERS),
        create_roles: Some(ADMIN),
        // Enrollments are cancelled, never edited in place.
        update_roles: None,
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::TeachingAssignments,
        name: "teaching-assignments",
        storage_path: "teaching_assignments",
        writable_fields: &["teacher_id", "course_id", "period_id", "active"],
        read_roles: Some(MEMBERS),
        create_roles: Some(ADMIN),
        update_roles: Some(ADMIN),
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::ClassSchedules,
        name: "class-schedules",
        storage_path: "class_schedules",
        writable_fields: &["course_id", "period_id", "weekday", "starts_at", "ends_at", "room"],
        read_roles: Some(MEMBERS),
        create_roles: Some(ADMIN),
        update_roles: Some(ADMIN),
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::ClassAttendance,
        name: "class-attendance",
        storage_path: "class_attendance",
        writable_fields: &["student_id", "course_id", "period_id", "held_on", "present"],
        read_roles: Some(MEMBERS),
        create_roles: Some(TEACH),
        update_roles: Some(TEACH),
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::Grades,
        name: "grades",
        storage_path: "grades",
        writable_fields: &["student_id", "course_id", "period_id", "label", "score"],
        read_roles: Some(MEMBERS),
        create_roles: Some(TEACH),
        update_roles: Some(TEACH),
        // Grades are never deleted.
        delete_roles: None,
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::TutoringListings,
        name: "tutoring-listings",
        storage_path: "tutoring_listings",
        writable_fields: &["course_id", "period_id", "monitor_id", "capacity"],
        read_roles: Some(MEMBERS),
        create_roles: Some(ADMIN),
        update_roles: Some(ADMIN),
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::TutoringSlots,
        name: "tutoring-slots",
        storage_path: "tutoring_slots",
        writable_fields: &["listing_id", "weekday", "starts_at", "ends_at", "room"],
        read_roles: None,
        create_roles: Some(ADMIN),
        update_roles: Some(ADMIN),
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
    ResourceDescriptor {
        resource: Resource::TutoringSessions,
        name: "tutoring-sessions",
        storage_path: "tutoring_sessions",
        writable_fields: &["slot_id", "listing_id", "course_id", "period_id", "monitor_id", "held_on", "topic"],
        read_roles: Some(MEMBERS),
        create_roles: Some(STUDY),
        update_roles: Some(ADMIN),
        delete_roles: Some(ADMIN),
        create_guard: Some(Guarded::SessionCreate),
    },
    ResourceDescriptor {
        resource: Resource::TutoringAttendance,
        name: "tutoring-attendance",
        storage_path: "tutoring_attendance",
        writable_fields: &["session_id", "student_id", "monitor_id", "present"],
        read_roles: Some(MEMBERS),
        create_roles: Some(STUDY),
        update_roles: None,
        delete_roles: Some(ADMIN),
        create_guard: Some(Guarded::AttendanceCreate),
    },
    ResourceDescriptor {
        resource: Resource::AdvisorySessions,
        name: "advisory-sessions",
        storage_path: "advisory_sessions",
        writable_fields: &["advisor_id", "student_id", "advisory_type_id", "held_on", "notes"],
        read_roles: Some(MEMBERS),
        create_roles: Some(TEACH),
        update_roles: Some(TEACH),
        delete_roles: Some(ADMIN),
        create_guard: None,
    },
];

/// Look up a resource's descriptor. The table is total over [`Resource`];
/// see the test below.
pub fn descriptor(resource: Resource) -> &'static ResourceDescriptor {
    RESOURCES
        .iter()
        .find(|d| d.resource == resource)
        .expect("every resource is declared in RESOURCES")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope;

    #[test]
    fn the_table_is_total_and_unambiguous() {
        for resource in scope::ALL {
            let count = RESOURCES.iter().filter(|d| d.resource == *resource).count();
            assert_eq!(count, 1, "{:?} must appear exactly once", resource);
        }
        assert_eq!(RESOURCES.len(), scope::ALL.len());
    }

    #[test]
    fn guards_sit_only_on_the_two_guarded_resources() {
        for d in RESOURCES {
            match d.resource {
                Resource::TutoringSessions => {
                    assert_eq!(d.create_guard, Some(Guarded::SessionCreate))
                }
                Resource::TutoringAttendance => {
                    assert_eq!(d.create_guard, Some(Guarded::AttendanceCreate))
                }
                _ => assert_eq!(d.create_guard, None),
            }
        }
    }

    #[test]
    fn unmounted_verbs_have_no_role_list() {
        assert_eq!(descriptor(Resource::Grades).write_roles(Verb::Delete), None);
        assert_eq!(
            descriptor(Resource::Enrollments).write_roles(Verb::Update),
            None
        );
        // Reads never go through write_roles.
        assert_eq!(descriptor(Resource::Grades).write_roles(Verb::List), None);
    }
}
