//! The scope-predicate registry: for every resource type, a pure function
//! from `(Principal, RelationshipCache)` to a read-side [`Filter`].
//!
//! The rules, applied uniformly:
//! 1. Administrative principals are unrestricted, regardless of other roles.
//! 2. "Own records" scope to the principal's id or owner column.
//! 3. Relationship-derived visibility scopes to the cache's exact
//!    (course, period) pairs.
//! 4. Several access paths combine as a disjunction.
//! 5. No access path is the explicit deny-all filter, never an error and
//!    never an unconstrained query.
//! 6. Reference catalogs are readable by any authenticated principal.
//!
//! Consulted for reads only; the pipeline merges the result conjunctively
//! with the request's own constraint.

use crate::cache::RelationshipCache;
use crate::filter::Filter;
use crate::principal::{Principal, Role};

/// Tag for each resource type the backend serves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Faculties,
    Programs,
    Subjects,
    Periods,
    Courses,
    Teachers,
    Students,
    Enrollments,
    TeachingAssignments,
    ClassSchedules,
    ClassAttendance,
    Grades,
    TutoringListings,
    TutoringSlots,
    TutoringSessions,
    TutoringAttendance,
    AdvisoryTypes,
    AdvisorySessions,
}

/// Resolve the read filter for one resource. Pure: no storage access, no
/// mutation, structurally equal output for equal input.
pub fn resolve(resource: Resource, principal: &Principal, cache: &RelationshipCache) -> Filter {
    if principal.is_administrative() {
        return Filter::Unrestricted;
    }

    use Resource::*;
    match resource {
        // Reference catalogs: visible to any authenticated principal.
        Faculties | Programs | Subjects | Periods | Courses | AdvisoryTypes | TutoringSlots => {
            Filter::Unrestricted
        }

        Students => {
            let mut paths = Vec::new();
            if principal.has(Role::Student) {
                paths.push(Filter::Eq("id", principal.id));
            }
            if principal.has(Role::Teacher) {
                paths.push(Filter::in_set(
                    "id",
                    cache.section_students().iter().copied(),
                ));
            }
            Filter::any_of(paths)
        }

        Teachers => {
            if principal.has(Role::Teacher) {
                Filter::Eq("id", principal.id)
            } else {
                Filter::DenyAll
            }
        }

        Enrollments => {
            let mut paths = Vec::new();
            if principal.has(Role::Student) {
                paths.push(Filter::Eq("student_id", principal.id));
            }
            if principal.has(Role::Teacher) {
                paths.push(Filter::offerings(
                    "course_id",
                    "period_id",
                    &cache.teacher_offerings(),
                ));
            }
            Filter::any_of(paths)
        }

        TeachingAssignments => {
            let mut paths = Vec::new();
            if principal.has(Role::Teacher) {
                paths.push(Filter::Eq("teacher_id", principal.id));
            }
            if principal.has(Role::Student) {
                // Students may see who teaches the offerings they sit in.
                paths.push(Filter::offerings(
                    "course_id",
                    "period_id",
                    cache.student_enrollments(),
                ));
            }
            Filter::any_of(paths)
        }

        ClassSchedules => {
            let mut paths = Vec::new();
            if principal.has(Role::Teacher) {
                paths.push(Filter::offerings(
                    "course_id",
                    "period_id",
                    &cache.teacher_offerings(),
                ));
            }
            if principal.has(Role::Student) {
                paths.push(Filter::offerings(
                    "course_id",
                    "period_id",
                    cache.student_enrollments(),
                ));
            }
            Filter::any_of(paths)
        }

        // The teacher path here is deliberately derived from
        // teacher_assignments; see DESIGN.md on the attendance gap.
        ClassAttendance | Grades => {
            let mut paths = Vec::new();
            if principal.has(Role::Student) {
                paths.push(Filter::Eq("student_id", principal.id));
            }
            if principal.has(Role::Teacher) {
                paths.push(Filter::offerings(
                    "course_id",
                    "period_id",
                    &cache.teacher_offerings(),
                ));
            }
            Filter::any_of(paths)
        }

        TutoringListings => {
            let mut paths = Vec::new();
            if principal.has(Role::Student) {
                // Their own listing as a monitor, or a listing covering a
                // course they are enrolled in.
                paths.push(Filter::Eq("monitor_id", principal.id));
                paths.push(Filter::in_set("course_id", cache.enrolled_course_ids()));
            }
            if principal.has(Role::Teacher) {
                paths.push(Filter::offerings(
                    "course_id",
                    "period_id",
                    &cache.teacher_offerings(),
                ));
            }
            Filter::any_of(paths)
        }

        TutoringSessions => {
            let mut paths = Vec::new();
            if principal.has(Role::Student) {
                paths.push(Filter::Eq("monitor_id", principal.id));
                paths.push(Filter::in_set("course_id", cache.enrolled_course_ids()));
            }
            if principal.has(Role::Teacher) {
                paths.push(Filter::offerings(
                    "course_id",
                    "period_id",
                    &cache.teacher_offerings(),
                ));
            }
            Filter::any_of(paths)
        }

        TutoringAttendance => {
            let mut paths = Vec::new();
            if principal.has(Role::Student) {
                paths.push(Filter::Eq("student_id", principal.id));
                paths.push(Filter::Eq("monitor_id", principal.id));
            }
            Filter::any_of(paths)
        }

        AdvisorySessions => {
            let mut paths = Vec::new();
            if principal.has(Role::Student) {
                paths.push(Filter::Eq("student_id", principal.id));
            }
            if principal.has(Role::Teacher) {
                paths.push(Filter::Eq("advisor_id", principal.id));
            }
            Filter::any_of(paths)
        }
    }
}

/// Every declared resource, for exhaustive checks.
pub const ALL: &[Resource] = &[
    Resource::Faculties,
    Resource::Programs,
    Resource::Subjects,
    Resource::Periods,
    Resource::Courses,
    Resource::Teachers,
    Resource::Students,
    Resource::Enrollments,
    Resource::TeachingAssignments,
    Resource::ClassSchedules,
    Resource::ClassAttendance,
    Resource::Grades,
    Resource::TutoringListings,
    Resource::TutoringSlots,
    Resource::TutoringSessions,
    Resource::TutoringAttendance,
    Resource::AdvisoryTypes,
    Resource::AdvisorySessions,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CourseOffering, TeachingAssignment};

    fn student(id: i64) -> Principal {
        Principal::new(id, [Role::Student])
    }

    fn teacher_cache() -> RelationshipCache {
        RelationshipCache::default().with_teacher_assignments(
            vec![TeachingAssignment { assignment_id: 77, course_id: 10, period_id: 3 }],
            vec![500, 501],
        )
    }

    #[test]
    fn administrative_is_always_unrestricted() {
        let p = Principal::new(1, [Role::Administrative, Role::Student]);
        let cache = RelationshipCache::default();
        for resource in ALL {
            assert_eq!(resolve(*resource, &p, &cache), Filter::Unrestricted);
        }
    }

    #[test]
    fn own_records_scope_to_principal_id() {
        let p = student(5002);
        let cache = RelationshipCache::default();
        assert_eq!(resolve(Resource::Students, &p, &cache), Filter::Eq("id", 5002));
        assert_eq!(
            resolve(Resource::Enrollments, &p, &cache),
            Filter::Eq("student_id", 5002)
        );
        assert_eq!(
            resolve(Resource::AdvisorySessions, &p, &cache),
            Filter::Eq("student_id", 5002)
        );
    }

    #[test]
    fn teacher_scopes_to_exact_offering_pairs() {
        let p = Principal::new(77, [Role::Teacher]);
        let scope = resolve(Resource::ClassAttendance, &p, &teacher_cache());
        assert_eq!(
            scope,
            Filter::All(vec![Filter::Eq("course_id", 10), Filter::Eq("period_id", 3)])
        );
    }

    #[test]
    fn no_access_path_is_deny_all_not_an_error() {
        // A student with an unloaded cache for an enrollment-scoped resource.
        let p = student(5002);
        let cache = RelationshipCache::default();
        assert_eq!(
            resolve(Resource::ClassSchedules, &p, &cache),
            Filter::DenyAll
        );
        assert_eq!(resolve(Resource::Teachers, &p, &cache), Filter::DenyAll);
        let t = Principal::new(9, [Role::Teacher]);
        assert_eq!(
            resolve(Resource::TutoringAttendance, &t, &cache),
            Filter::DenyAll
        );
    }

    #[test]
    fn multiple_paths_combine_as_disjunction() {
        let p = student(42);
        let cache = RelationshipCache::default().with_student_enrollments(vec![
            CourseOffering { course_id: 10, period_id: 3 },
        ]);
        let scope = resolve(Resource::TutoringListings, &p, &cache);
        assert_eq!(
            scope,
            Filter::Any(vec![
                Filter::Eq("monitor_id", 42),
                Filter::in_set("course_id", [10]),
            ])
        );
    }

    #[test]
    fn catalogs_are_readable_by_anyone_authenticated() {
        let p = student(1);
        let cache = RelationshipCache::default();
        for resource in [
            Resource::Faculties,
            Resource::Subjects,
            Resource::AdvisoryTypes,
            Resource::TutoringSlots,
        ] {
            assert_eq!(resolve(resource, &p, &cache), Filter::Unrestricted);
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let p = Principal::new(77, [Role::Teacher, Role::Student]);
        let cache = teacher_cache().with_student_enrollments(vec![CourseOffering {
            course_id: 20,
            period_id: 3,
        }]);
        for resource in ALL {
            let first = resolve(*resource, &p, &cache);
            let second = resolve(*resource, &p, &cache);
            assert_eq!(first, second, "{:?} resolved unstably", resource);
        }
    }
}
