//! The per-request relationship cache.
//!
//! Allocated fresh for every request and discarded at its end; never shared
//! across requests or principals. An empty set is a valid state (the
//! principal simply has no relationships), never an error.

use crate::principal::{Principal, Role};
use crate::storage::{Relations, StorageError};
use log::debug;

/// One (course, period) pair: a concrete offering of a course within an
/// academic period.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CourseOffering {
    pub course_id: i64,
    pub period_id: i64,
}

/// An active teaching assignment: which offering a teacher is in charge of.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TeachingAssignment {
    pub assignment_id: i64,
    pub course_id: i64,
    pub period_id: i64,
}

impl TeachingAssignment {
    pub fn offering(&self) -> CourseOffering {
        CourseOffering {
            course_id: self.course_id,
            period_id: self.period_id,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RelationshipCache {
    student_enrollments: Option<Vec<CourseOffering>>,
    teacher_assignments: Option<Vec<TeachingAssignment>>,
    section_students: Option<Vec<i64>>,
}

impl RelationshipCache {
    /// Populate the sets relevant to the principal's roles. A principal
    /// holding several roles gets every applicable load; there is no
    /// short-circuit on the first match. Any lookup failure aborts the
    /// request, so a partially loaded cache never reaches a predicate.
    pub fn load(
        relations: &impl Relations,
        principal: &Principal,
    ) -> Result<RelationshipCache, StorageError> {
        let mut cache = RelationshipCache::default();

        if principal.has(Role::Student) {
            let enrollments = relations.student_enrollments(principal.id)?;
            debug!(
                "principal {}: {} active enrollment(s)",
                principal.id,
                enrollments.len()
            );
            cache.student_enrollments = Some(enrollments);
        }

        if principal.has(Role::Teacher) {
            let assignments = relations.teacher_assignments(principal.id)?;
            let offerings: Vec<CourseOffering> =
                assignments.iter().map(TeachingAssignment::offering).collect();
            // The transitive set: students sitting in this teacher's
            // offerings. Derived here so course/period predicates and the
            // student-row predicate both work off one load.
            let section_students = relations.students_in(&offerings)?;
            debug!(
                "principal {}: {} assignment(s), {} section student(s)",
                principal.id,
                assignments.len(),
                section_students.len()
            );
            cache.teacher_assignments = Some(assignments);
            cache.section_students = Some(section_students);
        }

        Ok(cache)
    }

    /// A cache with the student side preloaded. For embedders and tests that
    /// already hold the relationship sets.
    pub fn with_student_enrollments(mut self, enrollments: Vec<CourseOffering>) -> Self {
        self.student_enrollments = Some(enrollments);
        self
    }

    /// A cache with the teacher side preloaded.
    pub fn with_teacher_assignments(
        mut self,
        assignments: Vec<TeachingAssignment>,
        section_students: Vec<i64>,
    ) -> Self {
        self.teacher_assignments = Some(assignments);
        self.section_students = Some(section_students);
        self
    }

    pub fn student_enrollments(&self) -> &[CourseOffering] {
        self.student_enrollments.as_deref().unwrap_or(&[])
    }

    pub fn teacher_assignments(&self) -> &[TeachingAssignment] {
        self.teacher_assignments.as_deref().unwrap_or(&[])
    }

    pub fn section_students(&self) -> &[i64] {
        self.section_students.as_deref().unwrap_or(&[])
    }

    /// The (course, period) pairs the teacher side of the cache covers.
    pub fn teacher_offerings(&self) -> Vec<CourseOffering> {
        self.teacher_assignments()
            .iter()
            .map(TeachingAssignment::offering)
            .collect()
    }

    /// Course ids from the student side, ignoring periods.
    pub fn enrolled_course_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.student_enrollments().iter().map(|o| o.course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::storage::Store;

    fn row(v: serde_json::Value) -> crate::storage::Row {
        v.as_object().unwrap().clone()
    }

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        for r in [
            serde_json::json!({"id": 1, "student_id": 500, "course_id": 10, "period_id": 3, "active": true}),
            serde_json::json!({"id": 2, "student_id": 500, "course_id": 12, "period_id": 3, "active": false}),
            serde_json::json!({"id": 3, "student_id": 501, "course_id": 10, "period_id": 3, "active": true}),
        ] {
            backend.insert("enrollments", row(r)).unwrap();
        }
        backend
            .insert(
                "teaching_assignments",
                row(serde_json::json!({"id": 77, "teacher_id": 900, "course_id": 10, "period_id": 3, "active": true})),
            )
            .unwrap();
        backend
    }

    #[test]
    fn student_load_skips_inactive_enrollments() {
        let backend = backend();
        let p = Principal::new(500, [Role::Student]);
        let cache = RelationshipCache::load(&backend, &p).unwrap();
        assert_eq!(
            cache.student_enrollments(),
            &[CourseOffering { course_id: 10, period_id: 3 }]
        );
        // The teacher side was never requested for this principal.
        assert!(cache.teacher_assignments().is_empty());
    }

    #[test]
    fn teacher_load_derives_section_students() {
        let backend = backend();
        let p = Principal::new(900, [Role::Teacher]);
        let cache = RelationshipCache::load(&backend, &p).unwrap();
        assert_eq!(
            cache.teacher_assignments(),
            &[TeachingAssignment { assignment_id: 77, course_id: 10, period_id: 3 }]
        );
        let mut students = cache.section_students().to_vec();
        students.sort_unstable();
        assert_eq!(students, vec![500, 501]);
    }

    #[test]
    fn dual_role_principal_loads_both_sides() {
        let backend = backend();
        let p = Principal::new(500, [Role::Student, Role::Teacher]);
        let cache = RelationshipCache::load(&backend, &p).unwrap();
        assert_eq!(cache.student_enrollments().len(), 1);
        // No assignments for this id, but the set is populated, not absent.
        assert!(cache.teacher_assignments().is_empty());
        assert!(cache.section_students().is_empty());
    }

    #[test]
    fn principal_without_relationships_is_not_an_error() {
        let backend = MemoryBackend::new();
        let p = Principal::new(5002, [Role::Student]);
        let cache = RelationshipCache::load(&backend, &p).unwrap();
        assert!(cache.student_enrollments().is_empty());
    }
}
