//! An in-process backend implementing both collaborator traits. Used by the
//! test suite and by embedders that want the resolver without a database.
//!
//! Tables are plain row vectors keyed by storage path; an unknown path is an
//! empty table, matching the "absence of rows is not an error" rule.

use crate::cache::{CourseOffering, TeachingAssignment};
use crate::filter::Filter;
use crate::storage::{Relations, Row, StorageError, Store};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct Table {
    rows: Vec<Row>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend::default()
    }

    fn read<T>(&self, path: &str, f: impl FnOnce(&[Row]) -> T) -> T {
        let tables = self.tables.read().expect("poisoned");
        f(tables.get(path).map(|t| t.rows.as_slice()).unwrap_or(&[]))
    }
}

fn field_i64(row: &Row, field: &str) -> Option<i64> {
    row.get(field).and_then(Value::as_i64)
}

fn row_id(row: &Row) -> Option<i64> {
    field_i64(row, "id")
}

fn is_active(row: &Row) -> bool {
    row.get("active").and_then(Value::as_bool).unwrap_or(true)
}

impl Store for MemoryBackend {
    fn list(&self, path: &str, filter: &Filter) -> Result<Vec<Row>, StorageError> {
        Ok(self.read(path, |rows| {
            rows.iter().filter(|r| filter.matches(r)).cloned().collect()
        }))
    }

    fn insert(&self, path: &str, mut row: Row) -> Result<Row, StorageError> {
        let mut tables = self.tables.write().expect("poisoned");
        let table = tables.entry(path.to_owned()).or_default();
        let id = match row_id(&row) {
            Some(id) => id,
            None => {
                table.next_id += 1;
                row.insert("id".to_owned(), Value::from(table.next_id));
                table.next_id
            }
        };
        table.next_id = table.next_id.max(id);
        table.rows.push(row.clone());
        Ok(row)
    }

    fn update(&self, path: &str, id: i64, changes: Row) -> Result<Option<Row>, StorageError> {
        let mut tables = self.tables.write().expect("poisoned");
        let table = tables.entry(path.to_owned()).or_default();
        for row in table.rows.iter_mut() {
            if row_id(row) == Some(id) {
                for (key, value) in changes {
                    row.insert(key, value);
                }
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    fn delete(&self, path: &str, id: i64) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().expect("poisoned");
        let table = tables.entry(path.to_owned()).or_default();
        let before = table.rows.len();
        table.rows.retain(|row| row_id(row) != Some(id));
        Ok(table.rows.len() != before)
    }
}

impl Relations for MemoryBackend {
    fn student_enrollments(&self, student_id: i64) -> Result<Vec<CourseOffering>, StorageError> {
        Ok(self.read("enrollments", |rows| {
            rows.iter()
                .filter(|r| field_i64(r, "student_id") == Some(student_id) && is_active(r))
                .filter_map(|r| {
                    Some(CourseOffering {
                        course_id: field_i64(r, "course_id")?,
                        period_id: field_i64(r, "period_id")?,
                    })
                })
                .collect()
        }))
    }

    fn teacher_assignments(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeachingAssignment>, StorageError> {
        Ok(self.read("teaching_assignments", |rows| {
            rows.iter()
                .filter(|r| field_i64(r, "teacher_id") == Some(teacher_id) && is_active(r))
                .filter_map(|r| {
                    Some(TeachingAssignment {
                        assignment_id: row_id(r)?,
                        course_id: field_i64(r, "course_id")?,
                        period_id: field_i64(r, "period_id")?,
                    })
                })
                .collect()
        }))
    }

    fn students_in(&self, offerings: &[CourseOffering]) -> Result<Vec<i64>, StorageError> {
        let mut ids: Vec<i64> = self.read("enrollments", |rows| {
            rows.iter()
                .filter(|r| is_active(r))
                .filter(|r| {
                    offerings.iter().any(|o| {
                        field_i64(r, "course_id") == Some(o.course_id)
                            && field_i64(r, "period_id") == Some(o.period_id)
                    })
                })
                .filter_map(|r| field_i64(r, "student_id"))
                .collect()
        });
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    fn slot_monitor(&self, slot_id: i64) -> Result<Option<i64>, StorageError> {
        let listing = self.read("tutoring_slots", |rows| {
            rows.iter()
                .find(|r| row_id(r) == Some(slot_id))
                .and_then(|r| field_i64(r, "listing_id"))
        });
        Ok(listing.and_then(|l| self.listing_monitor(l)))
    }

    fn session_monitor(&self, session_id: i64) -> Result<Option<i64>, StorageError> {
        let listing = self.read("tutoring_sessions", |rows| {
            rows.iter()
                .find(|r| row_id(r) == Some(session_id))
                .and_then(|r| field_i64(r, "listing_id"))
        });
        Ok(listing.and_then(|l| self.listing_monitor(l)))
    }
}

impl MemoryBackend {
    fn listing_monitor(&self, listing_id: i64) -> Option<i64> {
        self.read("tutoring_listings", |rows| {
            rows.iter()
                .find(|r| row_id(r) == Some(listing_id))
                .and_then(|r| field_i64(r, "monitor_id"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(v: serde_json::Value) -> Row {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn insert_assigns_ids_when_absent() {
        let backend = MemoryBackend::new();
        let a = backend.insert("faculties", row(serde_json::json!({"name": "Science"}))).unwrap();
        let b = backend.insert("faculties", row(serde_json::json!({"name": "Arts"}))).unwrap();
        assert_eq!(row_id(&a), Some(1));
        assert_eq!(row_id(&b), Some(2));

        // Explicit ids are kept and the counter moves past them.
        backend
            .insert("faculties", row(serde_json::json!({"id": 10, "name": "Law"})))
            .unwrap();
        let c = backend.insert("faculties", row(serde_json::json!({"name": "Medicine"}))).unwrap();
        assert_eq!(row_id(&c), Some(11));
    }

    #[test]
    fn list_applies_the_filter() {
        let backend = MemoryBackend::new();
        backend.insert("grades", row(serde_json::json!({"student_id": 1, "score": 4}))).unwrap();
        backend.insert("grades", row(serde_json::json!({"student_id": 2, "score": 5}))).unwrap();
        let mine = backend.list("grades", &Filter::Eq("student_id", 1)).unwrap();
        assert_eq!(mine.len(), 1);
        assert!(backend.list("grades", &Filter::DenyAll).unwrap().is_empty());
        // Unknown table reads as empty, not as an error.
        assert!(backend.list("nowhere", &Filter::Unrestricted).unwrap().is_empty());
    }

    #[test]
    fn update_merges_and_delete_reports() {
        let backend = MemoryBackend::new();
        backend.insert("courses", row(serde_json::json!({"id": 3, "name": "Algebra"}))).unwrap();
        let updated = backend
            .update("courses", 3, row(serde_json::json!({"name": "Linear Algebra"})))
            .unwrap()
            .unwrap();
        assert_eq!(updated.get("name").unwrap(), "Linear Algebra");
        assert!(backend.update("courses", 99, Row::new()).unwrap().is_none());
        assert!(backend.delete("courses", 3).unwrap());
        assert!(!backend.delete("courses", 3).unwrap());
    }

    #[test]
    fn get_respects_the_filter() {
        let backend = MemoryBackend::new();
        backend.insert("students", row(serde_json::json!({"id": 8, "name": "Ana"}))).unwrap();
        assert!(backend.get("students", &Filter::Unrestricted, 8).unwrap().is_some());
        // The row exists but the filter excludes it: indistinguishable from absent.
        assert!(backend.get("students", &Filter::Eq("id", 9), 8).unwrap().is_none());
    }
}
