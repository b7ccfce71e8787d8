//! Postgres-backed relationship lookups. "Active" here means the row's own
//! flag is set *and* the row belongs to the current academic period, resolved
//! by date against the periods table.

use crate::cache::{CourseOffering, TeachingAssignment};
use crate::config::Config;
use crate::schema::{
    enrollments, periods, teaching_assignments, tutoring_listings, tutoring_sessions,
    tutoring_slots,
};
use crate::storage::{Relations, StorageError};
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

type Conn = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct Database(Pool<ConnectionManager<PgConnection>>);

impl Database {
    pub fn new(config: &Config) -> Result<Database, StorageError> {
        let manager = ConnectionManager::new(config.database_url.as_str());
        Pool::builder()
            .max_size(config.db_pool_size)
            .build(manager)
            .map(Database)
            .map_err(|e| StorageError::Pool(e.to_string()))
    }

    fn conn(&self) -> Result<Conn, StorageError> {
        self.0.get().map_err(|e| StorageError::Pool(e.to_string()))
    }

    /// The period whose date window contains today, if one is open.
    fn current_period(conn: &mut Conn) -> Result<Option<i64>, StorageError> {
        let today = Utc::now().date_naive();
        Ok(periods::table
            .filter(periods::starts_on.le(today))
            .filter(periods::ends_on.ge(today))
            .select(periods::id)
            .first::<i64>(conn)
            .optional()?)
    }

    fn listing_monitor(
        conn: &mut Conn,
        listing_id: i64,
    ) -> Result<Option<i64>, StorageError> {
        Ok(tutoring_listings::table
            .find(listing_id)
            .select(tutoring_listings::monitor_id)
            .first::<i64>(conn)
            .optional()?)
    }
}

impl Relations for Database {
    fn student_enrollments(&self, student_id: i64) -> Result<Vec<CourseOffering>, StorageError> {
        let mut conn = self.conn()?;
        let period = match Self::current_period(&mut conn)? {
            Some(period) => period,
            None => return Ok(Vec::new()),
        };

        let rows = enrollments::table
            .filter(enrollments::student_id.eq(student_id))
            .filter(enrollments::active.eq(true))
            .filter(enrollments::period_id.eq(period))
            .select((enrollments::course_id, enrollments::period_id))
            .load::<(i64, i64)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(course_id, period_id)| CourseOffering { course_id, period_id })
            .collect())
    }

    fn teacher_assignments(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeachingAssignment>, StorageError> {
        let mut conn = self.conn()?;
        let period = match Self::current_period(&mut conn)? {
            Some(period) => period,
            None => return Ok(Vec::new()),
        };

        let rows = teaching_assignments::table
            .filter(teaching_assignments::teacher_id.eq(teacher_id))
            .filter(teaching_assignments::active.eq(true))
            .filter(teaching_assignments::period_id.eq(period))
            .select((
                teaching_assignments::id,
                teaching_assignments::course_id,
                teaching_assignments::period_id,
            ))
            .load::<(i64, i64, i64)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(assignment_id, course_id, period_id)| TeachingAssignment {
                assignment_id,
                course_id,
                period_id,
            })
            .collect())
    }

    fn students_in(&self, offerings: &[CourseOffering]) -> Result<Vec<i64>, StorageError> {
        let (first, rest) = match offerings.split_first() {
            Some(split) => split,
            None => return Ok(Vec::new()),
        };
        let mut conn = self.conn()?;

        let mut query = enrollments::table
            .select(enrollments::student_id)
            .into_boxed()
            .filter(
                enrollments::course_id
                    .eq(first.course_id)
                    .and(enrollments::period_id.eq(first.period_id)),
            );
        for offering in rest {
            query = query.or_filter(
                enrollments::course_id
                    .eq(offering.course_id)
                    .and(enrollments::period_id.eq(offering.period_id)),
            );
        }

        let mut ids = query
            .filter(enrollments::active.eq(true))
            .load::<i64>(&mut conn)?;
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    fn slot_monitor(&self, slot_id: i64) -> Result<Option<i64>, StorageError> {
        let mut conn = self.conn()?;
        //LONG: Fold the two point lookups into one join.
        let listing = tutoring_slots::table
            .find(slot_id)
            .select(tutoring_slots::listing_id)
            .first::<i64>(&mut conn)
            .optional()?;
        match listing {
            Some(listing) => Self::listing_monitor(&mut conn, listing),
            None => Ok(None),
        }
    }

    fn session_monitor(&self, session_id: i64) -> Result<Option<i64>, StorageError> {
        let mut conn = self.conn()?;
        let listing = tutoring_sessions::table
            .find(session_id)
            .select(tutoring_sessions::listing_id)
            .first::<i64>(&mut conn)
            .optional()?;
        match listing {
            Some(listing) => Self::listing_monitor(&mut conn, listing),
            None => Ok(None),
        }
    }
}
