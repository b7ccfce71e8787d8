// Relationship tables read by the cache loader and the write guards.
// Generic CRUD execution over the remaining tables belongs to the query
// layer, not to this crate.

diesel::table! {
    periods (id) {
        id -> BigInt,
        name -> Text,
        starts_on -> Date,
        ends_on -> Date,
    }
}

diesel::table! {
    enrollments (id) {
        id -> BigInt,
        student_id -> BigInt,
        course_id -> BigInt,
        period_id -> BigInt,
        active -> Bool,
    }
}

diesel::table! {
    teaching_assignments (id) {
        id -> BigInt,
        teacher_id -> BigInt,
        course_id -> BigInt,
        period_id -> BigInt,
        active -> Bool,
    }
}

diesel::table! {
    tutoring_listings (id) {
        id -> BigInt,
        course_id -> BigInt,
        period_id -> BigInt,
        monitor_id -> BigInt,
    }
}

diesel::table! {
    tutoring_slots (id) {
        id -> BigInt,
        listing_id -> BigInt,
        weekday -> SmallInt,
        starts_at -> Time,
        ends_at -> Time,
    }
}

diesel::table! {
    tutoring_sessions (id) {
        id -> BigInt,
        listing_id -> BigInt,
        slot_id -> BigInt,
        held_on -> Date,
    }
}
