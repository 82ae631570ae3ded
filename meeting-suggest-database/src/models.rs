use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::{
    participants, pending_meetings, suggested_schedules, suggested_time_slots, time_slots,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pending_meetings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PendingMeeting {
    pub id: i32,
    pub owner_id: i32,
}

/// A time proposed by the owner or submitted by a participant, depending on `user_id`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = time_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimeSlot {
    pub id: i32,
    pub meeting_id: i32,
    pub user_id: i32,
    pub start_time: Timestamp,
    pub priority: i16,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = participants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Participant {
    pub id: i32,
    pub meeting_id: i32,
    pub user_id: i32,
    pub response: bool,
    pub response_time: Option<Timestamp>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = suggested_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SuggestedSchedule {
    pub id: i32,
    pub meeting_id: i32,
    pub policy: String,
    pub n_scheduled: i32,
    pub created_at: Timestamp,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = suggested_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSuggestedSchedule<'a> {
    pub meeting_id: i32,
    pub policy: &'a str,
    pub n_scheduled: i32,
}

/// `time` is `None` for participants that were left over.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = suggested_time_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SuggestedTimeSlot {
    pub id: i32,
    pub schedule_id: i32,
    pub user_id: i32,
    pub time: Option<Timestamp>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = suggested_time_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSuggestedTimeSlot {
    pub schedule_id: i32,
    pub user_id: i32,
    pub time: Option<Timestamp>,
}
