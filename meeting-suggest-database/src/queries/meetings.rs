use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::trace;

use crate::error::DatabaseError;
use crate::models::{Participant, PendingMeeting, TimeSlot};
use crate::schema::{participants, pending_meetings, time_slots};

pub async fn find_meeting(
    connection: &mut AsyncPgConnection,
    meeting_id: i32,
) -> Result<Option<PendingMeeting>, DatabaseError> {
    Ok(pending_meetings::table
        .find(meeting_id)
        .select(PendingMeeting::as_select())
        .first(connection)
        .await
        .optional()?)
}

/// The owner's proposed slots in the order they were created.
pub async fn owner_time_slots(
    connection: &mut AsyncPgConnection,
    meeting: &PendingMeeting,
) -> Result<Vec<TimeSlot>, DatabaseError> {
    let slots = time_slots::table
        .filter(time_slots::meeting_id.eq(meeting.id))
        .filter(time_slots::user_id.eq(meeting.owner_id))
        .order(time_slots::id.asc())
        .select(TimeSlot::as_select())
        .load(connection)
        .await?;
    trace!(meeting_id = meeting.id, count = slots.len(), "loaded owner slots");
    Ok(slots)
}

/// Participants (other than the owner) that accepted, earliest response first.
pub async fn positive_respondents(
    connection: &mut AsyncPgConnection,
    meeting: &PendingMeeting,
) -> Result<Vec<Participant>, DatabaseError> {
    Ok(participants::table
        .filter(participants::meeting_id.eq(meeting.id))
        .filter(participants::response.eq(true))
        .filter(participants::user_id.ne(meeting.owner_id))
        .order((participants::response_time.asc(), participants::user_id.asc()))
        .select(Participant::as_select())
        .load(connection)
        .await?)
}

pub async fn participant_time_slots(
    connection: &mut AsyncPgConnection,
    meeting_id: i32,
    user_ids: &[i32],
) -> Result<Vec<TimeSlot>, DatabaseError> {
    Ok(time_slots::table
        .filter(time_slots::meeting_id.eq(meeting_id))
        .filter(time_slots::user_id.eq_any(user_ids))
        .order(time_slots::id.asc())
        .select(TimeSlot::as_select())
        .load(connection)
        .await?)
}
