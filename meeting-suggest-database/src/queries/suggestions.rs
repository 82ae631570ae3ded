use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use jiff_diesel::Timestamp;
use tracing::debug;

use crate::error::DatabaseError;
use crate::models::{
    NewSuggestedSchedule, NewSuggestedTimeSlot, SuggestedSchedule, SuggestedTimeSlot,
};
use crate::schema::{suggested_schedules, suggested_time_slots};

pub async fn find_suggestion(
    connection: &mut AsyncPgConnection,
    meeting_id: i32,
    policy: &str,
) -> Result<Option<(SuggestedSchedule, Vec<SuggestedTimeSlot>)>, DatabaseError> {
    let Some(schedule) = suggested_schedules::table
        .filter(suggested_schedules::meeting_id.eq(meeting_id))
        .filter(suggested_schedules::policy.eq(policy))
        .select(SuggestedSchedule::as_select())
        .first(connection)
        .await
        .optional()?
    else {
        return Ok(None);
    };

    let slots = suggested_time_slots::table
        .filter(suggested_time_slots::schedule_id.eq(schedule.id))
        .order(suggested_time_slots::id.asc())
        .select(SuggestedTimeSlot::as_select())
        .load(connection)
        .await?;

    Ok(Some((schedule, slots)))
}

async fn insert_entries(
    connection: &mut AsyncPgConnection,
    schedule_id: i32,
    entries: Vec<(i32, Option<jiff::Timestamp>)>,
) -> Result<usize, DatabaseError> {
    let rows: Vec<NewSuggestedTimeSlot> = entries
        .into_iter()
        .map(|(user_id, time)| NewSuggestedTimeSlot {
            schedule_id,
            user_id,
            time: time.map(Timestamp::from),
        })
        .collect();
    if rows.is_empty() {
        return Ok(0);
    }
    Ok(diesel::insert_into(suggested_time_slots::table)
        .values(&rows)
        .execute(connection)
        .await?)
}

/// Replaces the stored suggestion for `(meeting_id, policy)`.
///
/// `entries` are `(user_id, time)` pairs, scheduled ones first, in the order they should be
/// read back. The schedule row is upserted, so concurrent writers queue up on its row lock
/// and the last one to commit wins.
pub async fn replace_suggestion(
    connection: &mut AsyncPgConnection,
    meeting_id: i32,
    policy: &str,
    n_scheduled: i32,
    entries: Vec<(i32, Option<jiff::Timestamp>)>,
) -> Result<i32, DatabaseError> {
    connection
        .transaction::<_, DatabaseError, _>(move |connection| {
            async move {
                let schedule_id = diesel::insert_into(suggested_schedules::table)
                    .values(&NewSuggestedSchedule {
                        meeting_id,
                        policy,
                        n_scheduled,
                    })
                    .on_conflict((suggested_schedules::meeting_id, suggested_schedules::policy))
                    .do_update()
                    .set((
                        suggested_schedules::n_scheduled.eq(excluded(suggested_schedules::n_scheduled)),
                        suggested_schedules::created_at.eq(excluded(suggested_schedules::created_at)),
                    ))
                    .returning(suggested_schedules::id)
                    .get_result::<i32>(connection)
                    .await?;

                let superseded = diesel::delete(
                    suggested_time_slots::table
                        .filter(suggested_time_slots::schedule_id.eq(schedule_id)),
                )
                .execute(connection)
                .await?;
                insert_entries(connection, schedule_id, entries).await?;

                debug!(meeting_id, policy, schedule_id, superseded, "stored suggestion");
                Ok(schedule_id)
            }
            .scope_boxed()
        })
        .await
}

/// Stores the suggestion only if nothing is stored for `(meeting_id, policy)` yet.
///
/// Returns the new schedule id, or `None` when another suggestion was already there.
pub async fn insert_suggestion_if_absent(
    connection: &mut AsyncPgConnection,
    meeting_id: i32,
    policy: &str,
    n_scheduled: i32,
    entries: Vec<(i32, Option<jiff::Timestamp>)>,
) -> Result<Option<i32>, DatabaseError> {
    connection
        .transaction::<_, DatabaseError, _>(move |connection| {
            async move {
                let Some(schedule_id) = diesel::insert_into(suggested_schedules::table)
                    .values(&NewSuggestedSchedule {
                        meeting_id,
                        policy,
                        n_scheduled,
                    })
                    .on_conflict((suggested_schedules::meeting_id, suggested_schedules::policy))
                    .do_nothing()
                    .returning(suggested_schedules::id)
                    .get_result::<i32>(connection)
                    .await
                    .optional()?
                else {
                    debug!(meeting_id, policy, "kept existing suggestion");
                    return Ok(None);
                };
                insert_entries(connection, schedule_id, entries).await?;
                debug!(meeting_id, policy, schedule_id, "stored suggestion");
                Ok(Some(schedule_id))
            }
            .scope_boxed()
        })
        .await
}

/// Drops every stored suggestion of a meeting, returning how many schedules were removed.
pub async fn delete_suggestions(
    connection: &mut AsyncPgConnection,
    meeting_id: i32,
) -> Result<usize, DatabaseError> {
    Ok(diesel::delete(
        suggested_schedules::table.filter(suggested_schedules::meeting_id.eq(meeting_id)),
    )
    .execute(connection)
    .await?)
}
