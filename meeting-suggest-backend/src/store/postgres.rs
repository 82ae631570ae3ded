use async_trait::async_trait;
use itertools::{Either, Itertools};
use jiff::Timestamp;
use meeting_suggest_database::models::{Participant, SuggestedSchedule, SuggestedTimeSlot, TimeSlot};
use meeting_suggest_database::queries::{meetings, suggestions};
use meeting_suggest_database::{DatabaseError, Pool, PooledConnection};
use meeting_suggest_optimizer::projector::rank_by_response_time;
use meeting_suggest_optimizer::{
    Leftover, MeetingId, OwnerSlot, ParticipantResponse, PriorityPolicy, SlotPriority,
    SuggestedSlot, Suggestion, SuggestionInput, UserId,
};
use tracing::{debug, instrument};

use super::{InputSource, SuggestionStore};
use crate::error::AppError;

/// Postgres-backed store and input source. Every call checks out its own connection.
#[derive(Clone)]
pub struct PgSuggestions {
    pool: Pool,
}

impl PgSuggestions {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<PooledConnection, AppError> {
        Ok(self.pool.get().await.map_err(DatabaseError::from)?)
    }
}

fn corrupt(meeting_id: MeetingId, reason: impl Into<String>) -> AppError {
    AppError::CorruptSuggestion {
        meeting_id,
        reason: reason.into(),
    }
}

fn to_suggestion(
    meeting_id: MeetingId,
    schedule: &SuggestedSchedule,
    rows: Vec<SuggestedTimeSlot>,
) -> Result<Suggestion, AppError> {
    let priority = schedule
        .policy
        .parse::<PriorityPolicy>()
        .map_err(|error| corrupt(meeting_id, error.to_string()))?;
    let n_scheduled = u32::try_from(schedule.n_scheduled)
        .map_err(|_| corrupt(meeting_id, format!("n_scheduled is {}", schedule.n_scheduled)))?;

    let (slots, leftovers): (Vec<SuggestedSlot>, Vec<Leftover>) =
        rows.into_iter().partition_map(|row| {
            let user_id = UserId(row.user_id);
            match row.time {
                Some(time) => Either::Left(SuggestedSlot {
                    user_id,
                    time: time.into(),
                }),
                None => Either::Right(Leftover { user_id }),
            }
        });

    if usize::try_from(n_scheduled).ok() != Some(slots.len()) {
        return Err(corrupt(
            meeting_id,
            format!("n_scheduled is {n_scheduled} but {} slots are stored", slots.len()),
        ));
    }

    Ok(Suggestion {
        priority,
        n_scheduled,
        slots,
        leftovers,
    })
}

/// `(n_scheduled, entries)` as written by the suggestion queries, leftovers with a null time.
fn to_entries(
    meeting_id: MeetingId,
    suggestion: &Suggestion,
) -> Result<(i32, Vec<(i32, Option<Timestamp>)>), AppError> {
    let n_scheduled = i32::try_from(suggestion.n_scheduled)
        .map_err(|_| corrupt(meeting_id, "too many scheduled participants"))?;
    let entries = suggestion
        .slots
        .iter()
        .map(|slot| (slot.user_id.0, Some(slot.time)))
        .chain(
            suggestion
                .leftovers
                .iter()
                .map(|leftover| (leftover.user_id.0, None)),
        )
        .collect();
    Ok((n_scheduled, entries))
}

/// Builds the engine input from the owner's slots, the accepting participants and the slots
/// those participants submitted.
fn to_input(
    owner_slots: Vec<TimeSlot>,
    respondents: Vec<Participant>,
    submitted: Vec<TimeSlot>,
) -> SuggestionInput {
    let slots = owner_slots
        .into_iter()
        .map(|slot| OwnerSlot {
            time: slot.start_time.into(),
            owner_priority: SlotPriority::from_flag(slot.priority),
        })
        .collect();

    let mut submitted = submitted.into_iter().into_group_map_by(|slot| slot.user_id);

    // accepted without a response time sorts last
    let responses = rank_by_response_time(respondents.into_iter().map(|participant| {
        (
            UserId(participant.user_id),
            participant
                .response_time
                .map_or(Timestamp::MAX, Into::into),
            (),
        )
    }))
    .into_iter()
    .map(|(response_order, user_id, ())| {
        ParticipantResponse::from_rows(
            user_id,
            response_order,
            submitted
                .remove(&user_id.0)
                .unwrap_or_default()
                .into_iter()
                .map(|slot| {
                    (
                        Timestamp::from(slot.start_time),
                        SlotPriority::from_flag(slot.priority),
                    )
                }),
        )
    })
    .collect();

    SuggestionInput { slots, responses }
}

#[async_trait]
impl SuggestionStore for PgSuggestions {
    async fn load(
        &self,
        meeting_id: MeetingId,
        policy: PriorityPolicy,
    ) -> Result<Option<Suggestion>, AppError> {
        let mut connection = self.connection().await?;
        let Some((schedule, rows)) =
            suggestions::find_suggestion(&mut connection, meeting_id.0, policy.as_str()).await?
        else {
            return Ok(None);
        };
        to_suggestion(meeting_id, &schedule, rows).map(Some)
    }

    async fn store(&self, meeting_id: MeetingId, suggestion: &Suggestion) -> Result<(), AppError> {
        let (n_scheduled, entries) = to_entries(meeting_id, suggestion)?;
        let mut connection = self.connection().await?;
        suggestions::replace_suggestion(
            &mut connection,
            meeting_id.0,
            suggestion.priority.as_str(),
            n_scheduled,
            entries,
        )
        .await?;
        Ok(())
    }

    async fn store_if_absent(
        &self,
        meeting_id: MeetingId,
        suggestion: &Suggestion,
    ) -> Result<bool, AppError> {
        let (n_scheduled, entries) = to_entries(meeting_id, suggestion)?;
        let mut connection = self.connection().await?;
        let inserted = suggestions::insert_suggestion_if_absent(
            &mut connection,
            meeting_id.0,
            suggestion.priority.as_str(),
            n_scheduled,
            entries,
        )
        .await?;
        Ok(inserted.is_some())
    }

    async fn invalidate(&self, meeting_id: MeetingId) -> Result<usize, AppError> {
        let mut connection = self.connection().await?;
        Ok(suggestions::delete_suggestions(&mut connection, meeting_id.0).await?)
    }
}

#[async_trait]
impl InputSource for PgSuggestions {
    #[instrument(skip(self))]
    async fn load_inputs(&self, meeting_id: MeetingId) -> Result<SuggestionInput, AppError> {
        let mut connection = self.connection().await?;
        let meeting = meetings::find_meeting(&mut connection, meeting_id.0)
            .await?
            .ok_or(AppError::MeetingNotFound(meeting_id))?;

        let owner_slots = meetings::owner_time_slots(&mut connection, &meeting).await?;
        let respondents = meetings::positive_respondents(&mut connection, &meeting).await?;
        let user_ids: Vec<i32> = respondents.iter().map(|participant| participant.user_id).collect();
        let submitted =
            meetings::participant_time_slots(&mut connection, meeting.id, &user_ids).await?;

        let input = to_input(owner_slots, respondents, submitted);
        debug!(
            slots = input.slots.len(),
            responses = input.responses.len(),
            "loaded meeting inputs"
        );
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    const MEETING: MeetingId = MeetingId(3);
    const OWNER: i32 = 100;

    fn at(hour: i64) -> Timestamp {
        Timestamp::from_second(1_709_251_200 + hour * 3600).unwrap()
    }

    fn time_slot(id: i32, user_id: i32, hour: i64, priority: i16) -> TimeSlot {
        TimeSlot {
            id,
            meeting_id: MEETING.0,
            user_id,
            start_time: at(hour).into(),
            priority,
        }
    }

    fn participant(user_id: i32, response_time: Option<i64>) -> Participant {
        Participant {
            id: user_id,
            meeting_id: MEETING.0,
            user_id,
            response: true,
            response_time: response_time.map(|hour| at(hour).into()),
        }
    }

    fn schedule(policy: &str, n_scheduled: i32) -> SuggestedSchedule {
        SuggestedSchedule {
            id: 1,
            meeting_id: MEETING.0,
            policy: policy.to_owned(),
            n_scheduled,
            created_at: at(0).into(),
        }
    }

    fn stored(id: i32, user_id: i32, hour: Option<i64>) -> SuggestedTimeSlot {
        SuggestedTimeSlot {
            id,
            schedule_id: 1,
            user_id,
            time: hour.map(|hour| at(hour).into()),
        }
    }

    #[test]
    fn rows_become_a_suggestion() {
        let suggestion = to_suggestion(
            MEETING,
            &schedule("invitee_priorities", 2),
            vec![
                stored(1, 7, Some(14)),
                stored(2, 5, Some(9)),
                stored(3, 6, None),
            ],
        )
        .unwrap();

        assert_eq!(suggestion.priority, PriorityPolicy::InviteePriorities);
        assert_eq!(suggestion.n_scheduled, 2);
        assert_eq!(
            suggestion.slots,
            vec![
                SuggestedSlot {
                    user_id: UserId(7),
                    time: at(14),
                },
                SuggestedSlot {
                    user_id: UserId(5),
                    time: at(9),
                },
            ]
        );
        assert_eq!(suggestion.leftovers, vec![Leftover { user_id: UserId(6) }]);
    }

    #[test]
    fn legacy_policy_names_are_read() {
        let suggestion = to_suggestion(MEETING, &schedule("INVITEE_ORDER", 0), vec![]).unwrap();
        assert_eq!(suggestion.priority, PriorityPolicy::InviteeOrder);
    }

    #[test]
    fn corrupt_rows_are_rejected() {
        for (policy, n_scheduled, rows) in [
            ("first_come", 0, vec![]),
            ("invitee_order", -1, vec![]),
            ("invitee_order", 2, vec![stored(1, 5, Some(9))]),
            ("invitee_order", 0, vec![stored(1, 5, Some(9))]),
        ] {
            let error = to_suggestion(MEETING, &schedule(policy, n_scheduled), rows).unwrap_err();
            assert!(
                matches!(error, AppError::CorruptSuggestion { meeting_id, .. } if meeting_id == MEETING),
                "{policy} {n_scheduled}: {error}"
            );
        }
    }

    #[test]
    fn entries_put_leftovers_last() {
        let suggestion = Suggestion {
            priority: PriorityPolicy::InviteeOrder,
            n_scheduled: 1,
            slots: vec![SuggestedSlot {
                user_id: UserId(2),
                time: at(9),
            }],
            leftovers: vec![Leftover { user_id: UserId(4) }],
        };

        let (n_scheduled, entries) = to_entries(MEETING, &suggestion).unwrap();
        assert_eq!(n_scheduled, 1);
        assert_eq!(entries, vec![(2, Some(at(9))), (4, None)]);

        let rows = entries
            .into_iter()
            .zip(1..)
            .map(|((user_id, time), id)| SuggestedTimeSlot {
                id,
                schedule_id: 1,
                user_id,
                time: time.map(Into::into),
            })
            .collect();
        let read_back = to_suggestion(MEETING, &schedule("invitee_order", 1), rows).unwrap();
        assert_eq!(read_back, suggestion);
    }

    #[test]
    fn respondents_are_ranked_by_response_time() {
        let input = to_input(
            vec![
                time_slot(1, OWNER, 14, 0),
                time_slot(2, OWNER, 9, 1),
            ],
            vec![
                participant(30, None),
                participant(20, Some(2)),
                participant(10, Some(2)),
                participant(40, Some(1)),
            ],
            vec![
                time_slot(3, 20, 9, 1),
                time_slot(4, 20, 14, 0),
                time_slot(5, 40, 14, 0),
            ],
        );

        assert_eq!(
            input.slots,
            vec![
                OwnerSlot {
                    time: at(14),
                    owner_priority: SlotPriority::Available,
                },
                OwnerSlot {
                    time: at(9),
                    owner_priority: SlotPriority::Prioritized,
                },
            ]
        );
        assert_eq!(
            input
                .responses
                .iter()
                .map(|response| (response.user_id.0, response.response_order))
                .collect::<Vec<_>>(),
            vec![(40, 1), (10, 2), (20, 3), (30, 4)]
        );

        let by_user = |user_id| {
            input
                .responses
                .iter()
                .find(|response| response.user_id == UserId(user_id))
                .unwrap()
        };
        assert_eq!(by_user(20).prioritized, BTreeSet::from([at(9)]));
        assert_eq!(by_user(20).available, BTreeSet::from([at(14)]));
        assert!(by_user(10).available.is_empty() && by_user(10).prioritized.is_empty());
        assert!(by_user(30).available.is_empty());
    }
}
