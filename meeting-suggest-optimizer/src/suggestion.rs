//! Plain-data boundary of the engine: what goes in, what comes out and gets stored.

use itertools::Itertools;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::SlotCatalog;
use crate::error::InputError;
use crate::matching::{suggest, MatchingResult};
use crate::policy::{PriorityPolicy, SlotPriority};
use crate::projector::{project_all, ParticipantAvailability, ParticipantResponse};
use crate::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSlot {
    pub time: Timestamp,
    #[serde(default)]
    pub owner_priority: SlotPriority,
}

/// Everything one run needs. Responses should only contain participants that accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionInput {
    pub slots: Vec<OwnerSlot>,
    #[serde(default)]
    pub responses: Vec<ParticipantResponse>,
}

impl SuggestionInput {
    fn prepare(&self) -> Result<(SlotCatalog, Vec<ParticipantAvailability>), InputError> {
        let catalog = SlotCatalog::new(
            self.slots
                .iter()
                .map(|slot| (slot.time, slot.owner_priority)),
        )?;
        let participants = project_all(&catalog, &self.responses)?;
        Ok((catalog, participants))
    }

    pub fn suggest(&self, policy: PriorityPolicy) -> Result<Suggestion, InputError> {
        let (catalog, participants) = self.prepare()?;
        Ok(Suggestion::resolve(
            &suggest(&catalog, &participants, policy),
            &catalog,
        ))
    }

    /// Runs every policy over a single catalog and projection.
    #[instrument(skip_all, fields(slots = self.slots.len(), responses = self.responses.len()))]
    pub fn suggest_both(&self) -> Result<Suggestions, InputError> {
        let (catalog, participants) = self.prepare()?;
        let run = |policy| Suggestion::resolve(&suggest(&catalog, &participants, policy), &catalog);
        Ok(Suggestions {
            invitee_order: run(PriorityPolicy::InviteeOrder),
            invitee_priorities: run(PriorityPolicy::InviteePriorities),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedSlot {
    pub user_id: UserId,
    pub time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leftover {
    pub user_id: UserId,
}

/// A [`MatchingResult`] with slot indices replaced by their times, so it stays valid
/// after the catalog it was computed from is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub priority: PriorityPolicy,
    pub n_scheduled: u32,
    /// In catalog order.
    pub slots: Vec<SuggestedSlot>,
    /// In response order.
    pub leftovers: Vec<Leftover>,
}

impl Suggestion {
    /// `n_scheduled` always counts the resolved slots. An index outside `catalog` cannot come
    /// out of a matching over that catalog and is dropped.
    #[must_use]
    pub fn resolve(result: &MatchingResult, catalog: &SlotCatalog) -> Self {
        let slots: Vec<SuggestedSlot> = result
            .scheduled
            .iter()
            .sorted_by_key(|(_, index)| **index)
            .filter_map(|(&user_id, &index)| {
                catalog
                    .get(index)
                    .map(|slot| SuggestedSlot { user_id, time: slot.time })
            })
            .collect();
        debug_assert_eq!(slots.len(), result.scheduled.len(), "scheduled outside the catalog");
        Self {
            priority: result.policy,
            n_scheduled: u32::try_from(slots.len()).unwrap_or(result.n_scheduled),
            slots,
            leftovers: result
                .unscheduled
                .iter()
                .map(|&user_id| Leftover { user_id })
                .collect(),
        }
    }

    /// Participants who should get a confirmation.
    pub fn scheduled(&self) -> impl Iterator<Item = UserId> + '_ {
        self.slots.iter().map(|slot| slot.user_id)
    }

    /// Participants who should get a cancellation.
    pub fn unscheduled(&self) -> impl Iterator<Item = UserId> + '_ {
        self.leftovers.iter().map(|leftover| leftover.user_id)
    }

    #[must_use]
    pub fn time_of(&self, user_id: UserId) -> Option<Timestamp> {
        self.slots
            .iter()
            .find(|slot| slot.user_id == user_id)
            .map(|slot| slot.time)
    }
}

/// One suggestion per policy, computed from the same input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub invitee_order: Suggestion,
    pub invitee_priorities: Suggestion,
}

impl Suggestions {
    #[must_use]
    pub const fn get(&self, policy: PriorityPolicy) -> &Suggestion {
        match policy {
            PriorityPolicy::InviteeOrder => &self.invitee_order,
            PriorityPolicy::InviteePriorities => &self.invitee_priorities,
        }
    }

    /// Splits into `(requested, other)`.
    #[must_use]
    pub fn split(self, requested: PriorityPolicy) -> (Suggestion, Suggestion) {
        match requested {
            PriorityPolicy::InviteeOrder => (self.invitee_order, self.invitee_priorities),
            PriorityPolicy::InviteePriorities => (self.invitee_priorities, self.invitee_order),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;

    use super::*;
    use crate::catalog::SlotIndex;
    use crate::test_support::at;

    fn input() -> SuggestionInput {
        SuggestionInput {
            slots: vec![
                OwnerSlot {
                    time: at(14),
                    owner_priority: SlotPriority::Available,
                },
                OwnerSlot {
                    time: at(9),
                    owner_priority: SlotPriority::Prioritized,
                },
            ],
            responses: vec![
                ParticipantResponse {
                    user_id: UserId(1),
                    response_order: 1,
                    available: BTreeSet::from([at(14), at(9)]),
                    prioritized: BTreeSet::new(),
                },
                ParticipantResponse {
                    user_id: UserId(2),
                    response_order: 2,
                    available: BTreeSet::from([at(9)]),
                    prioritized: BTreeSet::from([at(14)]),
                },
                ParticipantResponse {
                    user_id: UserId(3),
                    response_order: 3,
                    available: BTreeSet::from([at(14)]),
                    prioritized: BTreeSet::new(),
                },
            ],
        }
    }

    #[test]
    fn resolves_times_in_catalog_order() {
        let suggestion = input().suggest(PriorityPolicy::InviteeOrder).unwrap();

        assert_eq!(
            suggestion,
            Suggestion {
                priority: PriorityPolicy::InviteeOrder,
                n_scheduled: 2,
                slots: vec![
                    SuggestedSlot {
                        user_id: UserId(1),
                        time: at(14),
                    },
                    SuggestedSlot {
                        user_id: UserId(2),
                        time: at(9),
                    },
                ],
                leftovers: vec![Leftover { user_id: UserId(3) }],
            }
        );
        assert_eq!(suggestion.time_of(UserId(2)), Some(at(9)));
        assert_eq!(suggestion.time_of(UserId(3)), None);
    }

    #[test]
    fn invitee_order_ignores_later_priority() {
        // user 1 takes the first proposed slot (14:00), which user 2 prioritized
        let suggestion = input().suggest(PriorityPolicy::InviteeOrder).unwrap();

        assert_eq!(suggestion.scheduled().collect::<Vec<_>>(), vec![UserId(1), UserId(2)]);
        assert_eq!(suggestion.time_of(UserId(2)), Some(at(9)));
        assert_eq!(suggestion.unscheduled().collect::<Vec<_>>(), vec![UserId(3)]);
    }

    #[test]
    fn both_policies_from_one_input() {
        let suggestions = input().suggest_both().unwrap();

        assert_eq!(
            suggestions.get(PriorityPolicy::InviteeOrder),
            &input().suggest(PriorityPolicy::InviteeOrder).unwrap()
        );
        let priorities = suggestions.get(PriorityPolicy::InviteePriorities);
        assert_eq!(priorities.priority, PriorityPolicy::InviteePriorities);
        assert_eq!(priorities.time_of(UserId(2)), Some(at(14)));
        assert_eq!(priorities.time_of(UserId(1)), Some(at(9)));
        assert_eq!(priorities.unscheduled().collect::<Vec<_>>(), vec![UserId(3)]);

        let (requested, other) = suggestions.split(PriorityPolicy::InviteePriorities);
        assert_eq!(requested.priority, PriorityPolicy::InviteePriorities);
        assert_eq!(other.priority, PriorityPolicy::InviteeOrder);
    }

    #[test]
    fn counts_match_resolved_slots() {
        for policy in PriorityPolicy::ALL {
            let suggestion = input().suggest(policy).unwrap();

            assert_eq!(suggestion.n_scheduled as usize, suggestion.slots.len());
            assert_eq!(
                suggestion.slots.len() + suggestion.leftovers.len(),
                input().responses.len()
            );
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "scheduled outside the catalog")]
    fn rejects_result_of_another_catalog() {
        let catalog = SlotCatalog::new([(at(9), SlotPriority::Available)]).unwrap();
        let result = MatchingResult {
            policy: PriorityPolicy::InviteeOrder,
            scheduled: [(UserId(1), SlotIndex(0)), (UserId(2), SlotIndex(3))]
                .into_iter()
                .collect(),
            unscheduled: Vec::new(),
            n_scheduled: 2,
        };

        let _ = Suggestion::resolve(&result, &catalog);
    }

    #[test]
    fn unknown_time_fails_before_matching() {
        let mut input = input();
        input.responses[2].available.insert(at(20));

        assert_eq!(
            input.suggest_both(),
            Err(InputError::UnknownSlot {
                user_id: UserId(3),
                time: at(20)
            })
        );
    }

    #[test]
    fn duplicate_owner_slot_is_rejected() {
        let mut input = input();
        input.slots.push(input.slots[0]);

        assert_eq!(
            input.suggest(PriorityPolicy::InviteeOrder),
            Err(InputError::DuplicateSlot { time: at(14) })
        );
    }

    #[test]
    fn reads_wire_format() {
        let input: SuggestionInput = serde_json::from_str(
            r#"{
                "slots": [
                    {"time": "2024-03-01T01:00:00Z", "owner_priority": 0},
                    {"time": "2024-03-01T02:00:00Z", "owner_priority": 1}
                ],
                "responses": [
                    {"user_id": 1, "response_order": 1, "available": ["2024-03-01T01:00:00Z"]},
                    {"user_id": 2, "response_order": 2, "prioritized": ["2024-03-01T02:00:00Z"]}
                ]
            }"#,
        )
        .unwrap();

        let suggestion = input.suggest(PriorityPolicy::InviteeOrder).unwrap();

        assert_eq!(suggestion.n_scheduled, 2);
        assert_eq!(suggestion.time_of(UserId(1)), Some(at(1)));
        assert_eq!(suggestion.time_of(UserId(2)), Some(at(2)));
        assert!(suggestion.leftovers.is_empty());

        let output = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(output["priority"], "invitee_order");
        assert_eq!(output["slots"][1]["user_id"], 2);
        assert_eq!(output["slots"][1]["time"], "2024-03-01T02:00:00Z");
    }
}
