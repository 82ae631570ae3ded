//! Greedy assignment of participants to distinct slots.
//!
//! Assignments are never revisited once made, so the result is maximal but not
//! necessarily maximum. Cost is `O(slots * participants)`.

use alloc::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{SlotCatalog, SlotIndex};
use crate::policy::PriorityPolicy;
use crate::projector::ParticipantAvailability;
use crate::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchingResult {
    pub policy: PriorityPolicy,
    /// Every value is a distinct index into the catalog the matching ran against.
    pub scheduled: BTreeMap<UserId, SlotIndex>,
    /// Participants without a slot, in response order.
    pub unscheduled: Vec<UserId>,
    pub n_scheduled: u32,
}

struct Claims {
    taken: Vec<bool>,
}

impl Claims {
    fn new(catalog: &SlotCatalog) -> Self {
        Self {
            taken: vec![false; catalog.len()],
        }
    }

    /// Claims the first free candidate.
    fn claim_first<'a, I>(&mut self, candidates: I) -> Option<SlotIndex>
    where
        I: IntoIterator<Item = &'a SlotIndex>,
    {
        candidates.into_iter().copied().find(|index| {
            self.taken
                .get_mut(index.as_usize())
                .is_some_and(|taken| !core::mem::replace(taken, true))
        })
    }
}

struct Matching {
    policy: PriorityPolicy,
    claims: Claims,
    scheduled: BTreeMap<UserId, SlotIndex>,
    unscheduled: Vec<UserId>,
    n_scheduled: u32,
}

impl Matching {
    fn new(catalog: &SlotCatalog, policy: PriorityPolicy) -> Self {
        Self {
            policy,
            claims: Claims::new(catalog),
            scheduled: BTreeMap::new(),
            unscheduled: Vec::new(),
            n_scheduled: 0,
        }
    }

    fn try_assign<'a, I>(&mut self, user_id: UserId, candidates: I) -> bool
    where
        I: IntoIterator<Item = &'a SlotIndex>,
    {
        let Some(index) = self.claims.claim_first(candidates) else {
            return false;
        };
        debug!(policy = %self.policy, %user_id, slot = %index, "claimed slot");
        self.scheduled.insert(user_id, index);
        self.n_scheduled += 1;
        true
    }

    fn leave_out(&mut self, user_id: UserId) {
        debug!(policy = %self.policy, %user_id, "no free slot left");
        self.unscheduled.push(user_id);
    }

    fn finish(self) -> MatchingResult {
        info!(
            policy = %self.policy,
            scheduled = self.n_scheduled,
            unscheduled = self.unscheduled.len(),
            "matching finished"
        );
        MatchingResult {
            policy: self.policy,
            scheduled: self.scheduled,
            unscheduled: self.unscheduled,
            n_scheduled: self.n_scheduled,
        }
    }
}

/// Assigns participants to slots.
///
/// `responses` must be sorted by `response_order`, earliest respondent first, must not
/// contain a participant twice and must have been projected onto `catalog` (see
/// [`crate::projector::project_all`]).
#[must_use]
pub fn suggest(
    catalog: &SlotCatalog,
    responses: &[ParticipantAvailability],
    policy: PriorityPolicy,
) -> MatchingResult {
    debug_assert!(
        responses
            .windows(2)
            .all(|pair| pair[0].response_order <= pair[1].response_order),
        "responses must be sorted by response order"
    );
    debug_assert!(
        responses
            .iter()
            .flat_map(|participant| participant.available.iter().chain(&participant.prioritized))
            .all(|index| index.as_usize() < catalog.len()),
        "responses must be projected onto this catalog"
    );

    let mut matching = Matching::new(catalog, policy);
    match policy {
        PriorityPolicy::InviteeOrder => {
            for participant in responses {
                let candidates = participant
                    .prioritized
                    .iter()
                    .chain(&participant.available);
                if !matching.try_assign(participant.user_id, candidates) {
                    matching.leave_out(participant.user_id);
                }
            }
        }
        PriorityPolicy::InviteePriorities => {
            for participant in responses {
                matching.try_assign(participant.user_id, &participant.prioritized);
            }
            for participant in responses {
                if matching.scheduled.contains_key(&participant.user_id) {
                    continue;
                }
                if !matching.try_assign(participant.user_id, &participant.available) {
                    matching.leave_out(participant.user_id);
                }
            }
        }
    }
    matching.finish()
}
