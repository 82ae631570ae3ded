//! Maps the times each participant submitted onto positions in the [`SlotCatalog`].

use alloc::collections::BTreeSet;

use itertools::Itertools;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{SlotCatalog, SlotIndex};
use crate::error::InputError;
use crate::policy::SlotPriority;
use crate::UserId;

/// A participant's answer as it was submitted: plain times, not yet checked against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub user_id: UserId,
    /// Rank by response time, earliest first.
    pub response_order: u32,
    #[serde(default)]
    pub available: BTreeSet<Timestamp>,
    #[serde(default)]
    pub prioritized: BTreeSet<Timestamp>,
}

impl ParticipantResponse {
    /// Builds a response from stored `(time, priority)` rows.
    pub fn from_rows<I>(user_id: UserId, response_order: u32, rows: I) -> Self
    where
        I: IntoIterator<Item = (Timestamp, SlotPriority)>,
    {
        let (prioritized, available) = rows
            .into_iter()
            .partition_map(|(time, priority)| match priority {
                SlotPriority::Prioritized => itertools::Either::Left(time),
                SlotPriority::Available => itertools::Either::Right(time),
            });
        Self {
            user_id,
            response_order,
            available,
            prioritized,
        }
    }
}

/// A participant's answer resolved against one catalog.
///
/// Only [`project`] builds one, so every index is inside that catalog and
/// `available` and `prioritized` never share an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantAvailability {
    pub(crate) user_id: UserId,
    pub(crate) response_order: u32,
    pub(crate) available: BTreeSet<SlotIndex>,
    pub(crate) prioritized: BTreeSet<SlotIndex>,
}

impl ParticipantAvailability {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available.is_empty() && self.prioritized.is_empty()
    }
}

fn resolve(
    catalog: &SlotCatalog,
    user_id: UserId,
    times: &BTreeSet<Timestamp>,
) -> Result<BTreeSet<SlotIndex>, InputError> {
    times
        .iter()
        .map(|&time| {
            catalog
                .index_of(time)
                .ok_or(InputError::UnknownSlot { user_id, time })
        })
        .collect()
}

pub fn project(
    catalog: &SlotCatalog,
    response: &ParticipantResponse,
) -> Result<ParticipantAvailability, InputError> {
    let prioritized = resolve(catalog, response.user_id, &response.prioritized)?;
    let mut available = resolve(catalog, response.user_id, &response.available)?;
    // a time submitted with both flags counts as prioritized
    available.retain(|index| !prioritized.contains(index));

    debug!(
        user_id = %response.user_id,
        prioritized = prioritized.len(),
        available = available.len(),
        "projected availability"
    );

    Ok(ParticipantAvailability {
        user_id: response.user_id,
        response_order: response.response_order,
        available,
        prioritized,
    })
}

/// Projects every response, returned in `(response_order, user_id)` order.
///
/// The first unknown time aborts the whole projection.
pub fn project_all(
    catalog: &SlotCatalog,
    responses: &[ParticipantResponse],
) -> Result<Vec<ParticipantAvailability>, InputError> {
    if let Some(user_id) = responses
        .iter()
        .map(|response| response.user_id)
        .duplicates()
        .next()
    {
        return Err(InputError::DuplicateParticipant { user_id });
    }

    responses
        .iter()
        .sorted_by_key(|response| (response.response_order, response.user_id))
        .map(|response| project(catalog, response))
        .collect()
}

/// Assigns `response_order` (starting at 1) by response time, ties broken by user id.
pub fn rank_by_response_time<T, I>(responses: I) -> Vec<(u32, UserId, T)>
where
    I: IntoIterator<Item = (UserId, Timestamp, T)>,
{
    (1_u32..)
        .zip(
            responses
                .into_iter()
                .sorted_by_key(|(user_id, responded_at, _)| (*responded_at, *user_id)),
        )
        .map(|(order, (user_id, _, value))| (order, user_id, value))
        .collect()
}
