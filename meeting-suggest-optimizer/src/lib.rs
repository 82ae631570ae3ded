//! Suggests which participant should get which of the slots a meeting owner proposed.
//!
//! The pipeline is [`SlotCatalog`] -> [`projector`] -> [`matching`], and
//! [`SuggestionInput`] drives all three for both [`PriorityPolicy`] variants at once.

extern crate alloc;

pub mod catalog;
pub mod error;
pub mod matching;
pub mod policy;
pub mod projector;
pub mod suggestion;

use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub use crate::catalog::{Slot, SlotCatalog, SlotIndex};
pub use crate::error::InputError;
pub use crate::matching::{suggest, MatchingResult};
pub use crate::policy::{PriorityPolicy, SlotPriority};
pub use crate::projector::{ParticipantAvailability, ParticipantResponse};
pub use crate::suggestion::{
    Leftover, OwnerSlot, SuggestedSlot, Suggestion, SuggestionInput, Suggestions,
};

#[derive(
    Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(
    Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MeetingId(pub i32);

impl Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
