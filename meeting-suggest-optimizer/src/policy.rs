use core::fmt::{self, Display};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// How competing participants are ranked when they want the same slot.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityPolicy {
    /// First come, first served: earlier respondents always pick first.
    InviteeOrder,
    /// Prioritized slots of every participant are handed out before plain availability.
    InviteePriorities,
}

impl PriorityPolicy {
    pub const ALL: [Self; 2] = [Self::InviteeOrder, Self::InviteePriorities];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InviteeOrder => "invitee_order",
            Self::InviteePriorities => "invitee_priorities",
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::InviteeOrder => Self::InviteePriorities,
            Self::InviteePriorities => Self::InviteeOrder,
        }
    }
}

impl Display for PriorityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityPolicy {
    type Err = InputError;

    // the old endpoints reported the upper-case names, so accept those as well
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| InputError::InvalidPolicy(value.to_owned()))
    }
}

/// Priority attached to a single submitted time, by the owner or by a participant.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum SlotPriority {
    #[default]
    Available,
    Prioritized,
}

impl SlotPriority {
    /// Only a flag of exactly `1` means prioritized.
    #[must_use]
    pub fn from_flag(flag: impl Into<i64>) -> Self {
        if flag.into() == 1 {
            Self::Prioritized
        } else {
            Self::Available
        }
    }

    #[must_use]
    pub const fn flag(self) -> u8 {
        match self {
            Self::Available => 0,
            Self::Prioritized => 1,
        }
    }
}

impl From<u8> for SlotPriority {
    fn from(flag: u8) -> Self {
        Self::from_flag(flag)
    }
}

impl From<SlotPriority> for u8 {
    fn from(priority: SlotPriority) -> Self {
        priority.flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_names() {
        assert_eq!(
            "invitee_order".parse::<PriorityPolicy>(),
            Ok(PriorityPolicy::InviteeOrder)
        );
        assert_eq!(
            "INVITEE_PRIORITIES".parse::<PriorityPolicy>(),
            Ok(PriorityPolicy::InviteePriorities)
        );
    }

    #[test]
    fn rejects_unknown_policy() {
        assert_eq!(
            "alphabetical".parse::<PriorityPolicy>(),
            Err(InputError::InvalidPolicy("alphabetical".to_owned()))
        );
    }

    #[test]
    fn policy_round_trips_through_display() {
        for policy in PriorityPolicy::ALL {
            assert_eq!(policy.to_string().parse::<PriorityPolicy>(), Ok(policy));
            assert_eq!(policy.other().other(), policy);
        }
    }

    #[test]
    fn only_one_is_prioritized() {
        assert_eq!(SlotPriority::from_flag(1), SlotPriority::Prioritized);
        assert_eq!(SlotPriority::from_flag(0), SlotPriority::Available);
        assert_eq!(SlotPriority::from_flag(2), SlotPriority::Available);
        assert_eq!(SlotPriority::from_flag(-1), SlotPriority::Available);
    }

    #[test]
    fn slot_priority_serializes_as_flag() {
        assert_eq!(serde_json::to_string(&SlotPriority::Prioritized).unwrap(), "1");
        assert_eq!(
            serde_json::from_str::<SlotPriority>("0").unwrap(),
            SlotPriority::Available
        );
    }
}
