use jiff::Timestamp;
use thiserror::Error;

use crate::UserId;

/// Rejected input. Nothing is computed once one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("owner proposed the slot {time} more than once")]
    DuplicateSlot { time: Timestamp },
    #[error("time slot {time} for {user_id} not found")]
    UnknownSlot { user_id: UserId, time: Timestamp },
    #[error("unknown priority policy {0:?}")]
    InvalidPolicy(String),
    #[error("participant {user_id} responded more than once")]
    DuplicateParticipant { user_id: UserId },
    #[error("too many proposed slots ({0})")]
    TooManySlots(usize),
}
