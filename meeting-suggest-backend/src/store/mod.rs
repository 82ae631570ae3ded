mod memory;
mod postgres;

use async_trait::async_trait;
use meeting_suggest_optimizer::{MeetingId, PriorityPolicy, Suggestion, SuggestionInput};

pub use self::memory::{MemoryInputs, MemoryStore};
pub use self::postgres::PgSuggestions;
use crate::error::AppError;

/// Where suggestions are kept, one per `(meeting, policy)`.
#[async_trait]
pub trait SuggestionStore: Send + Sync {
    async fn load(
        &self,
        meeting_id: MeetingId,
        policy: PriorityPolicy,
    ) -> Result<Option<Suggestion>, AppError>;

    /// Supersedes whatever is stored for `(meeting_id, suggestion.priority)`.
    async fn store(&self, meeting_id: MeetingId, suggestion: &Suggestion) -> Result<(), AppError>;

    /// Stores only when nothing is stored for `(meeting_id, suggestion.priority)`, atomically.
    /// Returns whether the suggestion was stored.
    async fn store_if_absent(
        &self,
        meeting_id: MeetingId,
        suggestion: &Suggestion,
    ) -> Result<bool, AppError>;

    /// Removes the suggestions of every policy, returns how many were removed.
    async fn invalidate(&self, meeting_id: MeetingId) -> Result<usize, AppError>;
}

/// Current slots and accepted responses of a meeting.
#[async_trait]
pub trait InputSource: Send + Sync {
    async fn load_inputs(&self, meeting_id: MeetingId) -> Result<SuggestionInput, AppError>;
}
