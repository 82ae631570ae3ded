use meeting_suggest_optimizer::{MeetingId, PriorityPolicy, Suggestion, Suggestions};
use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::store::{InputSource, SuggestionStore};

/// Computes a suggestion once per `(meeting, policy)` and serves the stored copy afterwards.
///
/// A stored suggestion is never refreshed implicitly, even when the meeting changed in the
/// meantime. Callers that know the inputs changed use [`SuggestionCache::regenerate`] or
/// [`SuggestionCache::invalidate`].
pub struct SuggestionCache<S, I> {
    store: S,
    inputs: I,
}

impl<S: SuggestionStore, I: InputSource> SuggestionCache<S, I> {
    pub const fn new(store: S, inputs: I) -> Self {
        Self { store, inputs }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn inputs(&self) -> &I {
        &self.inputs
    }

    #[instrument(skip(self))]
    pub async fn get_or_compute(
        &self,
        meeting_id: MeetingId,
        policy: PriorityPolicy,
    ) -> Result<Suggestion, AppError> {
        if let Some(stored) = self.store.load(meeting_id, policy).await? {
            debug!("serving stored suggestion");
            return Ok(stored);
        }

        let (requested, other) = self.compute(meeting_id).await?.split(policy);
        self.store.store(meeting_id, &requested).await?;
        // the other policy is only filled in, never overwritten
        if !self.store.store_if_absent(meeting_id, &other).await? {
            debug!(policy = %other.priority, "kept stored suggestion");
        }
        Ok(requested)
    }

    /// Recomputes from current inputs and supersedes both stored policies.
    ///
    /// Nothing stored is touched when the inputs turn out to be invalid.
    #[instrument(skip(self))]
    pub async fn regenerate(
        &self,
        meeting_id: MeetingId,
        policy: PriorityPolicy,
    ) -> Result<Suggestion, AppError> {
        let (requested, other) = self.compute(meeting_id).await?.split(policy);
        self.store.store(meeting_id, &other).await?;
        self.store.store(meeting_id, &requested).await?;
        Ok(requested)
    }

    #[instrument(skip(self))]
    pub async fn invalidate(&self, meeting_id: MeetingId) -> Result<usize, AppError> {
        let removed = self.store.invalidate(meeting_id).await?;
        debug!(removed, "invalidated suggestions");
        Ok(removed)
    }

    async fn compute(&self, meeting_id: MeetingId) -> Result<Suggestions, AppError> {
        let input = self.inputs.load_inputs(meeting_id).await?;
        let suggestions = input.suggest_both()?;
        info!(
            %meeting_id,
            invitee_order = suggestions.invitee_order.n_scheduled,
            invitee_priorities = suggestions.invitee_priorities.n_scheduled,
            "computed suggestions"
        );
        Ok(suggestions)
    }
}
