use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use meeting_suggest_optimizer::{MeetingId, PriorityPolicy, Suggestion, SuggestionInput};
use tokio::sync::Mutex;

use super::{InputSource, SuggestionStore};
use crate::error::AppError;

/// Keeps suggestions in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    suggestions: Mutex<BTreeMap<(MeetingId, PriorityPolicy), Suggestion>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of suggestions written so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub async fn contains(&self, meeting_id: MeetingId, policy: PriorityPolicy) -> bool {
        self.suggestions
            .lock()
            .await
            .contains_key(&(meeting_id, policy))
    }

    /// Drops a single policy, unlike [`SuggestionStore::invalidate`].
    pub async fn forget(&self, meeting_id: MeetingId, policy: PriorityPolicy) -> Option<Suggestion> {
        self.suggestions.lock().await.remove(&(meeting_id, policy))
    }
}

#[async_trait]
impl SuggestionStore for MemoryStore {
    async fn load(
        &self,
        meeting_id: MeetingId,
        policy: PriorityPolicy,
    ) -> Result<Option<Suggestion>, AppError> {
        Ok(self
            .suggestions
            .lock()
            .await
            .get(&(meeting_id, policy))
            .cloned())
    }

    async fn store(&self, meeting_id: MeetingId, suggestion: &Suggestion) -> Result<(), AppError> {
        self.suggestions
            .lock()
            .await
            .insert((meeting_id, suggestion.priority), suggestion.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn store_if_absent(
        &self,
        meeting_id: MeetingId,
        suggestion: &Suggestion,
    ) -> Result<bool, AppError> {
        let mut suggestions = self.suggestions.lock().await;
        let Entry::Vacant(entry) = suggestions.entry((meeting_id, suggestion.priority)) else {
            return Ok(false);
        };
        entry.insert(suggestion.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    async fn invalidate(&self, meeting_id: MeetingId) -> Result<usize, AppError> {
        let mut suggestions = self.suggestions.lock().await;
        let before = suggestions.len();
        suggestions.retain(|(stored_meeting, _), _| *stored_meeting != meeting_id);
        Ok(before - suggestions.len())
    }
}

/// Serves inputs from memory and counts how often they were asked for.
#[derive(Debug, Default)]
pub struct MemoryInputs {
    inputs: Mutex<BTreeMap<MeetingId, SuggestionInput>>,
    loads: AtomicUsize,
}

impl MemoryInputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, meeting_id: MeetingId, input: SuggestionInput) {
        self.inputs.lock().await.insert(meeting_id, input);
    }

    /// Number of `load_inputs` calls so far, i.e. how often something was computed.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl InputSource for MemoryInputs {
    async fn load_inputs(&self, meeting_id: MeetingId) -> Result<SuggestionInput, AppError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.inputs
            .lock()
            .await
            .get(&meeting_id)
            .cloned()
            .ok_or(AppError::MeetingNotFound(meeting_id))
    }
}
