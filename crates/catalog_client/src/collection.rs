use std::sync::Arc;

use catalog_shared::{
    domain::{Rating, ReleaseId},
    protocol::{CollectionEntry, CollectionEntryPayload, CommunityRating, ReleaseOverview},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::CatalogError,
    feedback::{failure_feedback, Feedback, FeedbackChannel},
    scope::ViewScope,
    session::ViewerSession,
    ActionOutcome, CatalogApi, ReleaseOverviewParams,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Price target must be a non-negative number, got {0:?}.")]
    InvalidPrice(String),
}

pub fn parse_price_threshold(text: &str) -> Result<Option<f64>, EditError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(EditError::InvalidPrice(trimmed.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditBuffer {
    pub wishlist: bool,
    pub notes: String,
    pub price_threshold: String,
    pub rating: Option<Rating>,
}

impl EditBuffer {
    pub fn from_entry(entry: Option<&CollectionEntry>) -> Self {
        match entry {
            Some(entry) => Self {
                wishlist: entry.wishlist,
                notes: entry.notes.clone(),
                price_threshold: entry
                    .price_threshold
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
                rating: entry.rating,
            },
            None => Self::default(),
        }
    }

    pub fn to_payload(&self) -> Result<CollectionEntryPayload, EditError> {
        Ok(CollectionEntryPayload {
            wishlist: self.wishlist,
            notes: self.notes.clone(),
            price_threshold: parse_price_threshold(&self.price_threshold)?,
            rating: self.rating,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    pub release_id: ReleaseId,
    pub entry: Option<CollectionEntry>,
    pub buffer: EditBuffer,
    pub community_rating: Option<CommunityRating>,
    pub overview: Option<ReleaseOverview>,
    pub loading: bool,
    pub not_found: bool,
    pub error: Option<String>,
    pub action_in_flight: bool,
}

impl CollectionSnapshot {
    pub fn is_dirty(&self) -> bool {
        self.buffer != EditBuffer::from_entry(self.entry.as_ref())
    }
}

struct CollectionState {
    overview: Option<ReleaseOverview>,
    entry: Option<CollectionEntry>,
    buffer: EditBuffer,
    loading: bool,
    not_found: bool,
    error: Option<String>,
    action_in_flight: bool,
}

impl CollectionState {
    fn reset_to(&mut self, entry: Option<CollectionEntry>) {
        self.buffer = EditBuffer::from_entry(entry.as_ref());
        self.entry = entry;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionAction {
    Save,
    Remove,
}

pub struct CollectionEditor {
    api: Arc<dyn CatalogApi>,
    session: Arc<dyn ViewerSession>,
    feedback: FeedbackChannel,
    scope: ViewScope,
    release_id: ReleaseId,
    params: ReleaseOverviewParams,
    inner: Mutex<CollectionState>,
}

impl CollectionEditor {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        session: Arc<dyn ViewerSession>,
        feedback: FeedbackChannel,
        scope: ViewScope,
        release_id: ReleaseId,
        params: ReleaseOverviewParams,
        initial: Option<CollectionEntry>,
    ) -> Self {
        Self {
            api,
            session,
            feedback,
            scope,
            release_id,
            params,
            inner: Mutex::new(CollectionState {
                overview: None,
                buffer: EditBuffer::from_entry(initial.as_ref()),
                entry: initial,
                loading: false,
                not_found: false,
                error: None,
                action_in_flight: false,
            }),
        }
    }

    pub fn release_id(&self) -> ReleaseId {
        self.release_id
    }

    pub async fn snapshot(&self) -> CollectionSnapshot {
        let guard = self.inner.lock().await;
        CollectionSnapshot {
            release_id: self.release_id,
            entry: guard.entry.clone(),
            buffer: guard.buffer.clone(),
            community_rating: guard
                .overview
                .as_ref()
                .and_then(|overview| overview.community_rating),
            overview: guard.overview.clone(),
            loading: guard.loading,
            not_found: guard.not_found,
            error: guard.error.clone(),
            action_in_flight: guard.action_in_flight,
        }
    }

    pub async fn entry(&self) -> Option<CollectionEntry> {
        self.inner.lock().await.entry.clone()
    }

    pub async fn buffer(&self) -> EditBuffer {
        self.inner.lock().await.buffer.clone()
    }

    pub async fn community_rating(&self) -> Option<CommunityRating> {
        self.inner
            .lock()
            .await
            .overview
            .as_ref()
            .and_then(|overview| overview.community_rating)
    }

    pub async fn load(&self) -> ActionOutcome {
        self.inner.lock().await.loading = true;
        let result = self.api.release_overview(self.release_id, &self.params).await;
        if self.scope.is_closed() {
            debug!(release_id = self.release_id.0, "collection: view closed, dropping overview");
            return ActionOutcome::Discarded;
        }

        let mut guard = self.inner.lock().await;
        guard.loading = false;
        match result {
            Ok(overview) => {
                guard.reset_to(overview.collection_entry.clone());
                guard.overview = Some(overview);
                guard.not_found = false;
                guard.error = None;
                ActionOutcome::Completed
            }
            Err(CatalogError::NotFound) => {
                debug!(release_id = self.release_id.0, "collection: release not found");
                guard.not_found = true;
                guard.error = None;
                guard.overview = None;
                guard.reset_to(None);
                ActionOutcome::Failed
            }
            Err(err) => {
                warn!(release_id = self.release_id.0, error = %err, "collection: overview load failed");
                guard.error = Some(err.to_string());
                drop(guard);
                self.feedback
                    .emit(failure_feedback("load this release", &err));
                ActionOutcome::Failed
            }
        }
    }

    pub async fn set_rating(&self, value: Option<u8>) -> ActionOutcome {
        if !self.session.is_authenticated() {
            self.feedback
                .emit(Feedback::warning("Please sign in to rate this release."));
            return ActionOutcome::Denied;
        }
        let rating = match value {
            None => None,
            Some(raw) => match Rating::new(raw) {
                Some(rating) => Some(rating),
                None => {
                    debug!(value = raw, "collection: ignoring out-of-range rating");
                    return ActionOutcome::Invalid;
                }
            },
        };
        self.inner.lock().await.buffer.rating = rating;
        ActionOutcome::Completed
    }

    pub async fn set_notes(&self, text: impl Into<String>) {
        self.inner.lock().await.buffer.notes = text.into();
    }

    pub async fn set_price_threshold(&self, text: impl Into<String>) {
        self.inner.lock().await.buffer.price_threshold = text.into();
    }

    pub async fn set_membership(&self, wishlist: bool) {
        self.inner.lock().await.buffer.wishlist = wishlist;
    }

    pub async fn revert(&self) {
        let mut guard = self.inner.lock().await;
        guard.buffer = EditBuffer::from_entry(guard.entry.as_ref());
    }

    /// Upserts the whole buffer; the server decides between create and update.
    pub async fn save(&self) -> ActionOutcome {
        self.run(CollectionAction::Save).await
    }

    pub async fn remove(&self) -> ActionOutcome {
        self.run(CollectionAction::Remove).await
    }

    async fn run(&self, action: CollectionAction) -> ActionOutcome {
        if !self.session.is_authenticated() {
            let text = match action {
                CollectionAction::Save => "Please sign in to save this release.",
                CollectionAction::Remove => "Please sign in to edit your collection.",
            };
            self.feedback.emit(Feedback::warning(text));
            return ActionOutcome::Denied;
        }

        let payload = {
            let mut guard = self.inner.lock().await;
            if guard.action_in_flight {
                debug!(release_id = self.release_id.0, "collection: action already in flight");
                return ActionOutcome::Busy;
            }
            let validated = match action {
                CollectionAction::Save => guard.buffer.to_payload().map(Some),
                CollectionAction::Remove => Ok(None),
            };
            let payload = match validated {
                Ok(payload) => payload,
                Err(err) => {
                    drop(guard);
                    self.feedback.emit(Feedback::warning(err.to_string()));
                    return ActionOutcome::Invalid;
                }
            };
            guard.action_in_flight = true;
            payload
        };

        let outcome = self.mutate_and_reload(action, payload).await;
        self.inner.lock().await.action_in_flight = false;
        outcome
    }

    async fn mutate_and_reload(
        &self,
        action: CollectionAction,
        payload: Option<CollectionEntryPayload>,
    ) -> ActionOutcome {
        let wishlist = payload.as_ref().map(|payload| payload.wishlist);
        let result = match payload {
            Some(payload) => {
                self.api
                    .save_collection_entry(self.release_id, &payload)
                    .await
            }
            None => self.api.remove_collection_entry(self.release_id).await,
        };
        if self.scope.is_closed() {
            debug!(release_id = self.release_id.0, "collection: view closed, dropping mutation result");
            return ActionOutcome::Discarded;
        }

        if let Err(err) = result {
            warn!(release_id = self.release_id.0, ?action, error = %err, "collection: mutation failed");
            let what = match action {
                CollectionAction::Save => "save your changes",
                CollectionAction::Remove => "remove this release",
            };
            self.feedback.emit(failure_feedback(what, &err));
            return ActionOutcome::Failed;
        }

        match self.load().await {
            ActionOutcome::Completed => {}
            ActionOutcome::Discarded => return ActionOutcome::Discarded,
            _ => {
                warn!(release_id = self.release_id.0, ?action, "collection: mutation applied but reload failed");
                let text = match action {
                    CollectionAction::Save => {
                        "Saved, but could not refresh this release. Please try again."
                    }
                    CollectionAction::Remove => {
                        "Removed, but could not refresh this release. Please try again."
                    }
                };
                self.feedback.emit(Feedback::danger(text));
                return ActionOutcome::Failed;
            }
        }
        info!(release_id = self.release_id.0, ?action, "collection: reconciled");
        let text = match (action, wishlist) {
            (CollectionAction::Save, Some(true)) => "Saved to your wantlist.",
            (CollectionAction::Save, _) => "Saved to your collection.",
            (CollectionAction::Remove, _) => "Removed from your collection.",
        };
        self.feedback.emit(Feedback::success(text));
        ActionOutcome::Completed
    }
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
