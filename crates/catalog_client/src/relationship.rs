use std::sync::Arc;

use catalog_shared::domain::EntityRef;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    feedback::{failure_feedback, Feedback, FeedbackChannel},
    scope::ViewScope,
    session::ViewerSession,
    ActionOutcome, CatalogApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowState {
    pub entity: EntityRef,
    pub is_following: bool,
    pub follower_count: u64,
}

impl FollowState {
    pub fn not_following(entity: EntityRef) -> Self {
        Self {
            entity,
            is_following: false,
            follower_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipSnapshot {
    pub follow_state: Option<FollowState>,
    pub action_in_flight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    fn verb(self) -> &'static str {
        match self {
            FollowAction::Follow => "follow",
            FollowAction::Unfollow => "unfollow",
        }
    }
}

#[derive(Default)]
struct RelationshipState {
    follow_state: Option<FollowState>,
    action_in_flight: bool,
}

pub struct RelationshipStore {
    api: Arc<dyn CatalogApi>,
    session: Arc<dyn ViewerSession>,
    feedback: FeedbackChannel,
    scope: ViewScope,
    entity: EntityRef,
    display_name: String,
    inner: Mutex<RelationshipState>,
}

impl RelationshipStore {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        session: Arc<dyn ViewerSession>,
        feedback: FeedbackChannel,
        scope: ViewScope,
        entity: EntityRef,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            api,
            session,
            feedback,
            scope,
            entity,
            display_name: display_name.into(),
            inner: Mutex::new(RelationshipState::default()),
        }
    }

    pub fn entity(&self) -> EntityRef {
        self.entity
    }

    pub async fn snapshot(&self) -> RelationshipSnapshot {
        let guard = self.inner.lock().await;
        RelationshipSnapshot {
            follow_state: guard.follow_state,
            action_in_flight: guard.action_in_flight,
        }
    }

    /// Falls back to "not following, zero followers" on any error.
    pub async fn load_status(&self) -> FollowState {
        let authenticated = self.session.is_authenticated();
        let state = match self.api.follow_status(self.entity).await {
            Ok(status) => FollowState {
                entity: self.entity,
                is_following: authenticated && status.is_following,
                follower_count: status.follower_count,
            },
            Err(err) => {
                warn!(entity = %self.entity, error = %err, "follow: status unavailable, showing default");
                FollowState::not_following(self.entity)
            }
        };

        if self.scope.is_closed() {
            debug!(entity = %self.entity, "follow: view closed, dropping status");
            return state;
        }
        self.inner.lock().await.follow_state = Some(state);
        state
    }

    pub async fn follow(&self) -> ActionOutcome {
        self.run(FollowAction::Follow).await
    }

    /// Always issues the delete, whatever the local state says.
    pub async fn unfollow(&self) -> ActionOutcome {
        self.run(FollowAction::Unfollow).await
    }

    async fn run(&self, action: FollowAction) -> ActionOutcome {
        if !self.session.is_authenticated() {
            self.feedback.emit(Feedback::warning(format!(
                "Please sign in to {} {}.",
                action.verb(),
                self.display_name
            )));
            return ActionOutcome::Denied;
        }

        {
            let mut guard = self.inner.lock().await;
            if guard.action_in_flight {
                debug!(entity = %self.entity, action = action.verb(), "follow: action already in flight");
                return ActionOutcome::Busy;
            }
            guard.action_in_flight = true;
        }

        let outcome = self.mutate_and_reload(action).await;
        self.inner.lock().await.action_in_flight = false;
        outcome
    }

    async fn mutate_and_reload(&self, action: FollowAction) -> ActionOutcome {
        let result = match action {
            FollowAction::Follow => self.api.follow(self.entity).await,
            FollowAction::Unfollow => self.api.unfollow(self.entity).await,
        };
        if self.scope.is_closed() {
            debug!(entity = %self.entity, "follow: view closed, dropping mutation result");
            return ActionOutcome::Discarded;
        }

        if let Err(err) = result {
            warn!(entity = %self.entity, action = action.verb(), error = %err, "follow: mutation failed");
            self.feedback.emit(failure_feedback(
                &format!("{} {}", action.verb(), self.display_name),
                &err,
            ));
            return ActionOutcome::Failed;
        }

        let state = self.load_status().await;
        if self.scope.is_closed() {
            return ActionOutcome::Discarded;
        }
        info!(
            entity = %self.entity,
            action = action.verb(),
            is_following = state.is_following,
            follower_count = state.follower_count,
            "follow: reconciled"
        );
        let text = match action {
            FollowAction::Follow => format!("You are now following {}.", self.display_name),
            FollowAction::Unfollow => format!("You unfollowed {}.", self.display_name),
        };
        self.feedback.emit(Feedback::success(text));
        ActionOutcome::Completed
    }
}

#[cfg(test)]
#[path = "tests/relationship_tests.rs"]
mod tests;
