use std::sync::{Arc, PoisonError, RwLock};

pub trait ViewerSession: Send + Sync {
    fn bearer_token(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }
}

impl ViewerSession for StaticSession {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    token: Arc<RwLock<Option<String>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn sign_out(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ViewerSession for SharedSession {
    fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_anonymous() {
        assert!(!StaticSession::with_token("  ").is_authenticated());
        assert!(StaticSession::with_token("abc").is_authenticated());
    }

    #[test]
    fn shared_session_changes_are_visible_to_clones() {
        let owner = SharedSession::new();
        let view = owner.clone();
        assert!(!view.is_authenticated());
        owner.sign_in("tok");
        assert_eq!(view.bearer_token().as_deref(), Some("tok"));
        owner.sign_out();
        assert!(!view.is_authenticated());
    }

    #[test]
    fn sign_in_survives_a_poisoned_lock() {
        let owner = SharedSession::new();
        let holder = owner.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.token.write().expect("lock");
            panic!("poison the session lock");
        })
        .join();
        assert!(owner.token.is_poisoned());

        owner.sign_in("after-poison");
        assert_eq!(owner.bearer_token().as_deref(), Some("after-poison"));
        owner.sign_out();
        assert!(!owner.is_authenticated());
    }
}
