//! Identity boundary consumed by attendance writes.
//!
//! The core only needs the current user's opaque id to stamp
//! `recorded_by`; it enforces no authorization levels.

use crate::model::attendance::UserId;

/// Source of the currently authenticated user.
pub trait IdentityProvider {
    /// Returns `None` when nobody is signed in.
    fn current_user_id(&self) -> Option<UserId>;
}

/// Fixed identity, used by the CLI and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    user_id: Option<UserId>,
}

impl StaticIdentity {
    pub fn signed_in(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self { user_id: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.user_id
            .as_ref()
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}
