use std::sync::Arc;

/// Readiness of the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// The provider has not finished resolving the current user.
    Loading,
    Authenticated { user_id: String },
    /// No user is signed in.
    Absent,
}

/// Narrow seam to the authentication collaborator; the core only needs a
/// user id and a readiness flag.
pub trait IdentityProvider: Send + Sync + 'static {
    fn identity(&self) -> Identity;
}

/// Fixed identity, used by the CLI and in tests.
pub struct StaticIdentity {
    user_id: String,
}

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            user_id: user_id.into(),
        })
    }
}

impl IdentityProvider for StaticIdentity {
    fn identity(&self) -> Identity {
        Identity::Authenticated {
            user_id: self.user_id.clone(),
        }
    }
}
