use super::profile::AccountKind;

/// Lifecycle of one account's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(AccountKind),
    Expired(AccountKind),
    Revoked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(AccountKind),
    ValidationFailed,
    Refreshed,
    RefreshFailed,
    Removed,
}

impl SessionState {
    /// Transitions that don't apply to the current state are ignored.
    pub fn apply(self, event: SessionEvent) -> SessionState {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (_, E::LoggedIn(kind)) => S::Authenticated(kind),
            (S::Authenticated(kind), E::ValidationFailed) => S::Expired(kind),
            (S::Authenticated(kind) | S::Expired(kind), E::Refreshed) => S::Authenticated(kind),
            (S::Authenticated(_) | S::Expired(_), E::Removed) => S::Revoked,
            (state, _) => state,
        }
    }

    /// Whether the session can be handed to the game as-is.
    pub fn is_usable(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}
