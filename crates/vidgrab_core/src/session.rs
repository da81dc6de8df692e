use thiserror::Error;

/// Profile fields read off the identity provider's user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn new(display_name: impl Into<String>, photo_url: Option<String>) -> Self {
        Self {
            display_name: display_name.into(),
            photo_url,
        }
    }

    /// The provider record carries no stable uid, so the display name is the key.
    pub fn same_user(&self, other: &Identity) -> bool {
        self.display_name == other.display_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No provider event seen yet.
    #[default]
    Unknown,
    SignedOut,
    SignedIn,
}

/// Local view of the provider session. Replaced wholesale on every event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Unknown,
    SignedOut,
    SignedIn(Identity),
}

impl Session {
    pub fn from_provider(identity: Option<Identity>) -> Self {
        match identity {
            Some(identity) => Session::SignedIn(identity),
            None => Session::SignedOut,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Unknown => SessionStatus::Unknown,
            Session::SignedOut => SessionStatus::SignedOut,
            Session::SignedIn(_) => SessionStatus::SignedIn,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::SignedIn(identity) => Some(identity),
            Session::Unknown | Session::SignedOut => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Session::SignedIn(_))
    }

    /// True when replacing `self` with `next` crosses a session boundary,
    /// i.e. the signed-in user is lost or becomes a different one. Profile
    /// refreshes of the same user (a new avatar URL) do not count.
    pub(crate) fn crosses_boundary(&self, next: &Session) -> bool {
        match (self, next) {
            (Session::SignedIn(current), Session::SignedIn(incoming)) => {
                !current.same_user(incoming)
            }
            (Session::SignedIn(_), _) => true,
            _ => false,
        }
    }
}

/// Failure reported by the identity provider's interactive sign-in or sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("sign-in was dismissed")]
    Dismissed,
    #[error("sign-in was denied: {0}")]
    Denied(String),
    #[error("identity provider error: {0}")]
    Provider(String),
}
