use crate::storage::{self, Storage};
use std::fmt::{self, Display};

/// Where the bearer token lives in storage.
pub const TOKEN_KEY: &str = "token";

/// Where the role label lives in storage.
pub const ROLE_KEY: &str = "role";

/// A coarse authorization label handed out by the server on login.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Role {
    /// `ADMIN`
    Admin,

    /// `USER`
    User,

    /// Anything else the server decides to send us. We keep it around but it
    /// grants nothing.
    Other(String),
}

impl Role {
    /// Parse a stored role label. Matching is exact, so `admin` is not
    /// `ADMIN`.
    pub fn parse(label: &str) -> Self {
        match label {
            "ADMIN" => Self::Admin,
            "USER" => Self::User,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The label as stored and sent on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
            Self::Other(other) => other,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The logged-in (or not) state of this client. All reads go straight to
/// storage, so whatever was there at startup is what we see.
#[derive(Debug)]
pub struct Session<S> {
    storage: S,
}

impl<S: Storage> Session<S> {
    /// Wrap a storage backend. Any existing token and role are picked up
    /// immediately.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The stored bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// The stored role, if any.
    pub fn role(&self) -> Option<Role> {
        self.storage.get(ROLE_KEY).map(|label| Role::parse(&label))
    }

    /// Remember a successful login. We trust the server here; nothing about
    /// the token is checked. Either both keys are written or, on failure,
    /// neither is left behind.
    ///
    /// ## Errors
    ///
    /// Whatever the storage backend returns.
    pub fn store(&mut self, token: &str, role: &str) -> storage::Result<()> {
        tracing::debug!(role, "storing session");

        let res = self
            .storage
            .set(TOKEN_KEY, token)
            .and_then(|()| self.storage.set(ROLE_KEY, role));

        if res.is_err() {
            // A token without its role would still count as logged in.
            if let Err(err) = self.logout_quietly() {
                tracing::warn!(?err, "could not roll back partial session");
            }
        }

        res
    }

    fn logout_quietly(&mut self) -> storage::Result<()> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(ROLE_KEY)
    }

    /// Forget the token and role. Doing this when already logged out is a
    /// no-op.
    ///
    /// ## Errors
    ///
    /// Whatever the storage backend returns.
    pub fn logout(&mut self) -> storage::Result<()> {
        tracing::info!("logging out");

        self.logout_quietly()
    }

    /// Do we have a non-empty token?
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|token| !token.is_empty())
    }

    /// Is the stored role exactly `ADMIN`?
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Is the stored role exactly `USER`?
    pub fn is_user(&self) -> bool {
        self.role() == Some(Role::User)
    }
}
