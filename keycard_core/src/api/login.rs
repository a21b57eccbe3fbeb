use super::error::{Error, Result};
use super::response::Raw;
use crate::session::Role;
use serde::{Deserialize, Serialize};

/// The request to log into the server.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Req {
    /// Email the account was registered with.
    pub email: String,

    /// Plaintext password to use for login.
    pub password: String,
}

/// Result of logging in successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success {
    /// Bearer token to use for future requests.
    pub token: String,

    /// Role label, exactly as the server sent it.
    pub role: String,
}

impl Success {
    /// The role, parsed
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }
}

impl TryFrom<Raw> for Success {
    type Error = Error;

    fn try_from(raw: Raw) -> Result<Self> {
        let raw = raw.accepted()?;

        Ok(Self {
            token: raw.token.ok_or(Error::MissingField("token"))?,
            role: raw.role.ok_or(Error::MissingField("role"))?,
        })
    }
}

/// Where the login endpoint lives.
pub const PATH: &str = "/api/auth/login";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn success_needs_token() {
        let raw = Raw {
            status_code: 200,
            role: Some("USER".to_string()),
            ..Raw::default()
        };

        assert!(matches!(
            Success::try_from(raw),
            Err(Error::MissingField("token"))
        ));
    }

    #[test]
    fn success_needs_role() {
        let raw = Raw {
            status_code: 200,
            token: Some("T1".to_string()),
            ..Raw::default()
        };

        assert!(matches!(
            Success::try_from(raw),
            Err(Error::MissingField("role"))
        ));
    }

    #[test]
    fn success_keeps_unknown_roles() {
        let raw = Raw {
            status_code: 200,
            token: Some("T1".to_string()),
            role: Some("AUDITOR".to_string()),
            message: None,
        };

        let success = Success::try_from(raw).unwrap();
        assert_eq!(success.role, "AUDITOR");
        assert_eq!(success.role(), Role::Other("AUDITOR".to_string()));
    }
}
