use super::error::{Error, Result};
use super::response::Raw;
use serde::{Deserialize, Serialize};

/// The request to register a new account.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Req {
    /// What to call the person.
    pub name: String,

    /// Email to use for contact and login.
    pub email: String,

    /// Plaintext password to use for login.
    pub password: String,

    /// How to reach the person by phone.
    pub phone_number: String,
}

/// Result of registering a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    /// Whatever the server had to say about it.
    pub message: Option<String>,
}

impl TryFrom<Raw> for Registered {
    type Error = Error;

    fn try_from(raw: Raw) -> Result<Self> {
        let raw = raw.accepted()?;

        Ok(Self {
            message: raw.message,
        })
    }
}

/// Where the register endpoint lives.
pub const PATH: &str = "/api/auth/register";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serializes_phone_number_in_camel_case() {
        let req = Req {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
            phone_number: "555-0100".to_string(),
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["phoneNumber"], "555-0100");
        assert!(value.get("phone_number").is_none());
    }
}
