use super::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The status code the API puts in a body to say "that worked".
pub const OK: u16 = 200;

/// The body every endpoint returns. What's filled in depends on the
/// endpoint, so we decode this first and then pick it apart.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Raw {
    /// The API's own idea of how the request went
    pub status_code: u16,

    /// Bearer token (login only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Role label (login only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Human-readable explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Raw {
    /// Fail unless the body's `statusCode` says things went well.
    ///
    /// ## Errors
    ///
    /// `Error::Rejected` for any `statusCode` besides 200.
    pub fn accepted(self) -> Result<Self> {
        if self.status_code == OK {
            Ok(self)
        } else {
            Err(Error::Rejected {
                status_code: self.status_code,
                message: self.message,
            })
        }
    }
}
