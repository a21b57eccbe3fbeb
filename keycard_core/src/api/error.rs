use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Easy alias for error handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can happen while talking to the API
#[derive(Debug, Error)]
pub enum Error {
    /// We couldn't parse a URL, for example if the base URL was invalid.
    #[error("URL error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The request didn't complete, for example if the server was unreachable
    /// or the body wasn't the JSON we expected.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Request failed with status code {}", .status.as_u16())]
    Status {
        /// The HTTP status we got
        status: StatusCode,

        /// The `message` field of the response body, if it had one
        message: Option<String>,
    },

    /// The server answered 2xx but the body's `statusCode` wasn't 200.
    #[error("Server responded with status code {status_code}")]
    Rejected {
        /// The `statusCode` from the body
        status_code: u16,

        /// The `message` from the body, if present
        message: Option<String>,
    },

    /// The server said everything was fine but left out something we need.
    #[error("Server response is missing `{0}`")]
    MissingField(&'static str),

    /// We tried to make an authenticated request without a token.
    #[error("Unauthorized")]
    Unauthorized,
}

impl Error {
    /// What to show a person when this happens: the server's own message if
    /// it sent one, otherwise our description of the error.
    pub fn display_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            }
            | Self::Rejected {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            _ => self.to_string(),
        }
    }
}

/// The body of an error response. Everything is optional since we may be
/// talking to a proxy instead of the API.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResp {
    /// Human-readable explanation
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_message_prefers_server_message() {
        let err = Error::Status {
            status: StatusCode::UNAUTHORIZED,
            message: Some("Invalid credentials".to_string()),
        };

        assert_eq!(err.display_message(), "Invalid credentials");
    }

    #[test]
    fn display_message_falls_back_to_status() {
        let err = Error::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };

        assert_eq!(
            err.display_message(),
            "Request failed with status code 500"
        );
    }

    #[test]
    fn display_message_ignores_empty_message() {
        let err = Error::Rejected {
            status_code: 400,
            message: Some(String::new()),
        };

        assert_eq!(
            err.display_message(),
            "Server responded with status code 400"
        );
    }
}
