use super::Action;
use crate::config::Config;
use keycard_core::api::{self, login, register, Client};
use keycard_core::flow::TimerId;
use std::time::Duration;

/// Connections to external services that effects use. We keep these around to
/// have some level of connection sharing for the app as a whole.
pub struct EffectContext {
    /// an HTTP client with reqwest
    http: reqwest::Client,

    /// where the account API lives
    api: Client,
}

impl EffectContext {
    /// Set up connections according to the config. Requests time out after
    /// the configured delay and are never retried.
    ///
    /// ## Errors
    ///
    /// If the HTTP client can't be built (e.g. no TLS backend is available.)
    pub fn new(config: &Config) -> Result<Self, Problem> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(api::Error::from)?;

        Ok(Self {
            http,
            api: Client::new(config.server.clone()),
        })
    }
}

/// Things that can happen as a result of user input. Side effects!
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    /// Log in to an existing account.
    LogIn(login::Req),

    /// Register a new account on the server.
    Register(register::Req),

    /// Send `Action::TimerFired` after a delay
    Schedule(TimerId, Duration),

    /// Stop a scheduled timer
    Cancel(TimerId),
}

impl Effect {
    /// Perform the side-effectful portions of this effect, returning the next
    /// `Action` the application needs to handle. Timers are the main loop's
    /// business, so they don't produce anything here.
    pub async fn run(self, conn: &EffectContext) -> Option<Action> {
        match self {
            Self::LogIn(req) => {
                tracing::info!("logging in");

                let res = conn.api.login(&conn.http, &req).await;
                if let Err(problem) = &res {
                    tracing::error!(?problem, "problem logging in");
                }

                Some(Action::LoggedIn(res))
            }

            Self::Register(req) => {
                tracing::info!("registering");

                let res = conn.api.register(&conn.http, &req).await;
                if let Err(problem) = &res {
                    tracing::error!(?problem, "problem registering");
                }

                Some(Action::Registered(res))
            }

            Self::Schedule(..) | Self::Cancel(_) => {
                tracing::warn!(effect = ?self, "timer effects should be handled by the main loop");
                None
            }
        }
    }
}

/// Problems that can happen while setting up or running effects.
#[derive(Debug, thiserror::Error)]
pub enum Problem {
    /// We had a problem setting up communication with the server.
    #[error("Problem communicating with the server: {0}")]
    Server(#[from] api::Error),

    /// We couldn't read or write the session.
    #[error("Problem with the session store: {0}")]
    Storage(#[from] keycard_core::storage::Error),
}
