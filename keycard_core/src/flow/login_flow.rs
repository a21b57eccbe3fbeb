use super::{Effect, Navigation, Notice, TimerId, ERROR_DISPLAY};
use crate::api::{error, login};
use crate::guard::Route;
use crate::session::Session;
use crate::storage::Storage;
use crate::validate;

/// Where the login flow is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the person to submit
    Idle,

    /// We asked the server and are waiting to hear back
    Submitting,

    /// We logged in and moved on. Nothing else will happen here.
    Navigated,
}

/// Logging in: validate, call the server, store the session, move on.
#[derive(Debug)]
pub struct LoginFlow {
    /// What the person has typed so far
    pub form: login::Req,

    /// Where to go once we're logged in, if somewhere specific
    from: Option<Route>,

    /// Where we are in the lifecycle
    state: State,

    /// Whatever went wrong last
    error: Notice,
}

impl LoginFlow {
    /// Start a new login. `from` is where the person was trying to get to
    /// before they were sent here.
    pub fn new(from: Option<Route>) -> Self {
        Self {
            form: login::Req::default(),
            from,
            state: State::Idle,
            error: Notice::default(),
        }
    }

    /// Where we are in the lifecycle
    pub fn state(&self) -> State {
        self.state
    }

    /// The error to show, if any
    pub fn error(&self) -> Option<&str> {
        self.error.text()
    }

    /// Where we'll go after a successful login
    pub fn destination(&self) -> Route {
        self.from.unwrap_or(Route::DEFAULT_LANDING)
    }

    /// The person pressed the button. Empty fields never make it to the
    /// server, and we only have one request in flight at a time.
    pub fn submit(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.state != State::Idle {
            tracing::debug!(state = ?self.state, "ignoring login submit");
            return effects;
        }

        if let Err(problem) = validate::login(&self.form) {
            self.error
                .show(problem.to_owned(), ERROR_DISPLAY, &mut effects);
            return effects;
        }

        self.state = State::Submitting;
        effects.push(Effect::LogIn(self.form.clone()));

        effects
    }

    /// The server got back to us.
    pub fn finish<S: Storage>(
        &mut self,
        result: error::Result<login::Success>,
        session: &mut Session<S>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.state != State::Submitting {
            tracing::debug!(state = ?self.state, "ignoring login result we didn't ask for");
            return effects;
        }

        let success = match result {
            Ok(success) => success,
            Err(err) => {
                tracing::info!(?err, "login failed");

                self.state = State::Idle;
                self.error
                    .show(err.display_message(), ERROR_DISPLAY, &mut effects);
                return effects;
            }
        };

        if let Err(err) = session.store(&success.token, &success.role) {
            tracing::error!(?err, "could not save session");

            self.state = State::Idle;
            self.error.show(err.to_string(), ERROR_DISPLAY, &mut effects);
            return effects;
        }

        let to = self.destination();
        tracing::info!(role = %success.role, %to, "logged in");

        self.state = State::Navigated;
        self.error.clear(&mut effects);
        effects.push(Effect::Navigate(Navigation { to, replace: true }));

        effects
    }

    /// A timer we scheduled went off.
    pub fn timer_fired(&mut self, timer: TimerId) {
        if self.error.expire(timer) {
            tracing::debug!(?timer, "cleared login error");
        }
    }

    /// We're going away; cancel anything still pending.
    pub fn teardown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.error.clear(&mut effects);
        effects
    }
}
