use super::{Effect, Navigation, Notice, TimerId, ERROR_DISPLAY, REDIRECT_DELAY};
use crate::api::{error, register};
use crate::guard::Route;
use crate::validate::{self, Field, FieldErrors};

/// Shown after the server accepts a registration.
pub const REGISTERED: &str = "User registered successfully";

/// Where the registration flow is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the person to submit
    Idle,

    /// We asked the server and are waiting to hear back
    Submitting,

    /// Registered! Showing the success message before moving on.
    Redirecting,

    /// We moved on. Nothing else will happen here.
    Navigated,
}

/// Registering a new account: validate each field, call the server, show a
/// success message for a bit, then go to the root page.
#[derive(Debug)]
pub struct RegisterFlow {
    form: register::Req,
    field_errors: FieldErrors,
    show_password: bool,
    state: State,
    error: Notice,
    success: Notice,
}

impl Default for RegisterFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFlow {
    /// Start with an empty form
    pub fn new() -> Self {
        Self {
            form: register::Req::default(),
            field_errors: FieldErrors::default(),
            show_password: false,
            state: State::Idle,
            error: Notice::default(),
            success: Notice::default(),
        }
    }

    /// The current form values
    pub fn form(&self) -> &register::Req {
        &self.form
    }

    /// Where we are in the lifecycle
    pub fn state(&self) -> State {
        self.state
    }

    /// Can the person press submit right now?
    pub fn can_submit(&self) -> bool {
        self.state == State::Idle
    }

    /// The validation problem for a field, if any
    pub fn field_error(&self, field: Field) -> Option<&'static str> {
        self.field_errors.get(field)
    }

    /// The request error to show, if any
    pub fn error(&self) -> Option<&str> {
        self.error.text()
    }

    /// The success message to show, if any
    pub fn success(&self) -> Option<&str> {
        self.success.text()
    }

    /// Should the password be shown in the clear?
    pub fn show_password(&self) -> bool {
        self.show_password
    }

    /// Flip password visibility
    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    /// Update a field. If that field was already flagged, we check it again so
    /// the message goes away once it's fixed.
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.form.name = value,
            Field::Email => self.form.email = value,
            Field::Password => self.form.password = value,
            Field::PhoneNumber => self.form.phone_number = value,
        }

        if self.field_errors.get(field).is_some() {
            let fresh = validate::registration(&self.form);

            match field {
                Field::Name => self.field_errors.name = fresh.name,
                Field::Email => self.field_errors.email = fresh.email,
                Field::Password => self.field_errors.password = fresh.password,
                Field::PhoneNumber => self.field_errors.phone_number = fresh.phone_number,
            }
        }
    }

    /// The person pressed the button. Every field is checked first and any
    /// problem keeps the request from going out.
    pub fn submit(&mut self) -> Vec<Effect> {
        if !self.can_submit() {
            tracing::debug!(state = ?self.state, "ignoring registration submit");
            return Vec::new();
        }

        self.field_errors = validate::registration(&self.form);
        if !self.field_errors.is_empty() {
            tracing::debug!(errors = ?self.field_errors, "registration form is invalid");
            return Vec::new();
        }

        self.state = State::Submitting;

        vec![Effect::Register(self.form.clone())]
    }

    /// The server got back to us.
    pub fn finish(&mut self, result: error::Result<register::Registered>) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.state != State::Submitting {
            tracing::debug!(state = ?self.state, "ignoring registration result we didn't ask for");
            return effects;
        }

        match result {
            Ok(registered) => {
                tracing::info!(message = ?registered.message, "registered");

                self.form = register::Req::default();
                self.field_errors = FieldErrors::default();
                self.state = State::Redirecting;
                self.error.clear(&mut effects);
                self.success
                    .show(REGISTERED.to_owned(), REDIRECT_DELAY, &mut effects);
            }
            Err(err) => {
                tracing::info!(?err, "registration failed");

                self.state = State::Idle;
                self.error
                    .show(err.display_message(), ERROR_DISPLAY, &mut effects);
            }
        }

        effects
    }

    /// A timer we scheduled went off.
    pub fn timer_fired(&mut self, timer: TimerId) -> Vec<Effect> {
        if self.error.expire(timer) {
            tracing::debug!(?timer, "cleared registration error");
            return Vec::new();
        }

        if self.success.expire(timer) {
            self.state = State::Navigated;

            return vec![Effect::Navigate(Navigation {
                to: Route::Root,
                replace: false,
            })];
        }

        Vec::new()
    }

    /// We're going away; cancel anything still pending.
    pub fn teardown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.error.clear(&mut effects);
        self.success.clear(&mut effects);
        effects
    }
}
