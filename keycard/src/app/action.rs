use crossterm::event::KeyEvent;
use keycard_core::api::{error, login, register};
use keycard_core::flow::TimerId;

/// Things that can happen to this app
#[derive(Debug)]
pub enum Action {
    /// The user did something on the keyboard
    Key(KeyEvent),

    /// The login request finished, one way or another
    LoggedIn(error::Result<login::Success>),

    /// The registration request finished, one way or another
    Registered(error::Result<register::Registered>),

    /// A timer we scheduled went off
    TimerFired(TimerId),

    /// Something bad happened; display it to the user
    Problem(String),
}
