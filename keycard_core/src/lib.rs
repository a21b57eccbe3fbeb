//! Common code for keycard clients: session storage, the account API, and
//! the login/registration flows.

/// Talk to the account API.
pub mod api;

/// Durable key/value storage backing the session.
pub mod storage;
pub use storage::{FileStorage, MemoryStorage, Storage};

/// The current session (token and role) and the questions we ask of it.
pub mod session;
pub use session::{Role, Session};

/// Client-side form validation.
pub mod validate;

/// Login and registration flows, as state machines that emit effects.
pub mod flow;

/// Which routes the current session is allowed to see.
pub mod guard;
pub use guard::Route;
