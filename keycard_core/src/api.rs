/// Things that can go wrong in the API
pub mod error;
pub use error::Error;

/// The raw response shape shared by every endpoint
pub mod response;

/// Log in with an existing account
pub mod login;

/// Register a new account
pub mod register;

/// HTTP client for the API
pub mod client;
pub use client::Client;
