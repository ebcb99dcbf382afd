//! Domain types for relay credentials and the identifiers that key them.

pub mod credential;
pub mod id;

pub use credential::{Credential, CredentialError, TokenSecret};
pub use id::{UserId, UserIdError};
