//! Authentication module — credential hashing, app-scoped tokens and the
//! orchestrating engine

pub mod credentials;
pub mod service;
pub mod token;
pub mod types;

pub use credentials::CredentialVerifier;
pub use service::Auth;
pub use token::TokenCodec;
pub use types::{App, TokenClaims, User, EMPTY_APP_ID};
