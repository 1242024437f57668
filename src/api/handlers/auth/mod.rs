//! Signup, sign-in and session handlers.
//!
//! The signup pipeline is validate → duplicate check → hash → persist. The
//! existence check and the insert are not atomic; the store's duplicate-key
//! rejection covers the race and is reported as the same "email taken" field
//! error.
//!
//! Sign-in failures are uniform: unknown emails and wrong passwords produce
//! the identical response and the identical log line, so the API cannot be
//! used to probe which addresses have accounts.

pub mod password;
pub mod session;
pub mod signin;
pub mod signup;
pub mod state;
pub mod store;
pub mod types;
pub mod validate;

pub use state::AuthConfig;
