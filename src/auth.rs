//! Credential value types: redacting secret wrapper, expiry-aware credential, refresh
//! generation counter.

pub mod credential;
pub mod generation;
pub mod secret;

pub use credential::*;
pub use generation::*;
pub use secret::*;
