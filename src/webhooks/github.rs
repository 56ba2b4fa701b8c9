pub mod events;
pub use events::PushEvent;

mod signing;
pub use signing::{verify, VerificationResult, X_GITHUB_SIGNATURE};

#[cfg(test)]
pub(crate) use signing::sign;
