use serde::Deserialize;

mod push;

pub use push::*;

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub name: String,
}

/// The account that pushed. GitHub sends a name/email pair rather than a full user object.
#[derive(Debug, Deserialize)]
pub struct Pusher {
    pub name: String,
}
