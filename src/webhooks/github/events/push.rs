use serde::Deserialize;

use crate::webhooks::github::events::{Pusher, Repository};

#[derive(Debug, Deserialize)]
pub struct PushEvent {
    pub repository: Repository,
    pub pusher: Pusher,
    pub commits: Vec<Commit>,
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub message: String,
}
