use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::bot::{DeliveryError, NotificationMessage, NotificationSender};

/// Records every message instead of sending it.
#[derive(Default)]
pub(crate) struct RecordingSender {
    sent: Mutex<Vec<String>>,
}

impl RecordingSender {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[rocket::async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message.as_str().to_owned());
        Ok(())
    }
}

/// Fails every delivery as if the backend never answered.
pub(crate) struct FailingSender;

#[rocket::async_trait]
impl NotificationSender for FailingSender {
    async fn send(&self, _message: &NotificationMessage) -> Result<(), DeliveryError> {
        Err(DeliveryError::Timeout(Duration::from_secs(5)))
    }
}
