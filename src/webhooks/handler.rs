use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    bot::{format_push_event, DeliveryError, MalformedPayload, NotificationSender},
    webhooks::{
        github::{verify, VerificationResult, X_GITHUB_SIGNATURE},
        WebhookRequest, WebhookResponse,
    },
};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("No signature")]
    MissingSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error(transparent)]
    MalformedPayload(#[from] MalformedPayload),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl WebhookError {
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingSignature | Self::InvalidSignature => 403,
            Self::MethodNotAllowed => 405,
            // TODO: a payload we can't read is the sender's fault and would be a 400, but
            // existing deployments expect a 500 here
            Self::MalformedPayload(_) => 500,
            Self::Delivery(_) => 500,
        }
    }
}

impl From<WebhookError> for WebhookResponse {
    fn from(err: WebhookError) -> Self {
        WebhookResponse::error(err.status(), &err)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Sent,
    NoCommits,
}

/// Verifies, formats and forwards GitHub push events.
pub struct WebhookHandler {
    secret: Option<String>,
    sender: Arc<dyn NotificationSender>,
}

impl WebhookHandler {
    pub fn new(secret: Option<String>, sender: Arc<dyn NotificationSender>) -> Self {
        Self { secret, sender }
    }

    pub async fn handle(&self, request: &WebhookRequest) -> WebhookResponse {
        info!(
            "received webhook request ({} bytes)",
            request.body().len()
        );

        match self.process(request).await {
            Ok(Outcome::Sent) => WebhookResponse::status(200, "success"),
            Ok(Outcome::NoCommits) => WebhookResponse::status(200, "no commits found"),
            Err(err) => err.into(),
        }
    }

    async fn process(&self, request: &WebhookRequest) -> Result<Outcome, WebhookError> {
        let secret = self.secret.as_deref().map(str::as_bytes);
        match verify(secret, request.body(), request.header(X_GITHUB_SIGNATURE)) {
            VerificationResult::Valid => {}
            VerificationResult::MissingSignature => {
                warn!("no {} header found", X_GITHUB_SIGNATURE);
                return Err(WebhookError::MissingSignature);
            }
            VerificationResult::InvalidSignature => {
                warn!("invalid signature");
                return Err(WebhookError::InvalidSignature);
            }
        }

        let message = match format_push_event(request.body()) {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("payload has no commits, nothing to announce");
                return Ok(Outcome::NoCommits);
            }
            Err(e) => {
                warn!("couldn't parse webhook payload: {}", e);
                return Err(e.into());
            }
        };

        if let Err(e) = self.sender.send(&message).await {
            error!("couldn't deliver push notification: {}", e);
            return Err(e.into());
        }

        Ok(Outcome::Sent)
    }
}
