use std::{collections::HashMap, fmt::Display};

use rocket::http::Method;
use serde_json::{json, Value};

pub mod github;

mod handler;
pub use handler::{WebhookError, WebhookHandler};

const CONTENT_TYPE: &str = "Content-Type";

/// A request as seen by the webhook pipeline, independent of how it reached us.
#[derive(Debug)]
pub struct WebhookRequest {
    method: Method,
    // keys are lower-cased
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl WebhookRequest {
    pub fn new<I, K, V>(method: Method, headers: I, body: Vec<u8>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (name, value) in headers {
            // first occurrence wins
            map.entry(name.as_ref().to_ascii_lowercase())
                .or_insert_with(|| value.into());
        }

        Self {
            method,
            headers: map,
            body,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl WebhookResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            headers: vec![(CONTENT_TYPE.to_owned(), "application/json".to_owned())],
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![(CONTENT_TYPE.to_owned(), "text/plain; charset=utf-8".to_owned())],
            body: body.into(),
        }
    }

    /// `{"status": <status_text>}`
    pub fn status(status: u16, status_text: &str) -> Self {
        Self::json(status, &json!({ "status": status_text }))
    }

    /// `{"error": <message>}`
    pub fn error(status: u16, message: impl Display) -> Self {
        Self::json(status, &json!({ "error": message.to_string() }))
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let request = WebhookRequest::new(
            Method::Post,
            [
                ("X-Hub-Signature-256", "sha256=01"),
                ("x-hub-signature-256", "sha256=02"),
            ],
            Vec::new(),
        );

        assert_eq!(request.header("x-HUB-signature-256"), Some("sha256=01"));
        assert_eq!(request.header("Content-Type"), None);
    }

    #[test]
    fn error_body_is_json() {
        let response = WebhookResponse::error(403, "No signature");

        assert_eq!(response.status, 403);
        assert_eq!(response.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body, json!({ "error": "No signature" }));
    }

    #[test]
    fn error_message_is_escaped() {
        let response = WebhookResponse::error(500, "expected `\"` at line 1");
        let body: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(body["error"], "expected `\"` at line 1");
    }
}
