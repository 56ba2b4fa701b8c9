use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::{
    bot::message_builder::{MessageBuilder, NotificationMessage},
    webhooks::github::PushEvent,
};

const PUSH_EMOJI: &str = "🔵";
const COMMIT_EMOJI: &str = "📝";

#[derive(Debug, Error)]
pub enum MalformedPayload {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("payload isn't a JSON object")]
    NotAnObject,
}

/// Turns a raw webhook body into the message announcing the push.
///
/// A body without a `commits` key isn't a push event and yields `Ok(None)`.
pub fn format_push_event(body: &[u8]) -> Result<Option<NotificationMessage>, MalformedPayload> {
    let payload: Value = serde_json::from_slice(body)?;

    let is_push = payload
        .as_object()
        .ok_or(MalformedPayload::NotAnObject)?
        .contains_key("commits");
    if !is_push {
        trace!("no `commits` key in payload, not a push event");
        return Ok(None);
    }

    let event: PushEvent = serde_json::from_value(payload)?;
    Ok(Some(handle_push(&event)))
}

fn handle_push(event: &PushEvent) -> NotificationMessage {
    let mut message = MessageBuilder::new();

    message.tag(PUSH_EMOJI);
    message.line(&format!(
        "New push to {} by {}",
        event.repository.name, event.pusher.name
    ));
    message.end_line();

    for commit in &event.commits {
        message.tag(COMMIT_EMOJI);
        message.line(&commit.message);
    }

    message.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUSH: &str = r#"{
        "ref": "refs/heads/main",
        "repository": {"name": "repo1", "full_name": "octo/repo1"},
        "pusher": {"name": "alice", "email": "alice@example.com"},
        "commits": [
            {"id": "1", "message": "fix bug"},
            {"id": "2", "message": "add feature\n\nwith a body"}
        ]
    }"#;

    #[test]
    fn push_message() {
        let message = format_push_event(PUSH.as_bytes())
            .expect("valid payload")
            .expect("push event");

        assert_eq!(
            message.as_str(),
            "🔵 New push to repo1 by alice\n\n📝 fix bug\n📝 add feature\n\nwith a body\n"
        );
    }

    #[test]
    fn formatting_is_deterministic() {
        let first = format_push_event(PUSH.as_bytes()).unwrap();
        let second = format_push_event(PUSH.as_bytes()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn commit_order_is_preserved() {
        let body = r#"{"repository":{"name":"r"},"pusher":{"name":"p"},
            "commits":[{"message":"c"},{"message":"a"},{"message":"b"}]}"#;
        let message = format_push_event(body.as_bytes()).unwrap().unwrap();

        let commits: Vec<&str> = message
            .as_str()
            .lines()
            .filter_map(|l| l.strip_prefix("📝 "))
            .collect();
        assert_eq!(commits, ["c", "a", "b"]);
    }

    #[test]
    fn empty_commit_list_is_still_a_push() {
        let body = r#"{"repository":{"name":"r"},"pusher":{"name":"p"},"commits":[]}"#;
        let message = format_push_event(body.as_bytes()).unwrap().unwrap();

        assert_eq!(message.as_str(), "🔵 New push to r by p\n\n");
    }

    #[test]
    fn no_commits_key_is_not_an_event() {
        assert!(format_push_event(br#"{"other":"data"}"#).unwrap().is_none());
        assert!(format_push_event(br#"{"zen":"Keep it logically awesome."}"#)
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_payloads() {
        let bodies: [&[u8]; 6] = [
            b"not-json",
            b"",
            b"[\"commits\"]",
            br#"{"commits":null,"repository":{"name":"r"},"pusher":{"name":"p"}}"#,
            br#"{"commits":[],"pusher":{"name":"p"}}"#,
            br#"{"commits":[{"id":"1"}],"repository":{"name":"r"},"pusher":{"name":"p"}}"#,
        ];

        for body in bodies {
            assert!(
                format_push_event(body).is_err(),
                "{:?} should be malformed",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn top_level_array_is_not_an_object() {
        assert!(matches!(
            format_push_event(b"[]"),
            Err(MalformedPayload::NotAnObject)
        ));
    }
}
