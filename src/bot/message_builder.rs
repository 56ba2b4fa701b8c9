use std::fmt::{self, Display};

/// Plain text ready to be posted to a chat. Built once, sent at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage(String);

impl NotificationMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default)]
pub struct MessageBuilder {
    plain: String,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn build(self) -> NotificationMessage {
        NotificationMessage(self.plain)
    }

    /// Starts a new item with an emoji marker.
    pub fn tag(&mut self, emoji: &str) {
        self.plain.push_str(emoji);
        self.plain.push(' ');
    }

    pub fn text(&mut self, text: &str) {
        self.plain.push_str(text);
    }

    pub fn line(&mut self, text: &str) {
        self.text(text);
        self.end_line();
    }

    pub fn end_line(&mut self) {
        self.plain.push('\n');
    }
}
