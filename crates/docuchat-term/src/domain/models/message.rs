#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    System,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
pub enum MessageKind {
    #[default]
    Normal,
    Error,
}

/// A single chat entry. Messages are created once and never edited; the
/// session only ever appends them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            role,
            content: content.replace('\t', "  "),
            kind: MessageKind::Normal,
        };
    }

    pub fn user(content: &str) -> Message {
        return Message::new(Role::User, content);
    }

    pub fn system(content: &str) -> Message {
        return Message::new(Role::System, content);
    }

    pub fn error(content: &str) -> Message {
        return Message {
            kind: MessageKind::Error,
            ..Message::system(content)
        };
    }

    pub fn is_error(&self) -> bool {
        return self.kind == MessageKind::Error;
    }
}
