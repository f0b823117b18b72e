//! Wire shapes for the capture <-> hub <-> review channel.
//!
//! Messages travel as internally-tagged JSON text frames. Delivery is
//! at-least-once and fire-and-forget: no acknowledgments, no ordering
//! guarantee across distinct deliveries. Batch order is preserved within a
//! single `NewPosts` payload.

use serde::{Deserialize, Serialize};

use crate::types::PostRecord;

/// Logical role a peer declares when it connects to the hub.
///
/// The hub addresses broadcasts by role, never to the whole connection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Capture,
    Review,
}

/// Frames a peer sends to the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Declare a role; must be the first frame on a connection.
    Register { role: Role },

    /// A scraped batch from a capture peer, in document order.
    ScrapedBatch { posts: Vec<PostRecord> },

    /// Review decision: delete the identified post.
    DecideDelete { id: String },

    /// Review decision: keep the identified post.
    DecideKeep { id: String },

    /// Purge all pending records and clear review UIs.
    Reset,
}

/// Frames the hub sends to a peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// One-shot, connection-scoped reachable address, pushed to a capture
    /// peer on registration.
    Discovery { address: String },

    /// Records for the review queue (registration backlog or fresh ingest).
    NewPosts { posts: Vec<PostRecord> },

    /// The identified post should be removed from the live page.
    DeleteCommand { id: String },

    /// Clear the local review queue.
    ResetUi,
}

/// Instructions accepted at the content-script boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlCommand {
    Start,
    Stop,
    Delete { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_carry_screaming_snake_tags() {
        let frame = serde_json::to_value(&ClientMessage::Register { role: Role::Capture }).unwrap();
        assert_eq!(frame["type"], "REGISTER");
        assert_eq!(frame["role"], "CAPTURE");

        let frame = serde_json::to_value(&ServerMessage::DeleteCommand { id: "123".into() }).unwrap();
        assert_eq!(frame["type"], "DELETE_COMMAND");
        assert_eq!(frame["id"], "123");
    }

    #[test]
    fn control_commands_use_lowercase_tags() {
        let cmd: ControlCommand = serde_json::from_str(r#"{"type":"delete","id":"9"}"#).unwrap();
        assert_eq!(cmd, ControlCommand::Delete { id: "9".into() });

        let cmd: ControlCommand = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        assert_eq!(cmd, ControlCommand::Start);
    }
}
