//! Role-addressed broadcast groups.
//!
//! Two explicit subscriber sets keyed by role - never one connection list
//! filtered per message - so a frame can never leak across roles.

use capture::{Role, ServerMessage};
use tokio::sync::broadcast;

/// Broadcast channels for the `CAPTURE` and `REVIEW` groups.
pub struct RoleRegistry {
    capture: broadcast::Sender<ServerMessage>,
    review: broadcast::Sender<ServerMessage>,
}

impl RoleRegistry {
    /// Create a registry with the given per-group channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capture: broadcast::channel(capacity).0,
            review: broadcast::channel(capacity).0,
        }
    }

    /// Join a role group. The receiver sees every subsequent broadcast to
    /// that role and nothing addressed to the other one.
    pub fn subscribe(&self, role: Role) -> broadcast::Receiver<ServerMessage> {
        self.sender(role).subscribe()
    }

    /// Broadcast to every peer in a role group. Returns the number of
    /// peers that will see the message; zero receivers is not an error.
    pub fn broadcast(&self, role: Role, message: ServerMessage) -> usize {
        self.sender(role).send(message).unwrap_or(0)
    }

    /// Current number of peers in a role group.
    pub fn peer_count(&self, role: Role) -> usize {
        self.sender(role).receiver_count()
    }

    fn sender(&self, role: Role) -> &broadcast::Sender<ServerMessage> {
        match role {
            Role::Capture => &self.capture,
            Role::Review => &self.review,
        }
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new(256)
    }
}
