//! Messages pushed over waiting-room WebSockets.

use serde::Serialize;

/// Periodic queue-position update.
#[derive(Debug, Clone, Serialize)]
pub struct PositionMessage {
    /// 1-based position in the waiting queue.
    pub position: u64,
    /// The user this position belongs to.
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Terminal message once the user has been admitted.
#[derive(Debug, Clone, Serialize)]
pub struct PromotedMessage {
    /// Always `"PROMOTED"`.
    pub status: &'static str,
    /// The admitted user.
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl PromotedMessage {
    /// Build a promotion message for a user.
    pub fn for_user(user_id: &str) -> Self {
        Self {
            status: "PROMOTED",
            user_id: user_id.to_string(),
        }
    }
}

/// Error pushed before the socket is closed.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    /// Human-readable failure description.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_use_wire_field_names() {
        let position = serde_json::to_string(&PositionMessage {
            position: 12,
            user_id: "u-1".to_string(),
        })
        .unwrap();
        assert_eq!(position, r#"{"position":12,"userId":"u-1"}"#);

        let promoted = serde_json::to_string(&PromotedMessage::for_user("u-1")).unwrap();
        assert_eq!(promoted, r#"{"status":"PROMOTED","userId":"u-1"}"#);
    }
}
