//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// Request metadata captured by the transport layer at resolve time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickMeta {
    pub client_ip: String,
    pub user_agent: String,
}

impl ClickMeta {
    pub fn new(client_ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            user_agent: user_agent.into(),
        }
    }
}

/// One recorded visit to a short link.
///
/// Created by [`crate::application::services::LinkService::resolve`] and handed
/// to the click pipeline without waiting for persistence. A batch worker owns
/// the event from then on and discards it after a single flush attempt,
/// whether that attempt succeeds or fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: i64,
    pub timestamp: DateTime<Utc>,
    pub client_ip: String,
    pub user_agent: String,
}

impl ClickEvent {
    /// Creates a click event stamped with the current UTC time.
    pub fn now(link_id: i64, meta: ClickMeta) -> Self {
        Self::at(link_id, Utc::now(), meta)
    }

    /// Creates a click event with an explicit timestamp.
    pub fn at(link_id: i64, timestamp: DateTime<Utc>, meta: ClickMeta) -> Self {
        Self {
            link_id,
            timestamp,
            client_ip: meta.client_ip,
            user_agent: meta.user_agent,
        }
    }
}
