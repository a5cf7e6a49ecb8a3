//! State provider handed to the card on every update

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::States;

/// The user currently viewing the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HassUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_owner: bool,
}

/// Read-only view of the host platform for one evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hass {
    /// Every entity state known to the host
    pub states: Arc<States>,

    /// The current user, when the host exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<HassUser>,
}

impl Hass {
    /// Create a provider without a user
    pub fn new(states: States) -> Self {
        Self {
            states: Arc::new(states),
            user: None,
        }
    }

    /// Attach the current user
    pub fn with_user(mut self, user: HassUser) -> Self {
        self.user = Some(user);
        self
    }
}
