//! Request and response bodies

use console_access::DenyReason;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct DecideRequest {
    /// Session actor payload; absent while signed out
    #[serde(default)]
    pub actor: Option<serde_json::Value>,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecideResponse {
    /// Normalized path that was evaluated
    pub path: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    /// Where the console should navigate (replace) instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    /// Listeners reached in this process
    pub delivered: usize,
}
