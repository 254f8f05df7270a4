//! API request/response models.

pub mod users;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic success payload carrying a single human-readable message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
