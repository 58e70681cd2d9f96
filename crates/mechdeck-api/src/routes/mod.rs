//! Route modules organized by bounded context.

use axum::Json;
use serde::Serialize;

pub mod health;
pub mod players;
pub mod stories;

/// Success envelope: `success: true` next to the payload's own fields.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always true; failures go through `ApiError`.
    pub success: bool,
    /// Response payload, flattened into the envelope.
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps `body` as a successful JSON response.
    pub fn ok(body: T) -> Json<Self> {
        Json(Self {
            success: true,
            body,
        })
    }
}
