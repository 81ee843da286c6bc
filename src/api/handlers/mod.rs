pub mod health;
pub use self::health::health;

pub mod session;
pub use self::session::{Authenticated, session};

pub mod signup;
pub use self::signup::signup;

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{"message": "..."}` body shared by the JSON endpoints.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

pub(crate) fn message(status: StatusCode, message: &str) -> (StatusCode, Json<Message>) {
    (
        status,
        Json(Message {
            message: message.to_string(),
        }),
    )
}
