use super::{Message, message};
use crate::accounts::{MISSING_FIELDS_MESSAGE, RegistrationError, RegistrationService};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct Signup {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupResponse {
    pub message: String,
    pub token: String,
}

#[utoipa::path(
    post,
    path= "/api/signup",
    request_body = Signup,
    responses (
        (status = 200, description = "Account created, credential issued", body = SignupResponse, content_type = "application/json"),
        (status = 400, description = "Missing fields or unparseable body", body = Message),
        (status = 409, description = "An account with this email already exists", body = Message),
        (status = 500, description = "Internal server error", body = Message),
    ),
    tag= "signup"
)]
#[instrument(skip(registration, payload))]
pub async fn signup(
    registration: Extension<Arc<RegistrationService>>,
    payload: Result<Json<Signup>, JsonRejection>,
) -> Response {
    let Signup { email, password } = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!("Rejected signup body: {rejection}");
            return message(StatusCode::BAD_REQUEST, "Invalid or missing JSON body").into_response();
        }
    };

    let (Some(email), Some(password)) = (email, password) else {
        return message(StatusCode::BAD_REQUEST, MISSING_FIELDS_MESSAGE).into_response();
    };

    // argon2 is CPU bound
    let service = registration.0.clone();
    let result = tokio::task::spawn_blocking(move || service.register(&email, &password)).await;

    match result {
        Ok(Ok(token)) => (
            StatusCode::OK,
            Json(SignupResponse {
                message: "Signup successful".to_string(),
                token,
            }),
        )
            .into_response(),
        Ok(Err(RegistrationError::Validation(reason))) => {
            message(StatusCode::BAD_REQUEST, &reason).into_response()
        }
        Ok(Err(RegistrationError::Conflict)) => {
            warn!("Signup for an existing account");
            message(StatusCode::CONFLICT, "Account already exists").into_response()
        }
        Ok(Err(err)) => {
            error!("Signup failed: {err}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
        Err(err) => {
            error!("Signup task failed: {err}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
