use super::{Message, message};
use crate::{
    gate::bearer_token,
    token::{CredentialClaims, TokenCodec, unix_now},
};
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};
use utoipa::ToSchema;

/// Claims of a request that carried a valid `Authorization: Bearer` credential.
///
/// Handlers under `/api/protected/` take this as an argument; the gate passes
/// those paths through without looking at the credential.
#[derive(Debug, Clone)]
pub struct Authenticated(pub CredentialClaims);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Message>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(codec) = parts.extensions.get::<Arc<TokenCodec>>().cloned() else {
            error!("TokenCodec extension missing");
            return Err(message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"));
        };

        let Some(token) = bearer_token(&parts.headers) else {
            debug!("No bearer credential");
            return Err(message(StatusCode::UNAUTHORIZED, "Unauthorized"));
        };

        codec.verify(token, unix_now()).map(Self).map_err(|failure| {
            warn!(reason = failure.as_str(), "Rejected bearer credential");
            message(StatusCode::UNAUTHORIZED, "Invalid token")
        })
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub email: String,
}

#[utoipa::path(
    get,
    path= "/api/protected/session",
    responses (
        (status = 200, description = "Credential is valid", body = Session),
        (status = 401, description = "Missing or invalid bearer credential", body = Message),
    ),
    tag= "session"
)]
#[instrument(skip(auth), fields(subject = %auth.0.subject_id))]
pub async fn session(auth: Authenticated) -> Json<Session> {
    let Authenticated(claims) = auth;
    Json(Session {
        id: claims.subject_id,
        email: claims.email,
    })
}
