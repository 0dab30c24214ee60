//! Login and session handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;

use crate::{error_reply, lock_db, require_session, AppState, HandlerError};
use api_shared::dto;
use suprident_core::AuthService;

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = dto::LoginReq,
    responses(
        (status = 200, description = "Session created", body = dto::LoginRes),
        (status = 401, description = "Unknown login or wrong code")
    )
)]
/// Authenticates a professional and mints a bearer token.
///
/// # Errors
/// Returns `401 Unauthorized` for bad credentials, without revealing which
/// part was wrong.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<dto::LoginReq>,
) -> Result<Json<dto::LoginRes>, HandlerError> {
    let db = lock_db(&state)?;
    let outcome = AuthService::new(&db, &state.cfg)
        .login(&req.login, &req.code)
        .map_err(|err| error_reply("login", err))?;

    Ok(Json(dto::LoginRes {
        token: outcome.token,
        professional_id: outcome.profissional_id,
        role: outcome.role,
    }))
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session", body = dto::SessionRes),
        (status = 401, description = "Missing or expired session")
    )
)]
/// Returns the identity behind the presented bearer token.
#[axum::debug_handler]
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<dto::SessionRes>, HandlerError> {
    let session = require_session(&state, &headers)?;
    Ok(Json(dto::SessionRes {
        professional_id: session.profissional_id,
        role: session.role,
    }))
}
