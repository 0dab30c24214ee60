//! # API REST
//!
//! REST API implementation for suprident.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, multipart upload)
//!
//! Uses `api-shared` for wire DTOs and common utilities; all domain logic
//! lives in `suprident-core`.

#![warn(rust_2018_idioms)]

pub mod handlers;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::dto;
use suprident_core::{AuthService, AuthSession, CoreConfig, Database, SupridentError};
use suprident_files::PhotoStore;

/// Application state shared across REST API handlers.
///
/// The SQLite connection is behind a mutex: request volumes here are a small
/// organisation's, and every operation is a handful of local statements.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub db: Arc<Mutex<Database>>,
    pub photos: Arc<PhotoStore>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::login,
        handlers::auth::session,
        handlers::lists::create_lists,
        handlers::lists::list_lists,
        handlers::lists::get_list,
        handlers::lists::fill_list,
        handlers::catalog::list_materials,
        handlers::catalog::create_material,
        handlers::catalog::update_material_price,
        handlers::catalog::list_clinics,
        handlers::catalog::list_professionals,
        handlers::catalog::professional_history,
        handlers::delivery::confirm,
        handlers::delivery::confirm_clinic,
        handlers::delivery::clinic_confirmations,
        handlers::delivery::upload,
        handlers::dashboard::stats,
        handlers::dashboard::recent_lists,
        handlers::dashboard::monthly_report,
        handlers::dashboard::reports,
        handlers::files::serve,
    ),
    components(schemas(
        dto::HealthRes,
        dto::LoginReq,
        dto::LoginRes,
        dto::SessionRes,
        dto::CreateListsReq,
        dto::CreateListsRes,
        dto::FillListReq,
        dto::FillListItem,
        dto::ListaDto,
        dto::ListaItemDto,
        dto::ItemComMaterialDto,
        dto::ListaDetalhesDto,
        dto::ListaResumoDto,
        dto::MaterialDto,
        dto::CreateMaterialReq,
        dto::UpdatePrecoReq,
        dto::UpdatePrecoRes,
        dto::ClinicaDto,
        dto::ProfissionalDto,
        dto::ConfirmDeliveryReq,
        dto::ConfirmClinicDeliveryReq,
        dto::ConfirmDeliveryRes,
        dto::ConfirmationDto,
        dto::UploadRes,
        dto::DashboardStatsDto,
        dto::PeriodStatsDto,
    ))
)]
struct ApiDoc;

/// Builds the REST router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/session", get(handlers::auth::session))
        .route(
            "/api/lists",
            post(handlers::lists::create_lists).get(handlers::lists::list_lists),
        )
        .route("/api/lists/:id", get(handlers::lists::get_list))
        .route("/api/lists/:id/fill", post(handlers::lists::fill_list))
        .route(
            "/api/materials",
            get(handlers::catalog::list_materials).post(handlers::catalog::create_material),
        )
        .route(
            "/api/materials/:id/price",
            put(handlers::catalog::update_material_price),
        )
        .route("/api/clinics", get(handlers::catalog::list_clinics))
        .route(
            "/api/clinics/:id/confirmations",
            get(handlers::delivery::clinic_confirmations),
        )
        .route("/api/professionals", get(handlers::catalog::list_professionals))
        .route(
            "/api/professionals/:id/history",
            get(handlers::catalog::professional_history),
        )
        .route("/api/delivery/confirm", post(handlers::delivery::confirm))
        .route(
            "/api/delivery/confirm-clinic",
            post(handlers::delivery::confirm_clinic),
        )
        .route("/api/delivery/upload", post(handlers::delivery::upload))
        .route("/api/dashboard/stats", get(handlers::dashboard::stats))
        .route(
            "/api/dashboard/recent-lists",
            get(handlers::dashboard::recent_lists),
        )
        .route("/api/reports/monthly", get(handlers::dashboard::monthly_report))
        .route("/api/reports", get(handlers::dashboard::reports))
        .route("/files/sha256/:hash", get(handlers::files::serve))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Error shape returned by handlers: a status code plus an operator-safe
/// message.
pub type HandlerError = (StatusCode, String);

/// Maps a core error onto a response, logging internals instead of leaking
/// them.
pub(crate) fn error_reply(context: &str, err: SupridentError) -> HandlerError {
    let status = match &err {
        SupridentError::InvalidInput(_) | SupridentError::NothingToDeliver => {
            StatusCode::BAD_REQUEST
        }
        SupridentError::Unauthorized => StatusCode::UNAUTHORIZED,
        SupridentError::Forbidden => StatusCode::FORBIDDEN,
        SupridentError::NotFound(_) => StatusCode::NOT_FOUND,
        SupridentError::PartialDelivery { .. } => StatusCode::CONFLICT,
        SupridentError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("{context}: {err:?}");
        (status, "Internal error".to_owned())
    } else {
        (status, err.to_string())
    }
}

/// Logs an unexpected failure and returns a generic 500.
pub(crate) fn internal(context: &str, err: impl std::fmt::Debug) -> HandlerError {
    tracing::error!("{context}: {err:?}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal error".to_owned(),
    )
}

/// Acquires the database, treating a poisoned lock as an internal error.
pub(crate) fn lock_db(state: &AppState) -> Result<MutexGuard<'_, Database>, HandlerError> {
    state
        .db
        .lock()
        .map_err(|err| internal("database lock", err.to_string()))
}

/// Resolves the caller's session from the `Authorization` header.
///
/// Rejected before any handler logic runs; no mutation can precede this.
pub(crate) fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthSession, HandlerError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = api_shared::auth::bearer_token(header)
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "not authorized".to_owned()))?;

    let db = lock_db(state)?;
    AuthService::new(&db, &state.cfg)
        .session(token)
        .map_err(|err| error_reply("resolve session", err))
}

/// Like [`require_session`], additionally requiring the administrator role.
pub(crate) fn require_admin(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthSession, HandlerError> {
    let session = require_session(state, headers)?;
    if !session.is_admin() {
        return Err((
            StatusCode::FORBIDDEN,
            "administrator privileges required".to_owned(),
        ));
    }
    Ok(session)
}
