//! Stored-evidence serving handler.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::{internal, require_session, AppState, HandlerError};
use suprident_files::StorageError;

#[utoipa::path(
    get,
    path = "/files/sha256/{hash}",
    responses(
        (status = 200, description = "The stored file bytes"),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "No file under this hash")
    )
)]
/// Serves a stored evidence file by content hash.
#[axum::debug_handler]
pub async fn serve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(hash): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    require_session(&state, &headers)?;

    let bytes = state.photos.load(&hash).map_err(|err| match err {
        StorageError::InvalidHash(_) | StorageError::NotFound(_) => {
            (StatusCode::NOT_FOUND, "file not found".to_owned())
        }
        other => internal("serve file", other),
    })?;

    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
