//! Delivery confirmation and evidence upload handlers.
//!
//! Uploads complete before any confirmation call: the client first posts the
//! photo/signature to `/api/delivery/upload`, receives a durable URL, and
//! only then hits a confirm endpoint with that URL.

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use uuid::Uuid;

use crate::{
    error_reply, internal, lock_db, require_admin, require_session, AppState, HandlerError,
};
use api_shared::dto;
use suprident_core::{
    models::now_rfc3339, ConfirmDeliveryInput, ConfirmationTarget, DeliveryConfirmation,
    DeliveryService,
};
use suprident_files::StorageError;

#[utoipa::path(
    post,
    path = "/api/delivery/confirm",
    request_body = dto::ConfirmDeliveryReq,
    responses(
        (status = 200, description = "Delivery confirmed", body = dto::ConfirmDeliveryRes),
        (status = 400, description = "List is not in filled state"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "Confirmation recorded but lists not advanced"),
        (status = 500, description = "Persistence failure")
    )
)]
/// Confirms delivery of a single `filled` list.
#[axum::debug_handler]
pub async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::ConfirmDeliveryReq>,
) -> Result<Json<dto::ConfirmDeliveryRes>, HandlerError> {
    let session = require_admin(&state, &headers)?;

    let input = ConfirmDeliveryInput {
        target: ConfirmationTarget::Lista(req.lista_id),
        photo_url: req.photo_url,
        signature_url: None,
        observations: req.observations,
        missing_items: Vec::new(),
    };

    let db = lock_db(&state)?;
    let outcome = DeliveryService::new(&db)
        .confirm_delivery(&session, input)
        .map_err(|err| error_reply("confirm delivery", err))?;

    Ok(Json(dto::ConfirmDeliveryRes {
        confirmation: outcome.confirmation.into(),
        lists_delivered: outcome.lists_delivered,
        missing_flagged: outcome.missing_flagged,
    }))
}

#[utoipa::path(
    post,
    path = "/api/delivery/confirm-clinic",
    request_body = dto::ConfirmClinicDeliveryReq,
    responses(
        (status = 200, description = "Delivery confirmed for the clinic's filled lists", body = dto::ConfirmDeliveryRes),
        (status = 400, description = "Clinic has no filled lists"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "Confirmation recorded but lists not advanced"),
        (status = 500, description = "Persistence failure")
    )
)]
/// Confirms delivery of every `filled` list of a clinic, optionally
/// flagging missing line items.
#[axum::debug_handler]
pub async fn confirm_clinic(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::ConfirmClinicDeliveryReq>,
) -> Result<Json<dto::ConfirmDeliveryRes>, HandlerError> {
    let session = require_admin(&state, &headers)?;

    let input = ConfirmDeliveryInput {
        target: ConfirmationTarget::Clinica(req.clinic_id),
        photo_url: req.photo_url,
        signature_url: req.signature_url,
        observations: req.observations,
        missing_items: req.missing_items,
    };

    let db = lock_db(&state)?;
    let outcome = DeliveryService::new(&db)
        .confirm_delivery(&session, input)
        .map_err(|err| error_reply("confirm clinic delivery", err))?;

    Ok(Json(dto::ConfirmDeliveryRes {
        confirmation: outcome.confirmation.into(),
        lists_delivered: outcome.lists_delivered,
        missing_flagged: outcome.missing_flagged,
    }))
}

#[utoipa::path(
    get,
    path = "/api/clinics/{id}/confirmations",
    responses(
        (status = 200, description = "Confirmations recorded against the clinic, newest first", body = [dto::ConfirmationDto]),
        (status = 401, description = "Unauthenticated")
    )
)]
/// The delivery confirmations recorded against a clinic.
#[axum::debug_handler]
pub async fn clinic_confirmations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Vec<dto::ConfirmationDto>>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let confirmations = db
        .confirmations_for_clinica(id)
        .map_err(|err| internal("clinic confirmations", err))?;

    Ok(Json(confirmations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/delivery/upload",
    responses(
        (status = 200, description = "Photo stored", body = dto::UploadRes),
        (status = 400, description = "Missing file/listaId or unsupported media type"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "Storage failure")
    )
)]
/// Stores an evidence photo and returns its durable URL.
///
/// Multipart form with `file` and `listaId` fields. A stub confirmation row
/// is recorded best-effort so an uploaded photo stays discoverable even if
/// the operator abandons the flow before confirming.
#[axum::debug_handler]
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<dto::UploadRes>, HandlerError> {
    require_admin(&state, &headers)?;

    let mut file: Option<(Vec<u8>, String)> = None;
    let mut lista_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| (StatusCode::BAD_REQUEST, "malformed multipart body".to_owned()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_owned();
                let bytes = field.bytes().await.map_err(|_| {
                    (StatusCode::BAD_REQUEST, "unreadable file field".to_owned())
                })?;
                file = Some((bytes.to_vec(), filename));
            }
            Some("listaId") => {
                let value = field.text().await.map_err(|_| {
                    (StatusCode::BAD_REQUEST, "unreadable listaId field".to_owned())
                })?;
                lista_id = Some(value);
            }
            _ => {}
        }
    }

    let (bytes, filename) =
        file.ok_or((StatusCode::BAD_REQUEST, "file is required".to_owned()))?;
    let lista_id =
        lista_id.ok_or((StatusCode::BAD_REQUEST, "listaId is required".to_owned()))?;

    let stored = state.photos.store(&bytes, &filename).map_err(|err| match err {
        StorageError::EmptyUpload | StorageError::UnsupportedMediaType(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        other => internal("store upload", other),
    })?;

    // Best-effort stub: a failure here (e.g. unknown listaId) must not lose
    // the upload, the operator still gets the URL back.
    let stub = DeliveryConfirmation {
        id: Uuid::new_v4().to_string(),
        target: ConfirmationTarget::Lista(lista_id),
        photo_url: stored.url_path.clone(),
        signature_url: None,
        observations: None,
        confirmed_by: None,
        confirmed_at: now_rfc3339(),
        created_at: now_rfc3339(),
    };
    match lock_db(&state) {
        Ok(db) => {
            if let Err(err) = db.insert_confirmation(&stub) {
                tracing::warn!("failed to record upload stub confirmation: {err}");
            }
        }
        Err(_) => tracing::warn!("failed to record upload stub confirmation: database locked"),
    }

    Ok(Json(dto::UploadRes {
        photo_url: stored.url_path,
    }))
}
