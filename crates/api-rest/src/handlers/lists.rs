//! Request-list handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error_reply, lock_db, require_admin, require_session, AppState, HandlerError};
use api_shared::dto;
use suprident_core::{FillItem, ListService};

/// Current month in `YYYY-MM` form.
pub(crate) fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Month filter in `YYYY-MM` form; defaults to the current month.
    pub month: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/lists",
    request_body = dto::CreateListsReq,
    responses(
        (status = 200, description = "Monthly lists created", body = dto::CreateListsRes),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not an administrator")
    )
)]
/// Bulk-creates the month's `not_filled` lists, one per professional.
#[axum::debug_handler]
pub async fn create_lists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::CreateListsReq>,
) -> Result<Json<dto::CreateListsRes>, HandlerError> {
    require_admin(&state, &headers)?;

    let month = req.month.unwrap_or_else(current_month);
    let db = lock_db(&state)?;
    let created = ListService::new(&db)
        .create_monthly_lists(&month)
        .map_err(|err| error_reply("create monthly lists", err))?;

    Ok(Json(dto::CreateListsRes { created, month }))
}

#[utoipa::path(
    get,
    path = "/api/lists",
    params(ListQuery),
    responses(
        (status = 200, description = "Lists for the month or range", body = [dto::ListaDto]),
        (status = 401, description = "Unauthenticated")
    )
)]
/// Lists by month, or by creation-date range when `startDate`/`endDate` are
/// given.
#[axum::debug_handler]
pub async fn list_lists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<dto::ListaDto>>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let service = ListService::new(&db);
    let listas = match (&query.month, &query.start_date, &query.end_date) {
        (Some(month), _, _) => service.by_month(month),
        (None, Some(start), Some(end)) => service.by_range(start, end),
        _ => service.by_month(&current_month()),
    }
    .map_err(|err| error_reply("list lists", err))?;

    Ok(Json(listas.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/lists/{id}",
    responses(
        (status = 200, description = "List with professional, clinic and items", body = dto::ListaDetalhesDto),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Unknown list")
    )
)]
/// One list joined with its professional, clinic and items.
#[axum::debug_handler]
pub async fn get_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<dto::ListaDetalhesDto>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let detalhes = ListService::new(&db)
        .get_details(&id)
        .map_err(|err| error_reply("get list", err))?;

    Ok(Json(detalhes.into()))
}

#[utoipa::path(
    post,
    path = "/api/lists/{id}/fill",
    request_body = dto::FillListReq,
    responses(
        (status = 200, description = "List filled", body = dto::ListaDto),
        (status = 400, description = "Invalid items or wrong list state"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "List belongs to another professional"),
        (status = 404, description = "Unknown list or material")
    )
)]
/// Submits line items for a `not_filled` list.
///
/// Professionals may only fill their own lists; administrators may fill any.
#[axum::debug_handler]
pub async fn fill_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<dto::FillListReq>,
) -> Result<Json<dto::ListaDto>, HandlerError> {
    let session = require_session(&state, &headers)?;

    let db = lock_db(&state)?;

    let lista = db
        .get_lista(&id)
        .map_err(|err| error_reply("fill list", err.into()))?
        .ok_or((StatusCode::NOT_FOUND, "lista not found".to_owned()))?;
    if !session.is_admin() && lista.profissional_id != session.profissional_id {
        return Err((
            StatusCode::FORBIDDEN,
            "lista belongs to another professional".to_owned(),
        ));
    }

    let items: Vec<FillItem> = req
        .items
        .into_iter()
        .map(|item| FillItem {
            material_id: item.material_id,
            quantidade: item.quantidade,
            observacoes: item.observacoes,
        })
        .collect();

    let filled = ListService::new(&db)
        .fill_list(&id, &items)
        .map_err(|err| error_reply("fill list", err))?;

    Ok(Json(filled.into()))
}
