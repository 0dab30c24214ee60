//! Catalog and directory handlers: materials, clinics, professionals.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use suprident_types::Centavos;

use crate::{error_reply, internal, lock_db, require_admin, require_session, AppState, HandlerError};
use api_shared::dto;
use suprident_core::{ListService, Material};

#[utoipa::path(
    get,
    path = "/api/materials",
    responses(
        (status = 200, description = "The material catalog", body = [dto::MaterialDto]),
        (status = 401, description = "Unauthenticated")
    )
)]
/// The material catalog, ordered by name.
#[axum::debug_handler]
pub async fn list_materials(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<dto::MaterialDto>>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let materiais = db
        .list_materiais()
        .map_err(|err| internal("list materials", err))?;

    Ok(Json(materiais.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/materials",
    request_body = dto::CreateMaterialReq,
    responses(
        (status = 200, description = "Material created", body = dto::MaterialDto),
        (status = 400, description = "Invalid name or price"),
        (status = 403, description = "Not an administrator")
    )
)]
/// Adds a catalog entry.
#[axum::debug_handler]
pub async fn create_material(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::CreateMaterialReq>,
) -> Result<Json<dto::MaterialDto>, HandlerError> {
    require_admin(&state, &headers)?;

    if req.nome.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "nome is required".to_owned()));
    }
    if req.preco < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "preco must be non-negative".to_owned(),
        ));
    }

    let material = Material::new(req.nome.trim().to_owned(), req.tipo, Centavos(req.preco));
    let db = lock_db(&state)?;
    db.insert_material(&material)
        .map_err(|err| internal("create material", err))?;

    Ok(Json(material.into()))
}

#[utoipa::path(
    put,
    path = "/api/materials/{id}/price",
    request_body = dto::UpdatePrecoReq,
    responses(
        (status = 200, description = "Price updated", body = dto::UpdatePrecoRes),
        (status = 400, description = "Negative price"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown material")
    )
)]
/// Updates a material's current price.
///
/// Line items on already-filled lists keep their snapshot price.
#[axum::debug_handler]
pub async fn update_material_price(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<dto::UpdatePrecoReq>,
) -> Result<Json<dto::UpdatePrecoRes>, HandlerError> {
    require_admin(&state, &headers)?;

    if req.preco < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "preco must be non-negative".to_owned(),
        ));
    }

    let db = lock_db(&state)?;
    let updated = db
        .update_material_preco(&id, Centavos(req.preco))
        .map_err(|err| internal("update material price", err))?;
    if !updated {
        return Err((StatusCode::NOT_FOUND, "material not found".to_owned()));
    }

    Ok(Json(dto::UpdatePrecoRes { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/clinics",
    responses(
        (status = 200, description = "All clinics", body = [dto::ClinicaDto]),
        (status = 401, description = "Unauthenticated")
    )
)]
/// All clinics, ordered by union name.
#[axum::debug_handler]
pub async fn list_clinics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<dto::ClinicaDto>>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let clinicas = db
        .list_clinicas()
        .map_err(|err| internal("list clinics", err))?;

    Ok(Json(clinicas.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/professionals",
    responses(
        (status = 200, description = "All professionals", body = [dto::ProfissionalDto]),
        (status = 401, description = "Unauthenticated")
    )
)]
/// All professionals, ordered by name. Access codes are never exposed.
#[axum::debug_handler]
pub async fn list_professionals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<dto::ProfissionalDto>>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let profissionais = db
        .list_profissionais()
        .map_err(|err| internal("list professionals", err))?;

    Ok(Json(profissionais.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/professionals/{id}/history",
    responses(
        (status = 200, description = "The professional's lists, newest month first", body = [dto::ListaDto]),
        (status = 401, description = "Unauthenticated")
    )
)]
/// A professional's list history across months.
#[axum::debug_handler]
pub async fn professional_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<dto::ListaDto>>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let history = ListService::new(&db)
        .history_for_profissional(&id)
        .map_err(|err| error_reply("professional history", err))?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}
