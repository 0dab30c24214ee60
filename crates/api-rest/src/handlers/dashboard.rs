//! Dashboard statistics and report handlers.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::handlers::lists::current_month;
use crate::{error_reply, internal, lock_db, require_session, AppState, HandlerError};
use api_shared::dto;
use suprident_core::stats::filter_by_created_range;
use suprident_core::StatsService;

const RECENT_LISTS_DEFAULT: usize = 5;
const RECENT_LISTS_MAX: usize = 100;

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Headline dashboard numbers", body = dto::DashboardStatsDto),
        (status = 401, description = "Unauthenticated")
    )
)]
/// Headline numbers for the admin dashboard, relative to the current month.
#[axum::debug_handler]
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<dto::DashboardStatsDto>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let stats = StatsService::new(&db)
        .dashboard_statistics(&current_month())
        .map_err(|err| error_reply("dashboard stats", err))?;

    Ok(Json(stats.into()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecentQuery {
    /// Maximum number of lists to return (default 5, capped at 100).
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/dashboard/recent-lists",
    params(RecentQuery),
    responses(
        (status = 200, description = "Most recent lists with names", body = [dto::ListaResumoDto]),
        (status = 401, description = "Unauthenticated")
    )
)]
/// The most recently created lists, joined with names for display.
#[axum::debug_handler]
pub async fn recent_lists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<dto::ListaResumoDto>>, HandlerError> {
    require_session(&state, &headers)?;

    let limit = query
        .limit
        .unwrap_or(RECENT_LISTS_DEFAULT)
        .min(RECENT_LISTS_MAX);
    let db = lock_db(&state)?;
    let resumos = db
        .recent_listas(limit)
        .map_err(|err| internal("recent lists", err))?;

    Ok(Json(resumos.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MonthlyReportQuery {
    /// Month in `YYYY-MM` form; defaults to the current month.
    pub month: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/reports/monthly",
    params(MonthlyReportQuery),
    responses(
        (status = 200, description = "List statistics for the month or range", body = dto::PeriodStatsDto),
        (status = 401, description = "Unauthenticated")
    )
)]
/// Filled/pending counts and total value for a month or a date range.
#[axum::debug_handler]
pub async fn monthly_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<Json<dto::PeriodStatsDto>, HandlerError> {
    require_session(&state, &headers)?;

    let db = lock_db(&state)?;
    let service = StatsService::new(&db);
    let stats = match (&query.start_date, &query.end_date) {
        (Some(start), Some(end)) => service.statistics_by_range(start, end),
        _ => service.monthly_statistics(query.month.as_deref().unwrap_or(&current_month())),
    }
    .map_err(|err| error_reply("monthly report", err))?;

    Ok(Json(stats.into()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// One of `listas`, `profissionais`, `materiais`, `clinicas`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report dataset wrapped in a data envelope"),
        (status = 400, description = "Unknown report type"),
        (status = 401, description = "Unauthenticated")
    )
)]
/// Report datasets as JSON, optionally bounded by creation date.
///
/// Export formatting (CSV/PDF) is a client concern; this endpoint only
/// serves the data.
#[axum::debug_handler]
pub async fn reports(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    require_session(&state, &headers)?;

    let start = query.start_date.as_deref();
    let end = query.end_date.as_deref();

    let db = lock_db(&state)?;
    let data = match query.kind.as_str() {
        "listas" => {
            let resumos = StatsService::new(&db)
                .listas_report(start, end)
                .map_err(|err| error_reply("report listas", err))?;
            let dtos: Vec<dto::ListaResumoDto> = resumos.into_iter().map(Into::into).collect();
            serde_json::to_value(dtos)
        }
        "profissionais" => {
            let rows = db
                .list_profissionais()
                .map_err(|err| internal("report profissionais", err))?;
            let dtos: Vec<dto::ProfissionalDto> = rows.into_iter().map(Into::into).collect();
            serde_json::to_value(filter_by_created_range(
                dtos,
                |d| d.created_at.as_str(),
                start,
                end,
            ))
        }
        "materiais" => {
            let rows = db
                .list_materiais()
                .map_err(|err| internal("report materiais", err))?;
            let dtos: Vec<dto::MaterialDto> = rows.into_iter().map(Into::into).collect();
            serde_json::to_value(filter_by_created_range(
                dtos,
                |d| d.created_at.as_str(),
                start,
                end,
            ))
        }
        "clinicas" => {
            let rows = db
                .list_clinicas()
                .map_err(|err| internal("report clinicas", err))?;
            let dtos: Vec<dto::ClinicaDto> = rows.into_iter().map(Into::into).collect();
            serde_json::to_value(filter_by_created_range(
                dtos,
                |d| d.created_at.as_str(),
                start,
                end,
            ))
        }
        _ => {
            return Err((StatusCode::BAD_REQUEST, "invalid report type".to_owned()));
        }
    }
    .map_err(|err| internal("serialize report", err))?;

    Ok(Json(json!({ "data": data })))
}
