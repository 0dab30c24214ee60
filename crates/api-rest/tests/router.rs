//! End-to-end router tests over an in-memory database.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use api_rest::{router, AppState};
use suprident_core::{
    CoreConfig, Database, FillItem, ListService, Material, Profissional, ROLE_ADMIN,
};
use suprident_files::PhotoStore;
use suprident_types::Centavos;

struct Harness {
    app: Router,
    _storage: tempfile::TempDir,
    clinica_id: i64,
    lista_id: String,
}

/// One clinic, one admin (ana/1234), one professional (bia/5678) with a
/// filled list for the current month.
fn harness() -> Harness {
    let storage = tempfile::tempdir().unwrap();
    let db = Database::open_in_memory().unwrap();

    let clinica = db.create_clinica(Some("Sindicato A"), None).unwrap();

    let mut admin = Profissional::new("Ana".into(), Some(clinica.id));
    admin.login = Some("ana".into());
    admin.senha = Some("1234".into());
    admin.role = ROLE_ADMIN.into();
    db.insert_profissional(&admin).unwrap();

    let mut professional = Profissional::new("Bia".into(), Some(clinica.id));
    professional.login = Some("bia".into());
    professional.senha = Some("5678".into());
    db.insert_profissional(&professional).unwrap();

    let material = Material::new("Luvas".into(), None, Centavos(1500));
    db.insert_material(&material).unwrap();

    let month = chrono::Utc::now().format("%Y-%m").to_string();
    ListService::new(&db).create_monthly_lists(&month).unwrap();
    let lista_id = db
        .listas_by_month(&month)
        .unwrap()
        .iter()
        .find(|l| l.profissional_id == professional.id)
        .unwrap()
        .id
        .clone();
    ListService::new(&db)
        .fill_list(
            &lista_id,
            &[FillItem {
                material_id: material.id,
                quantidade: 2,
                observacoes: None,
            }],
        )
        .unwrap();

    let cfg = CoreConfig::new(":memory:".into(), storage.path().to_path_buf(), 12).unwrap();
    let state = AppState {
        cfg: Arc::new(cfg),
        db: Arc::new(Mutex::new(db)),
        photos: Arc::new(PhotoStore::new(storage.path()).unwrap()),
    };

    Harness {
        app: router(state),
        _storage: storage,
        clinica_id: clinica.id,
        lista_id,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn login(app: &Router, login: &str, code: &str) -> String {
    let (status, body) = send(
        app,
        post_json("/api/login", None, json!({ "login": login, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_needs_no_session() {
    let h = harness();
    let (status, body) = send(&h.app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let h = harness();

    let (status, _) = send(&h.app, get("/api/materials", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&h.app, get("/api/materials", Some("bogus"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let h = harness();
    let (status, _) = send(
        &h.app,
        post_json("/api/login", None, json!({ "login": "ana", "code": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_round_trips_role() {
    let h = harness();
    let token = login(&h.app, "ana", "1234").await;

    let (status, body) = send(&h.app, get("/api/session", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], json!("admin"));
}

#[tokio::test]
async fn confirm_requires_admin_role() {
    let h = harness();
    let token = login(&h.app, "bia", "5678").await;

    let (status, _) = send(
        &h.app,
        post_json(
            "/api/delivery/confirm",
            Some(&token),
            json!({ "listaId": h.lista_id, "photoUrl": "/files/sha256/abc" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn clinic_confirmation_flow() {
    let h = harness();
    let token = login(&h.app, "ana", "1234").await;

    let (status, body) = send(
        &h.app,
        post_json(
            "/api/delivery/confirm-clinic",
            Some(&token),
            json!({
                "clinicId": h.clinica_id,
                "photoUrl": "/files/sha256/abc",
                "observations": "entregue na recepção"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listsDelivered"], json!(1));
    assert_eq!(body["confirmation"]["clinicaId"], json!(h.clinica_id));

    // A second confirmation finds nothing left to deliver.
    let (status, _) = send(
        &h.app,
        post_json(
            "/api/delivery/confirm-clinic",
            Some(&token),
            json!({ "clinicId": h.clinica_id, "photoUrl": "/files/sha256/abc" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fill_is_scoped_to_the_owning_professional() {
    let h = harness();
    let admin_token = login(&h.app, "ana", "1234").await;

    // The admin's own list is still not_filled; bia cannot fill it.
    let (_, listas) = send(
        &h.app,
        get("/api/lists", Some(&admin_token)),
    )
    .await;
    let other_lista = listas
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["status"] == json!("not_filled"))
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_owned();

    let bia_token = login(&h.app, "bia", "5678").await;
    let (status, _) = send(
        &h.app,
        post_json(
            &format!("/api/lists/{other_lista}/fill"),
            Some(&bia_token),
            json!({ "items": [] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reports_reject_unknown_type() {
    let h = harness();
    let token = login(&h.app, "ana", "1234").await;

    let (status, _) = send(&h.app, get("/api/reports?type=estoque", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&h.app, get("/api/reports?type=materiais", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn dashboard_stats_reflect_seeded_data() {
    let h = harness();
    let token = login(&h.app, "ana", "1234").await;

    let (status, body) = send(&h.app, get("/api/dashboard/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_profissionais"], json!(2));
    assert_eq!(body["valor_total"], json!(3000));
}
