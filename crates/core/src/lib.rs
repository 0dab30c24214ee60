//! # Suprident Core
//!
//! Core business logic for the materials-request and delivery-tracking
//! system.
//!
//! This crate contains the domain operations and their persistence:
//! - Monthly request-list lifecycle (`not_filled -> filled -> delivered`)
//! - The pricing aggregator backing the material-list form
//! - The delivery-confirmation workflow with its partial-failure semantics
//! - Catalog, clinic, professional and session storage over SQLite
//! - Dashboard and report aggregation
//!
//! **No API concerns**: HTTP servers, wire DTOs and multipart handling
//! belong in `api-rest` and `api-shared`.

pub mod auth;
pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod lists;
pub mod models;
pub mod pricing;
pub mod stats;

pub use auth::{AuthService, LoginOutcome};
pub use config::CoreConfig;
pub use db::{Database, DbError, ListaResumo};
pub use delivery::{ConfirmDeliveryInput, DeliveryOutcome, DeliveryService};
pub use error::{SupridentError, SupridentResult};
pub use lists::{FillItem, ListService};
pub use models::{
    AuthSession, Clinica, ConfirmationTarget, DeliveryConfirmation, ItemComMaterial, ListStatus,
    Lista, ListaDetalhes, ListaItem, Material, Profissional, Session, ROLE_ADMIN,
    ROLE_PROFESSIONAL,
};
pub use pricing::{compute_total, LineDraft, PriceAggregator};
pub use stats::{DashboardStats, PeriodStats, StatsService};
