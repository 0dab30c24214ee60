//! Wire DTOs for the REST API.
//!
//! Delivery endpoints use camelCase field names (`listaId`, `photoUrl`) —
//! the contract the operator UI already speaks. Entity DTOs mirror their
//! table columns. Monetary fields are integers in centavos throughout.

use serde::{Deserialize, Serialize};
use suprident_core::{
    Clinica, DashboardStats, DeliveryConfirmation, ItemComMaterial, Lista, ListaDetalhes,
    ListaItem, ListaResumo, Material, PeriodStats, Profissional,
};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub login: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    pub token: String,
    pub professional_id: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionRes {
    pub professional_id: String,
    pub role: String,
}

// ============================================================================
// Lists
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateListsReq {
    /// Month in `YYYY-MM` form; defaults to the current month.
    pub month: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateListsRes {
    pub created: usize,
    pub month: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FillListItem {
    pub material_id: String,
    pub quantidade: u32,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FillListReq {
    pub items: Vec<FillListItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListaDto {
    pub id: String,
    pub profissional_id: String,
    pub clinica_id: i64,
    pub status: String,
    pub month: Option<String>,
    pub descricao: Option<String>,
    pub preco_total: Option<i64>,
    pub delivery_confirmation_id: Option<String>,
    pub created_at: String,
    pub filled_at: Option<String>,
    pub delivered_at: Option<String>,
}

impl From<Lista> for ListaDto {
    fn from(lista: Lista) -> Self {
        Self {
            id: lista.id,
            profissional_id: lista.profissional_id,
            clinica_id: lista.clinica_id,
            status: lista.status.as_str().to_owned(),
            month: lista.month,
            descricao: lista.descricao,
            preco_total: lista.preco_total.map(|c| c.value()),
            delivery_confirmation_id: lista.delivery_confirmation_id,
            created_at: lista.created_at,
            filled_at: lista.filled_at,
            delivered_at: lista.delivered_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListaItemDto {
    pub id: String,
    pub lista_id: String,
    pub material_id: String,
    pub quantidade: u32,
    pub preco: i64,
    pub observacoes: Option<String>,
    pub missing: bool,
    pub missing_reported_by: Option<String>,
    pub missing_reported_at: Option<String>,
}

impl From<ListaItem> for ListaItemDto {
    fn from(item: ListaItem) -> Self {
        Self {
            id: item.id,
            lista_id: item.lista_id,
            material_id: item.material_id,
            quantidade: item.quantidade,
            preco: item.preco.value(),
            observacoes: item.observacoes,
            missing: item.missing,
            missing_reported_by: item.missing_reported_by,
            missing_reported_at: item.missing_reported_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemComMaterialDto {
    pub item: ListaItemDto,
    pub material: MaterialDto,
}

impl From<ItemComMaterial> for ItemComMaterialDto {
    fn from(value: ItemComMaterial) -> Self {
        Self {
            item: value.item.into(),
            material: value.material.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListaDetalhesDto {
    pub lista: ListaDto,
    pub profissional: ProfissionalDto,
    pub clinica: ClinicaDto,
    pub itens: Vec<ItemComMaterialDto>,
}

impl From<ListaDetalhes> for ListaDetalhesDto {
    fn from(detalhes: ListaDetalhes) -> Self {
        Self {
            lista: detalhes.lista.into(),
            profissional: detalhes.profissional.into(),
            clinica: detalhes.clinica.into(),
            itens: detalhes.itens.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListaResumoDto {
    pub id: String,
    pub descricao: Option<String>,
    pub profissional: String,
    pub clinica: String,
    pub status: String,
    pub created_at: String,
    pub valor: i64,
}

impl From<ListaResumo> for ListaResumoDto {
    fn from(resumo: ListaResumo) -> Self {
        Self {
            id: resumo.id,
            descricao: resumo.descricao,
            profissional: resumo.profissional,
            clinica: resumo.clinica,
            status: resumo.status.as_str().to_owned(),
            created_at: resumo.created_at,
            valor: resumo.valor.value(),
        }
    }
}

// ============================================================================
// Catalog & directory
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaterialDto {
    pub id: String,
    pub nome: String,
    pub tipo: Option<String>,
    pub preco: i64,
    pub created_at: String,
}

impl From<Material> for MaterialDto {
    fn from(material: Material) -> Self {
        Self {
            id: material.id,
            nome: material.nome,
            tipo: material.tipo,
            preco: material.preco.value(),
            created_at: material.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMaterialReq {
    pub nome: String,
    pub tipo: Option<String>,
    /// Unit price in centavos.
    pub preco: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePrecoReq {
    /// New unit price in centavos.
    pub preco: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePrecoRes {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClinicaDto {
    pub id: i64,
    pub sindicato: Option<String>,
    pub endereco: Option<String>,
    pub created_at: String,
}

impl From<Clinica> for ClinicaDto {
    fn from(clinica: Clinica) -> Self {
        Self {
            id: clinica.id,
            sindicato: clinica.sindicato,
            endereco: clinica.endereco,
            created_at: clinica.created_at,
        }
    }
}

/// Professional as exposed over the wire. The stored access code never
/// leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfissionalDto {
    pub id: String,
    pub nome: String,
    pub funcao: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub login: Option<String>,
    pub role: String,
    pub id_clinica: Option<i64>,
    pub created_at: String,
}

impl From<Profissional> for ProfissionalDto {
    fn from(profissional: Profissional) -> Self {
        Self {
            id: profissional.id,
            nome: profissional.nome,
            funcao: profissional.funcao,
            email: profissional.email,
            telefone: profissional.telefone,
            login: profissional.login,
            role: profissional.role,
            id_clinica: profissional.id_clinica,
            created_at: profissional.created_at,
        }
    }
}

// ============================================================================
// Delivery
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDeliveryReq {
    pub lista_id: String,
    pub photo_url: String,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmClinicDeliveryReq {
    pub clinic_id: i64,
    pub photo_url: String,
    pub signature_url: Option<String>,
    pub observations: Option<String>,
    #[serde(default)]
    pub missing_items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDeliveryRes {
    pub confirmation: ConfirmationDto,
    pub lists_delivered: usize,
    pub missing_flagged: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationDto {
    pub id: String,
    pub lista_id: Option<String>,
    pub clinica_id: Option<i64>,
    pub photo_url: String,
    pub signature_url: Option<String>,
    pub observations: Option<String>,
    pub confirmed_by: Option<String>,
    pub confirmed_at: String,
}

impl From<DeliveryConfirmation> for ConfirmationDto {
    fn from(confirmation: DeliveryConfirmation) -> Self {
        let (lista_id, clinica_id) = match &confirmation.target {
            suprident_core::ConfirmationTarget::Lista(id) => (Some(id.clone()), None),
            suprident_core::ConfirmationTarget::Clinica(id) => (None, Some(*id)),
        };
        Self {
            id: confirmation.id,
            lista_id,
            clinica_id,
            photo_url: confirmation.photo_url,
            signature_url: confirmation.signature_url,
            observations: confirmation.observations,
            confirmed_by: confirmation.confirmed_by,
            confirmed_at: confirmation.confirmed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRes {
    pub photo_url: String,
}

// ============================================================================
// Dashboard & reports
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsDto {
    pub profissionais_ativos: i64,
    pub total_profissionais: i64,
    pub total_materiais: i64,
    pub valor_total: i64,
    pub crescimento: i64,
}

impl From<DashboardStats> for DashboardStatsDto {
    fn from(stats: DashboardStats) -> Self {
        Self {
            profissionais_ativos: stats.profissionais_ativos,
            total_profissionais: stats.total_profissionais,
            total_materiais: stats.total_materiais,
            valor_total: stats.valor_total.value(),
            crescimento: stats.crescimento,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PeriodStatsDto {
    pub total_profissionais: i64,
    pub total_preenchidas: i64,
    pub total_pendentes: i64,
    pub valor_total: i64,
}

impl From<PeriodStats> for PeriodStatsDto {
    fn from(stats: PeriodStats) -> Self {
        Self {
            total_profissionais: stats.total_profissionais,
            total_preenchidas: stats.total_preenchidas,
            total_pendentes: stats.total_pendentes,
            valor_total: stats.valor_total.value(),
        }
    }
}
