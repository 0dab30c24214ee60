//! Reporting and dashboard statistics.
//!
//! All aggregation happens in SQL; handlers only shape the results. Monetary
//! sums stay in centavos end to end.

use serde::{Deserialize, Serialize};
use suprident_types::Centavos;

use crate::db::{Database, DbError, ListaResumo};
use crate::error::{SupridentError, SupridentResult};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Professionals with a list in the current month
    pub profissionais_ativos: i64,
    pub total_profissionais: i64,
    /// Total quantity of materials requested across all lists
    pub total_materiais: i64,
    /// Sum of all list totals, in centavos
    pub valor_total: Centavos,
    /// Percentage growth of the current month's value over the previous month
    pub crescimento: i64,
}

/// Per-month or per-period list statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub total_profissionais: i64,
    pub total_preenchidas: i64,
    pub total_pendentes: i64,
    pub valor_total: Centavos,
}

/// Service computing dashboard and report aggregates.
pub struct StatsService<'a> {
    db: &'a Database,
}

impl<'a> StatsService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Headline dashboard numbers for `current_month` (`YYYY-MM`).
    pub fn dashboard_statistics(&self, current_month: &str) -> SupridentResult<DashboardStats> {
        let total_profissionais = self.db.count_profissionais()?;
        let profissionais_ativos: i64 = self
            .db
            .conn()
            .query_row(
                "SELECT COUNT(DISTINCT profissional_id) FROM listas WHERE month = ?",
                [current_month],
                |row| row.get(0),
            )
            .map_err(DbError::from)?;

        let total_materiais = self.db.total_quantidade_itens()?;
        let valor_total = self.sum_preco_total(None)?;

        let valor_mes_atual = self.sum_preco_total(Some(current_month))?;
        let crescimento = match previous_month(current_month) {
            Some(prev) => {
                let valor_mes_anterior = self.sum_preco_total(Some(&prev))?;
                growth_percent(valor_mes_atual, valor_mes_anterior)
            }
            None => 0,
        };

        Ok(DashboardStats {
            profissionais_ativos,
            total_profissionais,
            total_materiais,
            valor_total,
            crescimento,
        })
    }

    /// Statistics over one month's lists.
    pub fn monthly_statistics(&self, month: &str) -> SupridentResult<PeriodStats> {
        self.period_stats("WHERE month = ?1", [month])
    }

    /// Statistics over lists created inside a date range.
    pub fn statistics_by_range(&self, start: &str, end: &str) -> SupridentResult<PeriodStats> {
        self.period_stats(
            "WHERE date(created_at) >= date(?1) AND date(created_at) <= date(?2)",
            [start, end],
        )
    }

    /// The full list report: every list joined with names, optionally
    /// bounded by creation date.
    pub fn listas_report(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> SupridentResult<Vec<ListaResumo>> {
        let mut sql = String::from(
            "SELECT l.id, l.descricao, p.nome, c.sindicato, l.status, l.created_at, l.preco_total
             FROM listas l
             JOIN profissionais p ON p.id = l.profissional_id
             JOIN clinicas c ON c.id = l.clinica_id",
        );
        let mut params: Vec<&str> = Vec::new();
        if let (Some(start), Some(end)) = (start, end) {
            sql.push_str(" WHERE date(l.created_at) >= date(?1) AND date(l.created_at) <= date(?2)");
            params.push(start);
            params.push(end);
        }
        sql.push_str(" ORDER BY l.created_at DESC");

        let conn = self.db.conn();
        let mut stmt = conn.prepare(&sql).map_err(DbError::from)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<i64>>(6)?,
                ))
            })
            .map_err(DbError::from)?;

        let mut resumos = Vec::new();
        for row in rows {
            let (id, descricao, profissional, sindicato, status, created_at, valor) =
                row.map_err(DbError::from)?;
            let status = crate::models::ListStatus::parse(&status).ok_or_else(|| {
                SupridentError::Db(DbError::Constraint(format!("Unknown list status: {status}")))
            })?;
            resumos.push(ListaResumo {
                id,
                descricao,
                profissional,
                clinica: sindicato.unwrap_or_else(|| "N/A".to_owned()),
                status,
                created_at,
                valor: Centavos(valor.unwrap_or(0)),
            });
        }
        Ok(resumos)
    }

    fn period_stats<P: rusqlite::Params>(
        &self,
        where_clause: &str,
        params: P,
    ) -> SupridentResult<PeriodStats> {
        let sql = format!(
            "SELECT COUNT(DISTINCT profissional_id),
                    COALESCE(SUM(status = 'filled'), 0),
                    COALESCE(SUM(status = 'not_filled'), 0),
                    COALESCE(SUM(COALESCE(preco_total, 0)), 0)
             FROM listas {where_clause}"
        );

        let (total_profissionais, total_preenchidas, total_pendentes, valor_total) = self
            .db
            .conn()
            .query_row(&sql, params, |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(DbError::from)?;

        Ok(PeriodStats {
            total_profissionais,
            total_preenchidas,
            total_pendentes,
            valor_total: Centavos(valor_total),
        })
    }

    fn sum_preco_total(&self, month: Option<&str>) -> SupridentResult<Centavos> {
        let value: i64 = match month {
            Some(month) => self
                .db
                .conn()
                .query_row(
                    "SELECT COALESCE(SUM(preco_total), 0) FROM listas WHERE month = ?",
                    [month],
                    |row| row.get(0),
                )
                .map_err(DbError::from)?,
            None => self
                .db
                .conn()
                .query_row(
                    "SELECT COALESCE(SUM(preco_total), 0) FROM listas",
                    [],
                    |row| row.get(0),
                )
                .map_err(DbError::from)?,
        };
        Ok(Centavos(value))
    }
}

/// Rounded percentage growth of `current` over `previous`; zero when there
/// is no previous value to compare against.
fn growth_percent(current: Centavos, previous: Centavos) -> i64 {
    if previous.value() <= 0 {
        return 0;
    }
    let delta = (current.value() - previous.value()) as f64;
    (delta / previous.value() as f64 * 100.0).round() as i64
}

/// The `YYYY-MM` month preceding the given one, or `None` for unparseable
/// input.
pub fn previous_month(month: &str) -> Option<String> {
    let (year, month_num) = month.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month_num: u32 = month_num.parse().ok()?;
    if !(1..=12).contains(&month_num) {
        return None;
    }

    Some(if month_num == 1 {
        format!("{:04}-12", year - 1)
    } else {
        format!("{year:04}-{:02}", month_num - 1)
    })
}

/// Keep only items whose creation date falls inside `[start, end]`.
///
/// Dates are compared on the `YYYY-MM-DD` prefix, so any stored timestamp
/// format with a leading ISO date works.
pub fn filter_by_created_range<T>(
    items: Vec<T>,
    created_at: impl Fn(&T) -> &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<T> {
    let (Some(start), Some(end)) = (start, end) else {
        return items;
    };
    items
        .into_iter()
        .filter(|item| {
            let date = &created_at(item)[..10.min(created_at(item).len())];
            date >= start && date <= end
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::{FillItem, ListService};
    use crate::models::{Material, Profissional};

    fn seed() -> Database {
        let db = Database::open_in_memory().unwrap();
        let clinica = db.create_clinica(Some("Sindicato A"), None).unwrap();
        let material = Material::new("Luvas".into(), None, Centavos(1500));
        db.insert_material(&material).unwrap();

        for i in 0..2 {
            let profissional = Profissional::new(format!("Prof {i}"), Some(clinica.id));
            db.insert_profissional(&profissional).unwrap();
        }

        let service = ListService::new(&db);
        service.create_monthly_lists("2026-08").unwrap();
        let lista_id = db.listas_by_month("2026-08").unwrap()[0].id.clone();
        service
            .fill_list(
                &lista_id,
                &[FillItem {
                    material_id: material.id,
                    quantidade: 2,
                    observacoes: None,
                }],
            )
            .unwrap();
        db
    }

    #[test]
    fn monthly_statistics_count_states_and_value() {
        let db = seed();
        let stats = StatsService::new(&db).monthly_statistics("2026-08").unwrap();

        assert_eq!(stats.total_profissionais, 2);
        assert_eq!(stats.total_preenchidas, 1);
        assert_eq!(stats.total_pendentes, 1);
        assert_eq!(stats.valor_total, Centavos(3000));
    }

    #[test]
    fn dashboard_statistics_aggregate() {
        let db = seed();
        let stats = StatsService::new(&db).dashboard_statistics("2026-08").unwrap();

        assert_eq!(stats.total_profissionais, 2);
        assert_eq!(stats.profissionais_ativos, 2);
        assert_eq!(stats.total_materiais, 2);
        assert_eq!(stats.valor_total, Centavos(3000));
        // No previous-month data: growth reads as zero either way.
        assert_eq!(stats.crescimento, 0);
    }

    #[test]
    fn listas_report_joins_and_filters() {
        let db = seed();
        let service = StatsService::new(&db);

        let all = service.listas_report(None, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].clinica, "Sindicato A");

        let none = service
            .listas_report(Some("1999-01-01"), Some("1999-12-31"))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn growth_is_rounded_and_guards_zero() {
        assert_eq!(growth_percent(Centavos(150), Centavos(100)), 50);
        assert_eq!(growth_percent(Centavos(50), Centavos(100)), -50);
        assert_eq!(growth_percent(Centavos(100), Centavos(0)), 0);
        assert_eq!(growth_percent(Centavos(1333), Centavos(1000)), 33);
    }

    #[test]
    fn previous_month_wraps_years() {
        assert_eq!(previous_month("2026-08").as_deref(), Some("2026-07"));
        assert_eq!(previous_month("2026-01").as_deref(), Some("2025-12"));
        assert_eq!(previous_month("garbage"), None);
    }

    #[test]
    fn created_range_filter_compares_date_prefixes() {
        let items = vec![
            ("a", "2026-08-01T10:00:00Z"),
            ("b", "2026-08-15T10:00:00Z"),
            ("c", "2026-09-01T10:00:00Z"),
        ];
        let kept = filter_by_created_range(
            items,
            |item| item.1,
            Some("2026-08-01"),
            Some("2026-08-31"),
        );
        let names: Vec<&str> = kept.iter().map(|i| i.0).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
