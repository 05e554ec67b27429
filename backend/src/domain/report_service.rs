//! Read-only rollups over rent records and tenants.
//!
//! "Overdue" is never stored. A record counts as overdue when it is still
//! pending and its month is before the current one, so every report takes
//! the current period as an input.

use shared::{
    MonthlyReportRow, MonthlySummary, RentStatus, StatusBreakdown, TenantStatistics, YearTotals,
    YearlyReport,
};
use tracing::info;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{BillingPeriod, PageRequest, RentFilter, RentRecord, RentWithTenant, Tenant, TenantFilter};
use crate::storage::{RentRepository, TenantRepository};

const RECENT_ITEMS: u32 = 5;

/// Status of a record as seen at `current`
fn effective_status(record: &RentRecord, current: BillingPeriod) -> RentStatus {
    if record.is_overdue_as_of(current) {
        RentStatus::Overdue
    } else {
        record.status
    }
}

/// Dashboard for one month
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub period: BillingPeriod,
    pub total_tenants: u32,
    pub active_tenants: u32,
    pub total_rent: f64,
    pub pending_rent: f64,
    /// Outstanding from earlier months
    pub overdue_rent: f64,
    pub paid_rent: f64,
    pub recent_tenants: Vec<Tenant>,
    pub recent_rent_records: Vec<RentWithTenant>,
}

#[derive(Clone)]
pub struct ReportService {
    rents: RentRepository,
    tenants: TenantRepository,
}

impl ReportService {
    pub fn new(rents: RentRepository, tenants: TenantRepository) -> Self {
        Self { rents, tenants }
    }

    pub async fn monthly_summary(&self, month: &str, current: BillingPeriod) -> DomainResult<MonthlySummary> {
        let period = BillingPeriod::parse(month)?;
        let records = self.rents.list_by_month(period).await?;

        let mut summary = MonthlySummary {
            month: period.to_string(),
            total_records: records.len() as u32,
            total_rent_amount: 0.0,
            total_light_bill_amount: 0.0,
            total_amount: 0.0,
            paid_amount: 0.0,
            pending_amount: 0.0,
            overdue_amount: 0.0,
            status_breakdown: StatusBreakdown::default(),
        };

        for record in &records {
            summary.total_rent_amount += record.rent_amount();
            summary.total_light_bill_amount += record.light_bill_amount();
            summary.total_amount += record.total_amount();
            match effective_status(record, current) {
                RentStatus::Paid => {
                    summary.paid_amount += record.total_amount();
                    summary.status_breakdown.paid += 1;
                }
                RentStatus::Pending => {
                    summary.pending_amount += record.total_amount();
                    summary.status_breakdown.pending += 1;
                }
                RentStatus::Overdue => {
                    summary.overdue_amount += record.total_amount();
                    summary.status_breakdown.overdue += 1;
                }
            }
        }

        info!("Summary for {}: {} records, total {}", period, summary.total_records, summary.total_amount);
        Ok(summary)
    }

    /// Pending records from months before `current`
    pub async fn overdue(&self, current: BillingPeriod) -> DomainResult<Vec<RentWithTenant>> {
        let records = self.rents.list_overdue(current).await?;
        info!("{} overdue rent records before {}", records.len(), current);
        Ok(records)
    }

    pub async fn yearly_report(&self, year: i32, current: BillingPeriod) -> DomainResult<YearlyReport> {
        if !(1900..=9999).contains(&year) {
            return Err(DomainError::invalid("year", "Year must be a four-digit number"));
        }
        let records = self.rents.list_by_year(year).await?;

        let months = BillingPeriod::months_of_year(year)
            .into_iter()
            .map(|period| {
                let in_month: Vec<&RentRecord> =
                    records.iter().filter(|r| r.period == period).collect();
                let total_amount: f64 = in_month.iter().map(|r| r.total_amount()).sum();
                let paid_amount: f64 = in_month
                    .iter()
                    .filter(|r| r.status == RentStatus::Paid)
                    .map(|r| r.total_amount())
                    .sum();
                MonthlyReportRow {
                    month: period.to_string(),
                    month_name: period.short_month_name(),
                    total_rent: in_month.iter().map(|r| r.rent_amount()).sum(),
                    total_light_bill: in_month.iter().map(|r| r.light_bill_amount()).sum(),
                    total_amount,
                    paid_amount,
                    pending_amount: total_amount - paid_amount,
                    record_count: in_month.len() as u32,
                }
            })
            .collect();

        let mut totals = YearTotals {
            total_records: records.len() as u32,
            ..Default::default()
        };
        for record in &records {
            match effective_status(record, current) {
                RentStatus::Paid => {
                    totals.total_collected += record.total_amount();
                    totals.total_light_bill_collected += record.light_bill_amount();
                    totals.paid_records += 1;
                }
                RentStatus::Pending => {
                    totals.total_pending += record.total_amount();
                    totals.pending_records += 1;
                }
                RentStatus::Overdue => {
                    totals.total_overdue += record.total_amount();
                    totals.overdue_records += 1;
                }
            }
        }

        Ok(YearlyReport { year, months, totals })
    }

    pub async fn tenant_statistics(&self) -> DomainResult<TenantStatistics> {
        let tenants = self.tenants.list_all_tenants().await?;

        let active = tenants.iter().filter(|t| t.is_active).count() as u32;
        let agreements_done = tenants.iter().filter(|t| t.agreement_done).count() as u32;
        Ok(TenantStatistics {
            total: tenants.len() as u32,
            active,
            inactive: tenants.len() as u32 - active,
            total_deposit: tenants.iter().map(|t| t.deposit).sum(),
            total_monthly_rent: tenants.iter().map(|t| t.monthly_rent).sum(),
            agreements_done,
            agreements_pending: tenants.len() as u32 - agreements_done,
        })
    }

    pub async fn dashboard(&self, current: BillingPeriod) -> DomainResult<Dashboard> {
        let tenants = self.tenants.list_all_tenants().await?;
        let month_records = self.rents.list_by_month(current).await?;
        let overdue = self.rents.list_overdue(current).await?;

        let sum_where = |status: RentStatus| -> f64 {
            month_records
                .iter()
                .filter(|r| r.status == status)
                .map(|r| r.total_amount())
                .sum()
        };

        let recent_page = PageRequest::new(Some(1), Some(RECENT_ITEMS));
        let (recent_rent_records, _) = self
            .rents
            .list_rent_records(
                &RentFilter {
                    period: Some(current),
                    ..Default::default()
                },
                recent_page,
            )
            .await?;
        let (recent_tenants, _) = self
            .tenants
            .list_tenants(&TenantFilter::default(), recent_page)
            .await?;

        Ok(Dashboard {
            period: current,
            total_tenants: tenants.len() as u32,
            active_tenants: tenants.iter().filter(|t| t.is_active).count() as u32,
            total_rent: month_records.iter().map(|r| r.total_amount()).sum(),
            pending_rent: sum_where(RentStatus::Pending),
            overdue_rent: overdue.iter().map(|o| o.record.total_amount()).sum(),
            paid_rent: sum_where(RentStatus::Paid),
            recent_tenants,
            recent_rent_records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::rent::CreateRentCommand;
    use crate::domain::tenant_service::test_support::tenant_command;
    use crate::domain::{RentService, TenantService};
    use crate::storage::DbConnection;

    struct Fixture {
        tenants: TenantService,
        rents: RentService,
        reports: ReportService,
    }

    async fn setup_test() -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let tenant_repo = TenantRepository::new(db.clone());
        let rent_repo = RentRepository::new(db);
        Fixture {
            tenants: TenantService::new(tenant_repo.clone()),
            rents: RentService::new(rent_repo.clone(), tenant_repo.clone()),
            reports: ReportService::new(rent_repo, tenant_repo),
        }
    }

    async fn add_rent(fx: &Fixture, tenant_id: &str, month: &str, rent: f64, light: f64) -> RentRecord {
        fx.rents
            .create_rent(CreateRentCommand {
                tenant_id: tenant_id.to_string(),
                month: month.to_string(),
                rent_amount: rent,
                light_bill_amount: Some(light),
                payment_method: None,
                notes: None,
            })
            .await
            .unwrap()
            .record
    }

    fn period(value: &str) -> BillingPeriod {
        BillingPeriod::parse(value).unwrap()
    }

    #[tokio::test]
    async fn test_monthly_summary_derives_overdue() {
        let fx = setup_test().await;
        let asha = fx.tenants.create_tenant(tenant_command("Asha Verma", 1)).await.unwrap();
        let ravi = fx.tenants.create_tenant(tenant_command("Ravi Kumar", 2)).await.unwrap();
        let paid = add_rent(&fx, &asha.id, "2024-03", 8000.0, 500.0).await;
        add_rent(&fx, &ravi.id, "2024-03", 9000.0, 0.0).await;
        fx.rents.mark_paid(&paid.id, None).await.unwrap();

        // Still March: the unpaid record is just pending
        let summary = fx.reports.monthly_summary("2024-03", period("2024-03")).await.unwrap();
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.total_amount, 17500.0);
        assert_eq!(summary.total_light_bill_amount, 500.0);
        assert_eq!(summary.paid_amount, 8500.0);
        assert_eq!(summary.pending_amount, 9000.0);
        assert_eq!(summary.overdue_amount, 0.0);
        assert_eq!(summary.status_breakdown.pending, 1);

        // A month later the same record is overdue
        let summary = fx.reports.monthly_summary("2024-03", period("2024-04")).await.unwrap();
        assert_eq!(summary.pending_amount, 0.0);
        assert_eq!(summary.overdue_amount, 9000.0);
        assert_eq!(summary.status_breakdown.overdue, 1);
        assert_eq!(summary.status_breakdown.paid, 1);

        assert!(fx.reports.monthly_summary("2024-3", period("2024-04")).await.is_err());
    }

    #[tokio::test]
    async fn test_overdue_list_is_strictly_before_current() {
        let fx = setup_test().await;
        let asha = fx.tenants.create_tenant(tenant_command("Asha Verma", 1)).await.unwrap();
        let old = add_rent(&fx, &asha.id, "2024-01", 8000.0, 0.0).await;
        let paid = add_rent(&fx, &asha.id, "2024-02", 8000.0, 0.0).await;
        add_rent(&fx, &asha.id, "2024-03", 8000.0, 0.0).await;
        fx.rents.mark_paid(&paid.id, None).await.unwrap();

        let overdue = fx.reports.overdue(period("2024-03")).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].record.id, old.id);
        assert_eq!(overdue[0].tenant.name, "Asha Verma");
    }

    #[tokio::test]
    async fn test_yearly_report() {
        let fx = setup_test().await;
        let asha = fx.tenants.create_tenant(tenant_command("Asha Verma", 1)).await.unwrap();
        let jan = add_rent(&fx, &asha.id, "2024-01", 8000.0, 300.0).await;
        add_rent(&fx, &asha.id, "2024-02", 8000.0, 200.0).await;
        add_rent(&fx, &asha.id, "2024-03", 8000.0, 0.0).await;
        add_rent(&fx, &asha.id, "2023-12", 7000.0, 0.0).await;
        fx.rents.mark_paid(&jan.id, None).await.unwrap();

        let report = fx.reports.yearly_report(2024, period("2024-03")).await.unwrap();
        assert_eq!(report.months.len(), 12);
        assert_eq!(report.months[0].month_name, "Jan");
        assert_eq!(report.months[0].paid_amount, 8300.0);
        assert_eq!(report.months[0].pending_amount, 0.0);
        assert_eq!(report.months[1].pending_amount, 8200.0);
        assert_eq!(report.months[4].record_count, 0);

        let totals = &report.totals;
        assert_eq!(totals.total_records, 3);
        assert_eq!(totals.total_collected, 8300.0);
        assert_eq!(totals.total_light_bill_collected, 300.0);
        assert_eq!(totals.overdue_records, 1);
        assert_eq!(totals.total_overdue, 8200.0);
        assert_eq!(totals.pending_records, 1);
        assert_eq!(totals.total_pending, 8000.0);

        assert!(fx.reports.yearly_report(24, period("2024-03")).await.is_err());
    }

    #[tokio::test]
    async fn test_tenant_statistics() {
        let fx = setup_test().await;
        let mut with_agreement = tenant_command("Asha Verma", 1);
        with_agreement.agreement_done = true;
        fx.tenants.create_tenant(with_agreement).await.unwrap();
        let ravi = fx.tenants.create_tenant(tenant_command("Ravi Kumar", 2)).await.unwrap();
        fx.tenants.toggle_status(&ravi.id).await.unwrap();

        let stats = fx.reports.tenant_statistics().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.total_deposit, 40000.0);
        assert_eq!(stats.total_monthly_rent, 20000.0);
        assert_eq!(stats.agreements_done, 1);
        assert_eq!(stats.agreements_pending, 1);
    }

    #[tokio::test]
    async fn test_dashboard() {
        let fx = setup_test().await;
        for i in 1..=6 {
            let tenant = fx
                .tenants
                .create_tenant(tenant_command(&format!("Tenant {}", i), i))
                .await
                .unwrap();
            let record = add_rent(&fx, &tenant.id, "2024-03", 1000.0, 0.0).await;
            if i == 1 {
                fx.rents.mark_paid(&record.id, None).await.unwrap();
            }
            if i == 2 {
                add_rent(&fx, &tenant.id, "2024-02", 500.0, 0.0).await;
            }
        }

        let dashboard = fx.reports.dashboard(period("2024-03")).await.unwrap();
        assert_eq!(dashboard.total_tenants, 6);
        assert_eq!(dashboard.active_tenants, 6);
        assert_eq!(dashboard.total_rent, 6000.0);
        assert_eq!(dashboard.paid_rent, 1000.0);
        assert_eq!(dashboard.pending_rent, 5000.0);
        assert_eq!(dashboard.overdue_rent, 500.0);
        assert_eq!(dashboard.recent_tenants.len(), 5);
        assert_eq!(dashboard.recent_tenants[0].name, "Tenant 6");
        assert_eq!(dashboard.recent_rent_records.len(), 5);
        assert!(dashboard
            .recent_rent_records
            .iter()
            .all(|r| r.record.period == period("2024-03")));
    }
}
