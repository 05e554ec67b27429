use chrono::Utc;
use shared::{PaymentMethod, RentStatus};
use tracing::{info, warn};

use crate::domain::commands::rent::{CreateRentCommand, RentListQuery, RentListResult, UpdateRentCommand};
use crate::domain::error::{DomainError, DomainResult, Validator};
use crate::domain::models::{BillingPeriod, PageRequest, RentAmounts, RentFilter, RentRecord, RentWithTenant};
use crate::domain::tenant_service::conflict_or_internal;
use crate::storage::{RentRepository, TenantRepository};

const DUPLICATE_RECORD: &str = "Rent record already exists for this tenant and month";

/// Service for the rent record lifecycle
#[derive(Clone)]
pub struct RentService {
    rents: RentRepository,
    tenants: TenantRepository,
}

impl RentService {
    pub fn new(rents: RentRepository, tenants: TenantRepository) -> Self {
        Self { rents, tenants }
    }

    /// Create a pending record. The total is always computed here; any total
    /// a client may have sent never reaches this point.
    pub async fn create_rent(&self, command: CreateRentCommand) -> DomainResult<RentWithTenant> {
        info!(
            "Creating rent record: tenant={}, month={}",
            command.tenant_id, command.month
        );

        let mut v = Validator::new();
        v.check(!command.tenant_id.trim().is_empty(), "tenant_id", "Tenant is required");
        let period = v.absorb(BillingPeriod::parse(&command.month));
        let amounts = v.absorb(RentAmounts::new(
            command.rent_amount,
            command.light_bill_amount.unwrap_or(0.0),
        ));
        v.finish()?;
        let (period, amounts) = period
            .zip(amounts)
            .ok_or_else(|| DomainError::invalid("month", "Month must be in YYYY-MM format"))?;

        let tenant = match self.tenants.get_tenant(command.tenant_id.trim()).await? {
            Some(tenant) => tenant,
            None => {
                warn!("Rent record requested for unknown tenant {}", command.tenant_id);
                return Err(DomainError::NotFound("Tenant not found".to_string()));
            }
        };

        if self
            .rents
            .find_by_tenant_and_month(&tenant.id, period)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(DUPLICATE_RECORD.to_string()));
        }

        let record = RentRecord::new(
            &tenant.id,
            period,
            amounts,
            command.payment_method.unwrap_or_default(),
            clean_notes(command.notes),
            Utc::now(),
        );

        // Concurrent creates for the same pair are stopped by the UNIQUE constraint
        self.rents
            .store_rent_record(&record)
            .await
            .map_err(|e| conflict_or_internal(e, DUPLICATE_RECORD))?;

        info!(
            "Created rent record {} for {} ({}), total {}",
            record.id,
            tenant.name,
            period,
            record.total_amount()
        );
        Ok(RentWithTenant { record, tenant })
    }

    pub async fn get_rent(&self, rent_id: &str) -> DomainResult<RentWithTenant> {
        match self.rents.get_with_tenant(rent_id).await? {
            Some(found) => Ok(found),
            None => {
                warn!("Rent record not found: {}", rent_id);
                Err(DomainError::NotFound("Rent record not found".to_string()))
            }
        }
    }

    pub async fn list_rent(&self, query: RentListQuery, current: BillingPeriod) -> DomainResult<RentListResult> {
        let mut v = Validator::new();
        let period = match non_empty(query.month.as_deref()) {
            Some(month) => v.absorb(BillingPeriod::parse(month)),
            None => None,
        };
        let status = match non_empty(query.status.as_deref()) {
            None | Some("all") => None,
            Some(raw) => {
                let parsed = RentStatus::parse(raw);
                v.check(
                    parsed.is_some(),
                    "status",
                    "Status must be one of all, pending, paid, overdue",
                );
                parsed
            }
        };
        v.finish()?;

        let filter = RentFilter {
            period,
            status,
            tenant_id: non_empty(query.tenant_id.as_deref()).map(str::to_string),
            overdue_before: Some(current),
        };
        let page = PageRequest::new(query.page, query.limit);
        let (records, total) = self.rents.list_rent_records(&filter, page).await?;

        info!("Found {} rent records (total {})", records.len(), total);
        Ok(RentListResult {
            records,
            total_pages: page.total_pages(total),
            current_page: page.page,
            total,
        })
    }

    /// Change amounts, method or notes; tenant and month stay fixed
    pub async fn update_rent(
        &self,
        rent_id: &str,
        command: UpdateRentCommand,
    ) -> DomainResult<RentWithTenant> {
        info!("Updating rent record: {}", rent_id);

        let RentWithTenant { mut record, tenant } = self.get_rent(rent_id).await?;
        let amounts = RentAmounts::new(command.rent_amount, command.light_bill_amount.unwrap_or(0.0))?;

        let now = Utc::now();
        record.set_amounts(amounts, now);
        if let Some(method) = command.payment_method {
            record.payment_method = method;
        }
        if command.notes.is_some() {
            record.notes = clean_notes(command.notes);
        }

        self.rents.update_rent_record(&record).await?;

        info!("Updated rent record {}, total {}", record.id, record.total_amount());
        Ok(RentWithTenant { record, tenant })
    }

    /// The only way a record becomes paid. Repeat calls keep it paid and
    /// restamp the payment date.
    pub async fn mark_paid(
        &self,
        rent_id: &str,
        payment_method: Option<PaymentMethod>,
    ) -> DomainResult<RentWithTenant> {
        let RentWithTenant { mut record, tenant } = self.get_rent(rent_id).await?;

        record.mark_paid(payment_method, Utc::now());
        self.rents.update_rent_record(&record).await?;

        info!(
            "Marked rent record {} paid by {} via {}",
            record.id, tenant.name, record.payment_method
        );
        Ok(RentWithTenant { record, tenant })
    }

    /// Hard delete
    pub async fn delete_rent(&self, rent_id: &str) -> DomainResult<()> {
        if !self.rents.delete_rent_record(rent_id).await? {
            warn!("Rent record not found for delete: {}", rent_id);
            return Err(DomainError::NotFound("Rent record not found".to_string()));
        }
        info!("Deleted rent record: {}", rent_id);
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
