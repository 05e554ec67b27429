//! Monthly rent generation.
//!
//! Creates a pending record for every active tenant that has none for the
//! target month. Each tenant is handled on its own: a failure is recorded in
//! the report and the batch moves on. Nothing is rolled back.

use tracing::{info, warn};

use crate::domain::commands::rent::{CreateRentCommand, GenerationOutcome, GenerationReport};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::BillingPeriod;
use crate::domain::rent_service::RentService;
use crate::storage::TenantRepository;

#[derive(Clone)]
pub struct GenerationService {
    tenants: TenantRepository,
    rent_service: RentService,
}

impl GenerationService {
    pub fn new(tenants: TenantRepository, rent_service: RentService) -> Self {
        Self {
            tenants,
            rent_service,
        }
    }

    pub async fn generate_monthly(&self, month: &str) -> DomainResult<GenerationReport> {
        let period = BillingPeriod::parse(month)?;
        let active = self.tenants.list_active_tenants().await?;
        info!("Generating rent records for {} across {} active tenants", period, active.len());

        let mut outcomes = Vec::with_capacity(active.len());
        for tenant in active {
            let command = CreateRentCommand {
                tenant_id: tenant.id.clone(),
                month: period.to_string(),
                rent_amount: tenant.monthly_rent,
                light_bill_amount: Some(0.0),
                payment_method: None,
                notes: None,
            };

            let outcome = match self.rent_service.create_rent(command).await {
                Ok(created) => GenerationOutcome::Created(created.record),
                Err(DomainError::Conflict(_)) => GenerationOutcome::Skipped {
                    tenant_id: tenant.id,
                },
                Err(e) => {
                    warn!("Failed to generate rent record for {}: {}", tenant.name, e);
                    GenerationOutcome::Failed {
                        tenant_name: tenant.name,
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = GenerationReport {
            month: period.to_string(),
            outcomes,
        };
        info!(
            "Generated {} rent records for {} ({} skipped, {} failed)",
            report.created_count(),
            period,
            report.skipped_count(),
            report.errors().len()
        );
        Ok(report)
    }
}
