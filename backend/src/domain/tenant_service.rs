use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use shared::KycDocument;
use tracing::{info, warn};

use crate::domain::commands::tenants::{TenantCommand, TenantListQuery, TenantListResult};
use crate::domain::error::{DomainError, DomainResult, Validator};
use crate::domain::models::{ActiveFilter, PageRequest, Tenant, TenantFilter};
use crate::storage::{is_unique_violation, TenantRepository};

static CONTACT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid contact pattern"));
static AADHAAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{12}$").expect("valid aadhaar pattern"));
static PAN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid pan pattern"));

const DUPLICATE_KYC: &str = "A tenant with this Aadhaar or PAN number already exists";

/// Service for registering and maintaining tenants
#[derive(Clone)]
pub struct TenantService {
    tenants: TenantRepository,
}

/// Tenant fields after validation
struct ValidTenantInput {
    name: String,
    address: String,
    contact_number: String,
    aadhaar_number: String,
    pan_number: String,
    accommodation_from_date: NaiveDate,
    agreement_date: Option<NaiveDate>,
}

impl TenantService {
    pub fn new(tenants: TenantRepository) -> Self {
        Self { tenants }
    }

    pub async fn create_tenant(&self, command: TenantCommand) -> DomainResult<Tenant> {
        info!("Creating tenant: name={}", command.name);

        let input = validate(&command, true)?;
        self.ensure_kyc_unique(&input, None).await?;

        let now = Utc::now();
        let tenant = Tenant {
            id: Tenant::generate_id(),
            name: input.name,
            address: input.address,
            contact_number: input.contact_number,
            aadhaar: KycDocument {
                number: input.aadhaar_number,
                file: command.aadhaar_file.unwrap_or_default(),
            },
            pan: KycDocument {
                number: input.pan_number,
                file: command.pan_file.unwrap_or_default(),
            },
            accommodation_from_date: input.accommodation_from_date,
            deposit: command.deposit,
            agreement_done: command.agreement_done,
            agreement_date: input.agreement_date,
            photo: command.photo,
            monthly_rent: command.monthly_rent,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.tenants
            .store_tenant(&tenant)
            .await
            .map_err(|e| conflict_or_internal(e, DUPLICATE_KYC))?;

        info!("Created tenant: {} with ID: {}", tenant.name, tenant.id);
        Ok(tenant)
    }

    pub async fn get_tenant(&self, tenant_id: &str) -> DomainResult<Tenant> {
        match self.tenants.get_tenant(tenant_id).await? {
            Some(tenant) => Ok(tenant),
            None => {
                warn!("Tenant not found: {}", tenant_id);
                Err(DomainError::NotFound("Tenant not found".to_string()))
            }
        }
    }

    pub async fn list_tenants(&self, query: TenantListQuery) -> DomainResult<TenantListResult> {
        let active = ActiveFilter::parse(query.status.as_deref()).ok_or_else(|| {
            DomainError::invalid("status", "Status must be one of all, active, inactive")
        })?;
        let page = PageRequest::new(query.page, query.limit);
        let filter = TenantFilter {
            search: query.search,
            active,
        };

        let (tenants, total) = self.tenants.list_tenants(&filter, page).await?;
        info!("Found {} tenants (total {})", tenants.len(), total);

        Ok(TenantListResult {
            tenants,
            total_pages: page.total_pages(total),
            current_page: page.page,
            total,
        })
    }

    /// Replace a tenant's details. Files not supplied keep their current value.
    pub async fn update_tenant(&self, tenant_id: &str, command: TenantCommand) -> DomainResult<Tenant> {
        info!("Updating tenant: {}", tenant_id);

        let mut tenant = self.get_tenant(tenant_id).await?;
        let input = validate(&command, false)?;
        self.ensure_kyc_unique(&input, Some(tenant_id)).await?;

        tenant.name = input.name;
        tenant.address = input.address;
        tenant.contact_number = input.contact_number;
        tenant.aadhaar.number = input.aadhaar_number;
        if let Some(file) = command.aadhaar_file {
            tenant.aadhaar.file = file;
        }
        tenant.pan.number = input.pan_number;
        if let Some(file) = command.pan_file {
            tenant.pan.file = file;
        }
        if let Some(photo) = command.photo {
            tenant.photo = Some(photo);
        }
        tenant.accommodation_from_date = input.accommodation_from_date;
        tenant.deposit = command.deposit;
        tenant.monthly_rent = command.monthly_rent;
        tenant.agreement_done = command.agreement_done;
        tenant.agreement_date = input.agreement_date;
        tenant.updated_at = Utc::now();

        self.tenants
            .update_tenant(&tenant)
            .await
            .map_err(|e| conflict_or_internal(e, DUPLICATE_KYC))?;

        info!("Updated tenant: {} with ID: {}", tenant.name, tenant.id);
        Ok(tenant)
    }

    pub async fn toggle_status(&self, tenant_id: &str) -> DomainResult<Tenant> {
        let mut tenant = self.get_tenant(tenant_id).await?;
        tenant.toggle_active(Utc::now());
        self.tenants.update_tenant(&tenant).await?;

        info!("Tenant {} is now {}", tenant.id, if tenant.is_active { "active" } else { "inactive" });
        Ok(tenant)
    }

    /// Soft delete: the row and its rent records stay, only the flag changes
    pub async fn delete_tenant(&self, tenant_id: &str) -> DomainResult<()> {
        let mut tenant = self.get_tenant(tenant_id).await?;
        tenant.deactivate(Utc::now());
        self.tenants.update_tenant(&tenant).await?;

        info!("Deactivated tenant: {} with ID: {}", tenant.name, tenant.id);
        Ok(())
    }

    async fn ensure_kyc_unique(
        &self,
        input: &ValidTenantInput,
        exclude_id: Option<&str>,
    ) -> DomainResult<()> {
        let existing = self
            .tenants
            .find_kyc_conflict(&input.aadhaar_number, &input.pan_number, exclude_id)
            .await?;
        if let Some(other) = existing {
            warn!("KYC number already registered to tenant {}", other.id);
            return Err(DomainError::Conflict(DUPLICATE_KYC.to_string()));
        }
        Ok(())
    }
}

/// Storage errors from UNIQUE constraints become conflicts
pub(crate) fn conflict_or_internal(err: anyhow::Error, message: &str) -> DomainError {
    if is_unique_violation(&err) {
        DomainError::Conflict(message.to_string())
    } else {
        DomainError::Internal(err)
    }
}

fn validate(command: &TenantCommand, require_files: bool) -> DomainResult<ValidTenantInput> {
    let name = command.name.trim();
    let address = command.address.trim();
    let contact = command.contact_number.trim();
    let aadhaar = command.aadhaar_number.trim();
    let pan = command.pan_number.trim();

    let mut v = Validator::new();
    v.check(name.chars().count() >= 2, "name", "Name must be at least 2 characters long")
        .check(address.chars().count() >= 5, "address", "Address must be at least 5 characters long")
        .check(
            CONTACT_PATTERN.is_match(contact),
            "contact_number",
            "Contact number must be a valid 10-digit Indian mobile number",
        )
        .check(AADHAAR_PATTERN.is_match(aadhaar), "aadhaar_number", "Aadhaar number must be 12 digits")
        .check(
            PAN_PATTERN.is_match(pan),
            "pan_number",
            "PAN number must be in correct format (e.g., ABCDE1234F)",
        )
        .check(
            command.deposit.is_finite() && command.deposit >= 0.0,
            "deposit",
            "Deposit must be a non-negative number",
        )
        .check(
            command.monthly_rent.is_finite() && command.monthly_rent >= 0.0,
            "monthly_rent",
            "Monthly rent must be a non-negative number",
        );

    if require_files {
        v.check(
            has_value(&command.aadhaar_file),
            "aadhaar_file",
            "Aadhaar card file is required",
        )
        .check(has_value(&command.pan_file), "pan_file", "PAN card file is required");
    }

    let accommodation_from_date = parse_iso_date(&command.accommodation_from_date);
    if accommodation_from_date.is_none() {
        v.push("accommodation_from_date", "Invalid date format");
    }

    // The agreement date only matters once the agreement is done
    let mut agreement_date = None;
    if command.agreement_done {
        if let Some(raw) = command.agreement_date.as_deref().filter(|d| !d.trim().is_empty()) {
            agreement_date = parse_iso_date(raw);
            if agreement_date.is_none() {
                v.push("agreement_date", "Invalid date format");
            }
        }
    }

    v.finish()?;
    let accommodation_from_date = accommodation_from_date
        .ok_or_else(|| DomainError::invalid("accommodation_from_date", "Invalid date format"))?;

    Ok(ValidTenantInput {
        name: name.to_string(),
        address: address.to_string(),
        contact_number: contact.to_string(),
        aadhaar_number: aadhaar.to_string(),
        pan_number: pan.to_string(),
        accommodation_from_date,
        agreement_date,
    })
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp
pub(crate) fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn tenant_command(name: &str, seq: u32) -> TenantCommand {
        TenantCommand {
            name: name.to_string(),
            address: "12 Park Street, Pune".to_string(),
            contact_number: format!("98765{:05}", seq),
            aadhaar_number: format!("{:012}", 200000000000u64 + seq as u64),
            pan_number: format!("PQRST{:04}K", seq),
            accommodation_from_date: "2024-01-01".to_string(),
            deposit: 20000.0,
            monthly_rent: 10000.0,
            agreement_done: false,
            agreement_date: None,
            aadhaar_file: Some("aadhaar_file-1700000000000-1.pdf".to_string()),
            pan_file: Some("pan_file-1700000000000-2.pdf".to_string()),
            photo: None,
        }
    }
}
