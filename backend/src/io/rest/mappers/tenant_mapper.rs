//! backend/src/io/rest/mappers/tenant_mapper.rs

use crate::domain::commands::tenants::{TenantCommand, TenantListQuery, TenantListResult};
use crate::domain::models::Tenant as DomainTenant;
use shared::{
    Agreement, Kyc, Tenant as SharedTenant, TenantListRequest, TenantListResponse, TenantRequest,
    TenantResponse, TenantSummary,
};

/// Mapper between shared tenant DTOs and the domain tenant model.
pub struct TenantMapper;

impl TenantMapper {
    pub fn to_dto(domain: DomainTenant) -> SharedTenant {
        SharedTenant {
            id: domain.id,
            name: domain.name,
            address: domain.address,
            contact_number: domain.contact_number,
            kyc: Kyc {
                aadhaar_card: domain.aadhaar,
                pan_card: domain.pan,
            },
            accommodation_from_date: domain.accommodation_from_date.format("%Y-%m-%d").to_string(),
            deposit: domain.deposit,
            agreement: Agreement {
                is_done: domain.agreement_done,
                date: domain.agreement_date.map(|d| d.format("%Y-%m-%d").to_string()),
            },
            photo: domain.photo,
            monthly_rent: domain.monthly_rent,
            is_active: domain.is_active,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_summary_dto(domain: &DomainTenant) -> TenantSummary {
        TenantSummary {
            id: domain.id.clone(),
            name: domain.name.clone(),
            contact_number: domain.contact_number.clone(),
        }
    }

    pub fn to_command(request: TenantRequest) -> TenantCommand {
        TenantCommand {
            name: request.name,
            address: request.address,
            contact_number: request.contact_number,
            aadhaar_number: request.aadhaar_number,
            pan_number: request.pan_number,
            accommodation_from_date: request.accommodation_from_date,
            deposit: request.deposit,
            monthly_rent: request.monthly_rent,
            agreement_done: request.agreement_done,
            agreement_date: request.agreement_date,
            aadhaar_file: request.aadhaar_file,
            pan_file: request.pan_file,
            photo: request.photo,
        }
    }

    pub fn to_list_query(request: TenantListRequest) -> TenantListQuery {
        TenantListQuery {
            page: request.page,
            limit: request.limit,
            search: request.search,
            status: request.status,
        }
    }

    pub fn to_list_dto(result: TenantListResult) -> TenantListResponse {
        TenantListResponse {
            tenants: result.tenants.into_iter().map(Self::to_dto).collect(),
            total_pages: result.total_pages,
            current_page: result.current_page,
            total: result.total,
        }
    }

    pub fn to_response_dto(domain: DomainTenant, message: &str) -> TenantResponse {
        TenantResponse {
            tenant: Self::to_dto(domain),
            success_message: message.to_string(),
        }
    }
}
