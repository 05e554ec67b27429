//! backend/src/io/rest/mappers/rent_mapper.rs

use super::tenant_mapper::TenantMapper;
use crate::domain::commands::notifications::{BulkReminderReport, Delivery, HistoryEntry, ReminderOutcome};
use crate::domain::commands::rent::{
    CreateRentCommand, GenerationReport, RentListQuery, RentListResult, UpdateRentCommand,
};
use crate::domain::models::{RentRecord as DomainRentRecord, RentWithTenant};
use crate::domain::Dashboard;
use shared::{
    BulkReminderResponse, CreateRentRequest, DashboardOverview, GenerateMonthlyResponse,
    MessageHistoryEntry, RentListItem, RentListRequest, RentListResponse,
    RentRecord as SharedRentRecord, RentRecordDetail, RentResponse, ReminderDelivery,
    ReminderFailure, SendMessageResponse, UpdateRentRequest,
};

/// Mapper between shared rent DTOs and domain rent models.
pub struct RentMapper;

impl RentMapper {
    pub fn to_dto(domain: DomainRentRecord) -> SharedRentRecord {
        SharedRentRecord {
            month: domain.period.to_string(),
            rent_amount: domain.rent_amount(),
            light_bill_amount: domain.light_bill_amount(),
            total_amount: domain.total_amount(),
            payment_date: domain.payment_date.map(|d| d.to_rfc3339()),
            whatsapp_sent_date: domain.whatsapp_sent_date.map(|d| d.to_rfc3339()),
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
            id: domain.id,
            tenant_id: domain.tenant_id,
            status: domain.status,
            payment_method: domain.payment_method,
            notes: domain.notes,
            whatsapp_sent: domain.whatsapp_sent,
        }
    }

    pub fn to_list_item_dto(joined: RentWithTenant) -> RentListItem {
        RentListItem {
            tenant: TenantMapper::to_summary_dto(&joined.tenant),
            record: Self::to_dto(joined.record),
        }
    }

    pub fn to_detail_dto(joined: RentWithTenant) -> RentRecordDetail {
        RentRecordDetail {
            record: Self::to_dto(joined.record),
            tenant: TenantMapper::to_dto(joined.tenant),
        }
    }

    pub fn to_response_dto(joined: RentWithTenant, message: &str) -> RentResponse {
        RentResponse {
            rent_record: Self::to_detail_dto(joined),
            success_message: message.to_string(),
        }
    }

    /// The client may send a total; it is ignored and recomputed.
    pub fn to_create_command(request: CreateRentRequest) -> CreateRentCommand {
        CreateRentCommand {
            tenant_id: request.tenant_id,
            month: request.month,
            rent_amount: request.rent_amount,
            light_bill_amount: request.light_bill_amount,
            payment_method: request.payment_method,
            notes: request.notes,
        }
    }

    pub fn to_update_command(request: UpdateRentRequest) -> UpdateRentCommand {
        UpdateRentCommand {
            rent_amount: request.rent_amount,
            light_bill_amount: request.light_bill_amount,
            payment_method: request.payment_method,
            notes: request.notes,
        }
    }

    pub fn to_list_query(request: RentListRequest) -> RentListQuery {
        RentListQuery {
            page: request.page,
            limit: request.limit,
            month: request.month,
            status: request.status,
            tenant_id: request.tenant,
        }
    }

    pub fn to_list_dto(result: RentListResult) -> RentListResponse {
        RentListResponse {
            rent_records: result.records.into_iter().map(Self::to_list_item_dto).collect(),
            total_pages: result.total_pages,
            current_page: result.current_page,
            total: result.total,
        }
    }

    pub fn to_generation_dto(report: GenerationReport) -> GenerateMonthlyResponse {
        let generated_records: Vec<SharedRentRecord> =
            report.created().cloned().map(Self::to_dto).collect();
        GenerateMonthlyResponse {
            message: format!(
                "Generated {} rent records for {}",
                generated_records.len(),
                report.month
            ),
            generated_count: generated_records.len(),
            generated_records,
            skipped_count: report.skipped_count(),
            errors: report.errors(),
        }
    }

    pub fn to_dashboard_dto(dashboard: Dashboard) -> DashboardOverview {
        DashboardOverview {
            month: dashboard.period.to_string(),
            total_tenants: dashboard.total_tenants,
            active_tenants: dashboard.active_tenants,
            total_rent: dashboard.total_rent,
            pending_rent: dashboard.pending_rent,
            overdue_rent: dashboard.overdue_rent,
            paid_rent: dashboard.paid_rent,
            recent_tenants: dashboard
                .recent_tenants
                .into_iter()
                .map(TenantMapper::to_dto)
                .collect(),
            recent_rent_records: dashboard
                .recent_rent_records
                .into_iter()
                .map(Self::to_list_item_dto)
                .collect(),
        }
    }
}

/// Mapper for WhatsApp send results.
pub struct MessageMapper;

impl MessageMapper {
    pub fn to_send_dto(delivery: Delivery, message: &str) -> SendMessageResponse {
        SendMessageResponse {
            message: message.to_string(),
            sent_to: delivery.tenant_name,
            phone_number: delivery.phone_number,
        }
    }

    pub fn to_bulk_dto(report: BulkReminderReport) -> BulkReminderResponse {
        let total = report.total();
        let mut sent = Vec::new();
        let mut failed = Vec::new();
        for outcome in report.outcomes {
            match outcome {
                ReminderOutcome::Sent { rent_id, recipient } => sent.push(ReminderDelivery {
                    tenant_name: recipient.tenant_name,
                    phone_number: recipient.phone_number,
                    rent_id,
                }),
                ReminderOutcome::Failed {
                    rent_id,
                    recipient,
                    error,
                } => failed.push(ReminderFailure {
                    tenant_name: recipient.tenant_name,
                    phone_number: recipient.phone_number,
                    rent_id,
                    error,
                }),
            }
        }
        BulkReminderResponse { total, sent, failed }
    }

    pub fn to_history_dto(entry: HistoryEntry) -> MessageHistoryEntry {
        MessageHistoryEntry {
            month: entry.record.period.to_string(),
            message_type: entry.message_type.to_string(),
            sent_date: entry.record.whatsapp_sent_date.map(|d| d.to_rfc3339()),
            rent_amount: entry.record.rent_amount(),
            light_bill_amount: entry.record.light_bill_amount(),
            total_amount: entry.record.total_amount(),
        }
    }
}
