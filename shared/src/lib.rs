use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment state of a rent record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentStatus {
    Pending,
    Paid,
    /// Allowed by the schema but never assigned automatically
    Overdue,
}

impl RentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentStatus::Pending => "pending",
            RentStatus::Paid => "paid",
            RentStatus::Overdue => "overdue",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RentStatus::Pending),
            "paid" => Some(RentStatus::Paid),
            "overdue" => Some(RentStatus::Overdue),
            _ => None,
        }
    }
}

impl fmt::Display for RentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rent payment was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    BankTransfer,
    Upi,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Cheque => "cheque",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(PaymentMethod::Cash),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "upi" => Some(PaymentMethod::Upi),
            "cheque" => Some(PaymentMethod::Cheque),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identity document number together with its uploaded scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycDocument {
    pub number: String,
    /// Filename under the uploads directory
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kyc {
    pub aadhaar_card: KycDocument,
    pub pan_card: KycDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub is_done: bool,
    pub date: Option<String>, // ISO 8601 date format (YYYY-MM-DD)
}

/// Represents a tenant profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub kyc: Kyc,
    pub accommodation_from_date: String, // ISO 8601 date format (YYYY-MM-DD)
    pub deposit: f64,
    pub agreement: Agreement,
    pub photo: Option<String>,
    pub monthly_rent: f64,
    pub is_active: bool,
    pub created_at: String, // RFC 3339 timestamp
    pub updated_at: String, // RFC 3339 timestamp
}

/// The slice of a tenant embedded in rent listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSummary {
    pub id: String,
    pub name: String,
    pub contact_number: String,
}

/// Body for creating or updating a tenant.
///
/// On update, file references left as `None` keep the stored file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantRequest {
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub aadhaar_number: String,
    pub pan_number: String,
    pub accommodation_from_date: String,
    pub deposit: f64,
    pub monthly_rent: f64,
    #[serde(default)]
    pub agreement_done: bool,
    #[serde(default)]
    pub agreement_date: Option<String>,
    #[serde(default)]
    pub aadhaar_file: Option<String>,
    #[serde(default)]
    pub pan_file: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Response after creating, updating or toggling a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantResponse {
    pub tenant: Tenant,
    pub success_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantListRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Case-insensitive match against name, contact number and address
    pub search: Option<String>,
    /// `all`, `active` or `inactive`
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantListResponse {
    pub tenants: Vec<Tenant>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total: u64,
}

/// Generic acknowledgement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// One rent line item for a tenant and billing month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentRecord {
    pub id: String,
    pub tenant_id: String,
    /// Billing period in YYYY-MM format
    pub month: String,
    pub rent_amount: f64,
    pub light_bill_amount: f64,
    /// Always rent_amount + light_bill_amount
    pub total_amount: f64,
    pub payment_date: Option<String>, // RFC 3339 timestamp
    pub status: RentStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub whatsapp_sent: bool,
    pub whatsapp_sent_date: Option<String>, // RFC 3339 timestamp
    pub created_at: String,
    pub updated_at: String,
}

/// Rent record with its tenant's contact summary, as listed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentListItem {
    #[serde(flatten)]
    pub record: RentRecord,
    pub tenant: TenantSummary,
}

/// Rent record with the full tenant joined in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentRecordDetail {
    #[serde(flatten)]
    pub record: RentRecord,
    pub tenant: Tenant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRentRequest {
    pub tenant_id: String,
    pub month: String,
    pub rent_amount: f64,
    #[serde(default)]
    pub light_bill_amount: Option<f64>,
    /// Ignored; the total is always recomputed server-side
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRentRequest {
    pub rent_amount: f64,
    #[serde(default)]
    pub light_bill_amount: Option<f64>,
    /// Ignored; the total is always recomputed server-side
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkPaidRequest {
    /// Falls back to the method already on the record
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RentListRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub month: Option<String>,
    /// `all` or a rent status
    pub status: Option<String>,
    pub tenant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentListResponse {
    pub rent_records: Vec<RentListItem>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentResponse {
    pub rent_record: RentRecordDetail,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateMonthlyRequest {
    pub month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateMonthlyResponse {
    pub message: String,
    pub generated_count: usize,
    pub generated_records: Vec<RentRecord>,
    pub skipped_count: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub paid: u32,
    pub pending: u32,
    pub overdue: u32,
}

/// Totals for one billing month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: String,
    pub total_records: u32,
    pub total_rent_amount: f64,
    pub total_light_bill_amount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub overdue_amount: f64,
    pub status_breakdown: StatusBreakdown,
}

/// One row of the yearly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReportRow {
    pub month: String,
    pub month_name: String, // e.g. "Mar"
    pub total_rent: f64,
    pub total_light_bill: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    /// total_amount - paid_amount
    pub pending_amount: f64,
    pub record_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearTotals {
    pub total_collected: f64,
    pub total_pending: f64,
    pub total_overdue: f64,
    pub total_light_bill_collected: f64,
    pub total_records: u32,
    pub paid_records: u32,
    pub pending_records: u32,
    pub overdue_records: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyReport {
    pub year: i32,
    pub months: Vec<MonthlyReportRow>,
    pub totals: YearTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantStatistics {
    pub total: u32,
    pub active: u32,
    pub inactive: u32,
    pub total_deposit: f64,
    pub total_monthly_rent: f64,
    pub agreements_done: u32,
    pub agreements_pending: u32,
}

/// Landing-page numbers for the current month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub month: String,
    pub total_tenants: u32,
    pub active_tenants: u32,
    pub total_rent: f64,
    pub pending_rent: f64,
    pub overdue_rent: f64,
    pub paid_rent: f64,
    pub recent_tenants: Vec<Tenant>,
    pub recent_rent_records: Vec<RentListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppStatusResponse {
    pub is_ready: bool,
    pub has_qr: bool,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCodeResponse {
    pub qr_code: String,
}

/// Response after a single message was delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message: String,
    pub sent_to: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkReminderRequest {
    pub month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderDelivery {
    pub tenant_name: String,
    pub phone_number: String,
    pub rent_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderFailure {
    pub tenant_name: String,
    pub phone_number: String,
    pub rent_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkReminderResponse {
    pub total: usize,
    pub sent: Vec<ReminderDelivery>,
    pub failed: Vec<ReminderFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMessageRequest {
    pub tenant_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHistoryEntry {
    pub month: String,
    pub message_type: String,
    pub sent_date: Option<String>,
    pub rent_amount: f64,
    pub light_bill_amount: f64,
    pub total_amount: f64,
}

/// Lifecycle event pushed by the messaging bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransportEvent {
    /// A new pairing code is waiting to be scanned
    Qr { code: String },
    Ready,
    Disconnected {
        #[serde(default)]
        reason: Option<String>,
    },
    AuthFailure {
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
