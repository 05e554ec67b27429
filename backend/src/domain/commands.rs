//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod tenants {
    use crate::domain::models::Tenant;

    /// Input for registering or editing a tenant. File fields hold stored
    /// upload names; `None` on edit keeps the current file.
    #[derive(Debug, Clone, Default)]
    pub struct TenantCommand {
        pub name: String,
        pub address: String,
        pub contact_number: String,
        pub aadhaar_number: String,
        pub pan_number: String,
        pub accommodation_from_date: String,
        pub deposit: f64,
        pub monthly_rent: f64,
        pub agreement_done: bool,
        pub agreement_date: Option<String>,
        pub aadhaar_file: Option<String>,
        pub pan_file: Option<String>,
        pub photo: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct TenantListQuery {
        pub page: Option<u32>,
        pub limit: Option<u32>,
        pub search: Option<String>,
        pub status: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct TenantListResult {
        pub tenants: Vec<Tenant>,
        pub total_pages: u32,
        pub current_page: u32,
        pub total: u64,
    }
}

pub mod rent {
    use crate::domain::models::{RentRecord, RentWithTenant};
    use shared::PaymentMethod;

    #[derive(Debug, Clone)]
    pub struct CreateRentCommand {
        pub tenant_id: String,
        pub month: String,
        pub rent_amount: f64,
        pub light_bill_amount: Option<f64>,
        pub payment_method: Option<PaymentMethod>,
        pub notes: Option<String>,
    }

    /// Tenant and month of a record never change
    #[derive(Debug, Clone)]
    pub struct UpdateRentCommand {
        pub rent_amount: f64,
        pub light_bill_amount: Option<f64>,
        pub payment_method: Option<PaymentMethod>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct RentListQuery {
        pub page: Option<u32>,
        pub limit: Option<u32>,
        pub month: Option<String>,
        pub status: Option<String>,
        pub tenant_id: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct RentListResult {
        pub records: Vec<RentWithTenant>,
        pub total_pages: u32,
        pub current_page: u32,
        pub total: u64,
    }

    /// What happened to one tenant during monthly generation
    #[derive(Debug, Clone)]
    pub enum GenerationOutcome {
        Created(RentRecord),
        /// A record for that month already existed
        Skipped { tenant_id: String },
        Failed { tenant_name: String, error: String },
    }

    #[derive(Debug, Clone)]
    pub struct GenerationReport {
        pub month: String,
        pub outcomes: Vec<GenerationOutcome>,
    }

    impl GenerationReport {
        pub fn created(&self) -> impl Iterator<Item = &RentRecord> {
            self.outcomes.iter().filter_map(|o| match o {
                GenerationOutcome::Created(record) => Some(record),
                _ => None,
            })
        }

        pub fn created_count(&self) -> usize {
            self.created().count()
        }

        pub fn skipped_count(&self) -> usize {
            self.outcomes
                .iter()
                .filter(|o| matches!(o, GenerationOutcome::Skipped { .. }))
                .count()
        }

        /// Per-tenant failure messages
        pub fn errors(&self) -> Vec<String> {
            self.outcomes
                .iter()
                .filter_map(|o| match o {
                    GenerationOutcome::Failed { tenant_name, error } => Some(format!(
                        "Failed to generate rent record for {}: {}",
                        tenant_name, error
                    )),
                    _ => None,
                })
                .collect()
        }
    }
}

pub mod notifications {
    use crate::domain::models::RentRecord;

    /// Who a single message went to
    #[derive(Debug, Clone, PartialEq)]
    pub struct Delivery {
        pub tenant_name: String,
        pub phone_number: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum ReminderOutcome {
        Sent {
            rent_id: String,
            recipient: Delivery,
        },
        Failed {
            rent_id: String,
            recipient: Delivery,
            error: String,
        },
    }

    #[derive(Debug, Clone, Default)]
    pub struct BulkReminderReport {
        pub outcomes: Vec<ReminderOutcome>,
    }

    impl BulkReminderReport {
        pub fn total(&self) -> usize {
            self.outcomes.len()
        }

        pub fn sent_count(&self) -> usize {
            self.outcomes
                .iter()
                .filter(|o| matches!(o, ReminderOutcome::Sent { .. }))
                .count()
        }
    }

    /// A record that had a message sent, as shown in tenant history
    #[derive(Debug, Clone)]
    pub struct HistoryEntry {
        pub record: RentRecord,
        pub message_type: &'static str,
    }
}

#[cfg(test)]
mod tests {
    use super::notifications::*;
    use super::rent::*;

    #[test]
    fn test_generation_report_counts() {
        let report = GenerationReport {
            month: "2024-03".to_string(),
            outcomes: vec![
                GenerationOutcome::Skipped {
                    tenant_id: "t1".to_string(),
                },
                GenerationOutcome::Failed {
                    tenant_name: "Ravi".to_string(),
                    error: "Rent amount must be a non-negative number".to_string(),
                },
            ],
        };
        assert_eq!(report.created_count(), 0);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(
            report.errors(),
            vec!["Failed to generate rent record for Ravi: Rent amount must be a non-negative number"]
        );
    }

    #[test]
    fn test_bulk_report_counts() {
        let recipient = Delivery {
            tenant_name: "Asha".to_string(),
            phone_number: "9876500001".to_string(),
        };
        let report = BulkReminderReport {
            outcomes: vec![
                ReminderOutcome::Sent {
                    rent_id: "r1".to_string(),
                    recipient: recipient.clone(),
                },
                ReminderOutcome::Failed {
                    rent_id: "r2".to_string(),
                    recipient,
                    error: "timeout".to_string(),
                },
            ],
        };
        assert_eq!(report.total(), 2);
        assert_eq!(report.sent_count(), 1);
    }
}
