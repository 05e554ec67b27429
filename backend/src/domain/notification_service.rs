use chrono::{DateTime, Local, Utc};
use shared::RentStatus;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::notifications::{BulkReminderReport, Delivery, HistoryEntry, ReminderOutcome};
use crate::domain::error::{DomainError, DomainResult, Validator};
use crate::domain::models::{BillingPeriod, RentRecord, RentWithTenant, Tenant};
use crate::messaging::WhatsAppSession;
use crate::storage::{RentRepository, TenantRepository};

pub const REMINDER: &str = "Rent Reminder";
pub const PAYMENT_CONFIRMATION: &str = "Payment Confirmation";

/// Formats rent messages and hands them to the WhatsApp session
#[derive(Clone)]
pub struct NotificationService {
    rents: RentRepository,
    tenants: TenantRepository,
    session: Arc<WhatsAppSession>,
    currency: String,
}

impl NotificationService {
    pub fn new(
        rents: RentRepository,
        tenants: TenantRepository,
        session: Arc<WhatsAppSession>,
        currency: &str,
    ) -> Self {
        Self {
            rents,
            tenants,
            session,
            currency: currency.to_string(),
        }
    }

    /// Send a reminder for one record, whatever its status, and flag it as sent
    pub async fn send_reminder(&self, rent_id: &str) -> DomainResult<Delivery> {
        self.session.ensure_ready().await?;
        let RentWithTenant { record, tenant } = self.load_record(rent_id).await?;

        self.deliver_reminder(&record, &tenant).await?;

        info!("Rent reminder for {} sent to {}", record.period, tenant.name);
        Ok(recipient(&tenant))
    }

    /// Remind every pending, not yet notified record of a month. One failed
    /// send does not stop the rest.
    pub async fn send_bulk_reminders(&self, month: &str) -> DomainResult<BulkReminderReport> {
        self.session.ensure_ready().await?;
        let period = BillingPeriod::parse(month)?;

        let candidates = self.rents.list_reminder_candidates(period).await?;
        info!("Sending {} rent reminders for {}", candidates.len(), period);

        let mut report = BulkReminderReport::default();
        for RentWithTenant { record, tenant } in candidates {
            let outcome = match self.deliver_reminder(&record, &tenant).await {
                Ok(()) => ReminderOutcome::Sent {
                    rent_id: record.id.clone(),
                    recipient: recipient(&tenant),
                },
                Err(e) => {
                    warn!("Reminder to {} for {} failed: {}", tenant.name, period, e);
                    ReminderOutcome::Failed {
                        rent_id: record.id.clone(),
                        recipient: recipient(&tenant),
                        error: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            "Bulk reminders for {}: {} sent, {} failed",
            period,
            report.sent_count(),
            report.total() - report.sent_count()
        );
        Ok(report)
    }

    /// Confirm a payment. Informational only: nothing on the record changes.
    pub async fn send_payment_confirmation(&self, rent_id: &str) -> DomainResult<Delivery> {
        self.session.ensure_ready().await?;
        let RentWithTenant { record, tenant } = self.load_record(rent_id).await?;

        if record.status != RentStatus::Paid {
            return Err(DomainError::PreconditionFailed(
                "Rent is not marked as paid".to_string(),
            ));
        }

        let text = confirmation_text(&record, &tenant, &self.currency);
        self.session.send_message(&tenant.contact_number, &text).await?;

        info!("Payment confirmation for {} sent to {}", record.period, tenant.name);
        Ok(recipient(&tenant))
    }

    pub async fn send_custom_message(&self, tenant_id: &str, message: &str) -> DomainResult<Delivery> {
        self.session.ensure_ready().await?;

        let mut v = Validator::new();
        v.check(!tenant_id.trim().is_empty(), "tenant_id", "Tenant ID is required")
            .check(!message.trim().is_empty(), "message", "Message is required");
        v.finish()?;

        let tenant = self
            .tenants
            .get_tenant(tenant_id.trim())
            .await?
            .ok_or_else(|| DomainError::NotFound("Tenant not found".to_string()))?;

        self.session.send_message(&tenant.contact_number, message).await?;

        info!("Custom message sent to {}", tenant.name);
        Ok(recipient(&tenant))
    }

    /// Records of a tenant that had a message sent, latest first
    pub async fn message_history(&self, tenant_id: &str) -> DomainResult<Vec<HistoryEntry>> {
        let records = self.rents.list_notified_for_tenant(tenant_id).await?;
        Ok(records
            .into_iter()
            .map(|record| HistoryEntry {
                message_type: if record.status == RentStatus::Paid {
                    PAYMENT_CONFIRMATION
                } else {
                    REMINDER
                },
                record,
            })
            .collect())
    }

    async fn load_record(&self, rent_id: &str) -> DomainResult<RentWithTenant> {
        self.rents
            .get_with_tenant(rent_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Rent record not found".to_string()))
    }

    async fn deliver_reminder(&self, record: &RentRecord, tenant: &Tenant) -> DomainResult<()> {
        let text = reminder_text(record, tenant, &self.currency);
        self.session.send_message(&tenant.contact_number, &text).await?;
        self.rents.mark_notified(&record.id, &Utc::now()).await?;
        Ok(())
    }
}

fn recipient(tenant: &Tenant) -> Delivery {
    Delivery {
        tenant_name: tenant.name.clone(),
        phone_number: tenant.contact_number.clone(),
    }
}

fn local_date(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y").to_string()
}

pub(crate) fn reminder_text(record: &RentRecord, tenant: &Tenant, currency: &str) -> String {
    format!(
        "Dear {name},\n\n\
         This is a reminder for your rent payment for {period}.\n\n\
         Details:\n\
         • Rent Amount: {cur}{rent}\n\
         • Light Bill: {cur}{light}\n\
         • Total Amount: {cur}{total}\n\
         • Due Date: {due}\n\n\
         Please make the payment at your earliest convenience.\n\n\
         Thank you!",
        name = tenant.name,
        period = record.period.long_name(),
        cur = currency,
        rent = record.rent_amount(),
        light = record.light_bill_amount(),
        total = record.total_amount(),
        due = record.period.due_date().format("%d/%m/%Y"),
    )
}

pub(crate) fn confirmation_text(record: &RentRecord, tenant: &Tenant, currency: &str) -> String {
    let paid_on = record.payment_date.unwrap_or(record.updated_at);
    format!(
        "Dear {name},\n\n\
         Thank you for your rent payment for {period}.\n\n\
         Payment Confirmation:\n\
         • Rent Amount: {cur}{rent}\n\
         • Light Bill: {cur}{light}\n\
         • Total Amount: {cur}{total}\n\
         • Payment Date: {paid}\n\
         • Payment Method: {method}\n\n\
         Your payment has been received and recorded.\n\n\
         Thank you!",
        name = tenant.name,
        period = record.period.long_name(),
        cur = currency,
        rent = record.rent_amount(),
        light = record.light_bill_amount(),
        total = record.total_amount(),
        paid = local_date(&paid_on),
        method = record.payment_method,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::rent::CreateRentCommand;
    use crate::domain::tenant_service::test_support::tenant_command;
    use crate::domain::{RentService, TenantService};
    use crate::messaging::gateway::test_support::RecordingGateway;
    use crate::storage::DbConnection;
    use shared::PaymentMethod;

    struct Fixture {
        tenants: TenantService,
        rents: RentService,
        gateway: Arc<RecordingGateway>,
        session: Arc<WhatsAppSession>,
        notifications: NotificationService,
    }

    async fn setup_test(gateway: RecordingGateway) -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let tenant_repo = TenantRepository::new(db.clone());
        let rent_repo = RentRepository::new(db);
        let gateway = Arc::new(gateway);
        let session = Arc::new(WhatsAppSession::new(gateway.clone(), "91"));

        Fixture {
            tenants: TenantService::new(tenant_repo.clone()),
            rents: RentService::new(rent_repo.clone(), tenant_repo.clone()),
            notifications: NotificationService::new(rent_repo, tenant_repo, session.clone(), "₹"),
            gateway,
            session,
        }
    }

    async fn rent_for(fx: &Fixture, seq: u32, month: &str) -> RentWithTenant {
        let tenant = fx
            .tenants
            .create_tenant(tenant_command(&format!("Tenant {}", seq), seq))
            .await
            .unwrap();
        fx.rents
            .create_rent(CreateRentCommand {
                tenant_id: tenant.id,
                month: month.to_string(),
                rent_amount: 8000.0,
                light_bill_amount: Some(500.0),
                payment_method: None,
                notes: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reminder_text_matches_template() {
        let fx = setup_test(RecordingGateway::default()).await;
        let created = rent_for(&fx, 1, "2024-02").await;

        let text = reminder_text(&created.record, &created.tenant, "₹");
        assert_eq!(
            text,
            "Dear Tenant 1,\n\n\
             This is a reminder for your rent payment for February 2024.\n\n\
             Details:\n\
             • Rent Amount: ₹8000\n\
             • Light Bill: ₹500\n\
             • Total Amount: ₹8500\n\
             • Due Date: 29/02/2024\n\n\
             Please make the payment at your earliest convenience.\n\n\
             Thank you!"
        );
    }

    #[tokio::test]
    async fn test_send_reminder_marks_record() {
        let fx = setup_test(RecordingGateway::default()).await;
        fx.session.on_ready().await;
        let created = rent_for(&fx, 1, "2024-03").await;

        let delivery = fx.notifications.send_reminder(&created.record.id).await.unwrap();
        assert_eq!(delivery.tenant_name, "Tenant 1");
        assert_eq!(delivery.phone_number, created.tenant.contact_number);

        let messages = fx.gateway.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, format!("91{}@c.us", created.tenant.contact_number));
        assert!(messages[0].1.contains("March 2024"));

        let stored = fx.rents.get_rent(&created.record.id).await.unwrap();
        assert!(stored.record.whatsapp_sent);
        assert!(stored.record.whatsapp_sent_date.is_some());
    }

    #[tokio::test]
    async fn test_send_requires_ready_session() {
        let fx = setup_test(RecordingGateway::default()).await;
        let created = rent_for(&fx, 1, "2024-03").await;

        let err = fx.notifications.send_reminder(&created.record.id).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
        let stored = fx.rents.get_rent(&created.record.id).await.unwrap();
        assert!(!stored.record.whatsapp_sent);

        fx.session.on_ready().await;
        let err = fx.notifications.send_reminder("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_send_leaves_record_unsent() {
        let fx = setup_test(RecordingGateway::failing_for("@c.us")).await;
        fx.session.on_ready().await;
        let created = rent_for(&fx, 1, "2024-03").await;

        let err = fx.notifications.send_reminder(&created.record.id).await.unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(_)));
        let stored = fx.rents.get_rent(&created.record.id).await.unwrap();
        assert!(!stored.record.whatsapp_sent);
    }

    #[tokio::test]
    async fn test_confirmation_requires_paid_record() {
        let fx = setup_test(RecordingGateway::default()).await;
        fx.session.on_ready().await;
        let created = rent_for(&fx, 1, "2024-03").await;

        let err = fx
            .notifications
            .send_payment_confirmation(&created.record.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
        assert!(fx.gateway.messages().is_empty());

        fx.rents
            .mark_paid(&created.record.id, Some(PaymentMethod::Upi))
            .await
            .unwrap();
        fx.notifications
            .send_payment_confirmation(&created.record.id)
            .await
            .unwrap();

        let messages = fx.gateway.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("Thank you for your rent payment for March 2024."));
        assert!(messages[0].1.contains("• Payment Method: upi"));

        // Confirmation does not touch the sent flag
        let stored = fx.rents.get_rent(&created.record.id).await.unwrap();
        assert!(!stored.record.whatsapp_sent);
    }

    #[tokio::test]
    async fn test_bulk_reminders_collect_partial_failures() {
        let fx = setup_test(RecordingGateway::failing_for("9876500002")).await;
        fx.session.on_ready().await;
        let first = rent_for(&fx, 1, "2024-03").await;
        let second = rent_for(&fx, 2, "2024-03").await;
        let paid = rent_for(&fx, 3, "2024-03").await;
        fx.rents.mark_paid(&paid.record.id, None).await.unwrap();
        rent_for(&fx, 4, "2024-04").await;

        let report = fx.notifications.send_bulk_reminders("2024-03").await.unwrap();
        assert_eq!(report.total(), 2);
        assert_eq!(report.sent_count(), 1);

        let failed: Vec<_> = report
            .outcomes
            .iter()
            .filter_map(|o| match o {
                ReminderOutcome::Failed { rent_id, .. } => Some(rent_id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec![second.record.id.clone()]);

        assert!(fx.rents.get_rent(&first.record.id).await.unwrap().record.whatsapp_sent);
        assert!(!fx.rents.get_rent(&second.record.id).await.unwrap().record.whatsapp_sent);

        // Already-notified records are not picked again
        let again = fx.notifications.send_bulk_reminders("2024-03").await.unwrap();
        assert_eq!(again.total(), 1);
    }

    #[tokio::test]
    async fn test_bulk_rejects_bad_month() {
        let fx = setup_test(RecordingGateway::default()).await;
        fx.session.on_ready().await;
        let err = fx.notifications.send_bulk_reminders("2024/03").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_custom_message_and_history() {
        let fx = setup_test(RecordingGateway::default()).await;
        fx.session.on_ready().await;
        let created = rent_for(&fx, 1, "2024-03").await;

        let err = fx
            .notifications
            .send_custom_message(&created.tenant.id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = fx
            .notifications
            .send_custom_message("missing", "Water off tomorrow")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        fx.notifications
            .send_custom_message(&created.tenant.id, "Water off tomorrow")
            .await
            .unwrap();
        assert_eq!(fx.gateway.messages()[0].1, "Water off tomorrow");

        assert!(fx
            .notifications
            .message_history(&created.tenant.id)
            .await
            .unwrap()
            .is_empty());

        fx.notifications.send_reminder(&created.record.id).await.unwrap();
        let history = fx.notifications.message_history(&created.tenant.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message_type, REMINDER);

        fx.rents.mark_paid(&created.record.id, None).await.unwrap();
        let history = fx.notifications.message_history(&created.tenant.id).await.unwrap();
        assert_eq!(history[0].message_type, PAYMENT_CONFIRMATION);
    }
}
