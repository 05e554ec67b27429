//! Domain model for a rent record.

use chrono::{DateTime, Utc};
use shared::{PaymentMethod, RentStatus};
use uuid::Uuid;

use super::period::BillingPeriod;
use super::tenant::Tenant;
use crate::domain::error::{DomainResult, Validator};

/// Rent and light-bill amounts of a record. The total is derived, never
/// stored independently, so it cannot drift from its parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentAmounts {
    rent: f64,
    light_bill: f64,
}

impl RentAmounts {
    pub fn new(rent: f64, light_bill: f64) -> DomainResult<Self> {
        let mut v = Validator::new();
        v.check(
            rent.is_finite() && rent >= 0.0,
            "rent_amount",
            "Rent amount must be a non-negative number",
        )
        .check(
            light_bill.is_finite() && light_bill >= 0.0,
            "light_bill_amount",
            "Light bill amount must be a non-negative number",
        );
        v.finish()?;
        Ok(Self { rent, light_bill })
    }

    pub fn rent(&self) -> f64 {
        self.rent
    }

    pub fn light_bill(&self) -> f64 {
        self.light_bill
    }

    pub fn total(&self) -> f64 {
        self.rent + self.light_bill
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RentRecord {
    pub id: String,
    pub tenant_id: String,
    pub period: BillingPeriod,
    amounts: RentAmounts,
    pub payment_date: Option<DateTime<Utc>>,
    pub status: RentStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub whatsapp_sent: bool,
    pub whatsapp_sent_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RentRecord {
    /// A fresh pending record
    pub fn new(
        tenant_id: &str,
        period: BillingPeriod,
        amounts: RentAmounts,
        payment_method: PaymentMethod,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            period,
            amounts,
            payment_date: None,
            status: RentStatus::Pending,
            payment_method,
            notes,
            whatsapp_sent: false,
            whatsapp_sent_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a record read back from storage
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: String,
        tenant_id: String,
        period: BillingPeriod,
        amounts: RentAmounts,
        payment_date: Option<DateTime<Utc>>,
        status: RentStatus,
        payment_method: PaymentMethod,
        notes: Option<String>,
        whatsapp_sent: bool,
        whatsapp_sent_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            period,
            amounts,
            payment_date,
            status,
            payment_method,
            notes,
            whatsapp_sent,
            whatsapp_sent_date,
            created_at,
            updated_at,
        }
    }

    pub fn amounts(&self) -> RentAmounts {
        self.amounts
    }

    pub fn rent_amount(&self) -> f64 {
        self.amounts.rent()
    }

    pub fn light_bill_amount(&self) -> f64 {
        self.amounts.light_bill()
    }

    pub fn total_amount(&self) -> f64 {
        self.amounts.total()
    }

    pub fn set_amounts(&mut self, amounts: RentAmounts, at: DateTime<Utc>) {
        self.amounts = amounts;
        self.updated_at = at;
    }

    /// The only transition into `Paid`. Calling it again keeps the status
    /// and restamps the payment date.
    pub fn mark_paid(&mut self, method: Option<PaymentMethod>, at: DateTime<Utc>) {
        self.status = RentStatus::Paid;
        self.payment_date = Some(at);
        if let Some(method) = method {
            self.payment_method = method;
        }
        self.updated_at = at;
    }

    pub fn mark_notified(&mut self, at: DateTime<Utc>) {
        self.whatsapp_sent = true;
        self.whatsapp_sent_date = Some(at);
        self.updated_at = at;
    }

    /// Overdue is derived, not stored: still pending after its month ended.
    pub fn is_overdue_as_of(&self, current: BillingPeriod) -> bool {
        self.status == RentStatus::Pending && self.period < current
    }
}

/// A rent record with its tenant joined in
#[derive(Debug, Clone, PartialEq)]
pub struct RentWithTenant {
    pub record: RentRecord,
    pub tenant: Tenant,
}

#[derive(Debug, Clone, Default)]
pub struct RentFilter {
    pub period: Option<BillingPeriod>,
    pub status: Option<RentStatus>,
    pub tenant_id: Option<String>,
    /// When set, a status filter matches the derived status: pending
    /// records from earlier months count as overdue, not pending
    pub overdue_before: Option<BillingPeriod>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;

    fn record(period: &str) -> RentRecord {
        RentRecord::new(
            "tenant-1",
            BillingPeriod::parse(period).unwrap(),
            RentAmounts::new(8000.0, 500.0).unwrap(),
            PaymentMethod::Cash,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let amounts = RentAmounts::new(8000.0, 500.0).unwrap();
        assert_eq!(amounts.total(), 8500.0);

        let mut rec = record("2024-03");
        assert_eq!(rec.total_amount(), 8500.0);
        rec.set_amounts(RentAmounts::new(9000.0, 0.0).unwrap(), Utc::now());
        assert_eq!(rec.total_amount(), 9000.0);
    }

    #[test]
    fn test_negative_or_non_finite_amounts_rejected() {
        assert!(matches!(
            RentAmounts::new(-1.0, 0.0),
            Err(DomainError::Validation(_))
        ));
        assert!(RentAmounts::new(100.0, -5.0).is_err());
        assert!(RentAmounts::new(f64::NAN, 0.0).is_err());
        assert!(RentAmounts::new(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_new_record_is_pending_and_unsent() {
        let rec = record("2024-03");
        assert_eq!(rec.status, RentStatus::Pending);
        assert!(rec.payment_date.is_none());
        assert!(!rec.whatsapp_sent);
        assert_eq!(rec.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_mark_paid_keeps_method_when_none_given() {
        let mut rec = record("2024-03");
        rec.mark_paid(None, Utc::now());
        assert_eq!(rec.status, RentStatus::Paid);
        assert_eq!(rec.payment_method, PaymentMethod::Cash);
        assert!(rec.payment_date.is_some());

        rec.mark_paid(Some(PaymentMethod::Upi), Utc::now());
        assert_eq!(rec.status, RentStatus::Paid);
        assert_eq!(rec.payment_method, PaymentMethod::Upi);
    }

    #[test]
    fn test_overdue_is_derived_from_period() {
        let current = BillingPeriod::parse("2024-04").unwrap();
        assert!(record("2024-03").is_overdue_as_of(current));
        assert!(!record("2024-04").is_overdue_as_of(current));

        let mut paid = record("2024-01");
        paid.mark_paid(None, Utc::now());
        assert!(!paid.is_overdue_as_of(current));
    }
}
