use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use shared::{PaymentMethod, RentStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::tenant_repository::tenant_from_row;
use crate::domain::models::{BillingPeriod, PageRequest, RentAmounts, RentFilter, RentRecord, RentWithTenant};
use crate::storage::connection::DbConnection;
use crate::storage::{decode_timestamp, encode_timestamp};

const RENT_COLUMNS: &str = "r.id, r.tenant_id, r.month, r.rent_amount, r.light_bill_amount, \
     r.payment_date, r.status, r.payment_method, r.notes, r.whatsapp_sent, \
     r.whatsapp_sent_date, r.created_at, r.updated_at";

/// Tenant columns aliased with a `t_` prefix for joined reads
const JOINED_TENANT_COLUMNS: &str = "t.id AS t_id, t.name AS t_name, t.address AS t_address, \
     t.contact_number AS t_contact_number, t.aadhaar_number AS t_aadhaar_number, \
     t.aadhaar_file AS t_aadhaar_file, t.pan_number AS t_pan_number, t.pan_file AS t_pan_file, \
     t.accommodation_from_date AS t_accommodation_from_date, t.deposit AS t_deposit, \
     t.agreement_done AS t_agreement_done, t.agreement_date AS t_agreement_date, \
     t.photo AS t_photo, t.monthly_rent AS t_monthly_rent, t.is_active AS t_is_active, \
     t.created_at AS t_created_at, t.updated_at AS t_updated_at";

/// Repository for rent record operations
#[derive(Clone)]
pub struct RentRepository {
    db: DbConnection,
}

impl RentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a new record. A second record for the same tenant and month
    /// fails on the UNIQUE constraint.
    pub async fn store_rent_record(&self, record: &RentRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rent_records (id, tenant_id, month, rent_amount, light_bill_amount,
                total_amount, payment_date, status, payment_method, notes, whatsapp_sent,
                whatsapp_sent_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.tenant_id)
        .bind(record.period.to_string())
        .bind(record.rent_amount())
        .bind(record.light_bill_amount())
        .bind(record.total_amount())
        .bind(record.payment_date.as_ref().map(encode_timestamp))
        .bind(record.status.as_str())
        .bind(record.payment_method.as_str())
        .bind(&record.notes)
        .bind(record.whatsapp_sent)
        .bind(record.whatsapp_sent_date.as_ref().map(encode_timestamp))
        .bind(encode_timestamp(&record.created_at))
        .bind(encode_timestamp(&record.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_rent_record(&self, rent_id: &str) -> Result<Option<RentRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM rent_records r WHERE r.id = ?",
            RENT_COLUMNS
        ))
        .bind(rent_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| rent_from_row(&r)).transpose()
    }

    /// A record with its tenant joined in
    pub async fn get_with_tenant(&self, rent_id: &str) -> Result<Option<RentWithTenant>> {
        let row = sqlx::query(&format!(
            "SELECT {}, {} FROM rent_records r JOIN tenants t ON t.id = r.tenant_id WHERE r.id = ?",
            RENT_COLUMNS, JOINED_TENANT_COLUMNS
        ))
        .bind(rent_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| joined_from_row(&r)).transpose()
    }

    pub async fn find_by_tenant_and_month(
        &self,
        tenant_id: &str,
        period: BillingPeriod,
    ) -> Result<Option<RentRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM rent_records r WHERE r.tenant_id = ? AND r.month = ?",
            RENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(period.to_string())
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| rent_from_row(&r)).transpose()
    }

    /// Persist amounts, status, payment and notification fields
    pub async fn update_rent_record(&self, record: &RentRecord) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE rent_records
            SET rent_amount = ?, light_bill_amount = ?, total_amount = ?,
                payment_date = ?, status = ?, payment_method = ?, notes = ?,
                whatsapp_sent = ?, whatsapp_sent_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(record.rent_amount())
        .bind(record.light_bill_amount())
        .bind(record.total_amount())
        .bind(record.payment_date.as_ref().map(encode_timestamp))
        .bind(record.status.as_str())
        .bind(record.payment_method.as_str())
        .bind(&record.notes)
        .bind(record.whatsapp_sent)
        .bind(record.whatsapp_sent_date.as_ref().map(encode_timestamp))
        .bind(encode_timestamp(&record.updated_at))
        .bind(&record.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Set only the notification columns
    pub async fn mark_notified(&self, rent_id: &str, at: &DateTime<Utc>) -> Result<()> {
        let stamp = encode_timestamp(at);
        sqlx::query(
            r#"
            UPDATE rent_records
            SET whatsapp_sent = TRUE, whatsapp_sent_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&stamp)
        .bind(&stamp)
        .bind(rent_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Hard delete. Returns false when nothing matched.
    pub async fn delete_rent_record(&self, rent_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rent_records WHERE id = ?")
            .bind(rent_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of records with tenants joined, month desc then newest first
    pub async fn list_rent_records(
        &self,
        filter: &RentFilter,
        page: PageRequest,
    ) -> Result<(Vec<RentWithTenant>, u64)> {
        let mut count_query = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) AS count FROM rent_records r JOIN tenants t ON t.id = r.tenant_id",
        );
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build()
            .fetch_one(self.db.pool())
            .await?
            .get("count");

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {}, {} FROM rent_records r JOIN tenants t ON t.id = r.tenant_id",
            RENT_COLUMNS, JOINED_TENANT_COLUMNS
        ));
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY r.month DESC, r.created_at DESC, r.ROWID DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = query.build().fetch_all(self.db.pool()).await?;
        let records = rows
            .iter()
            .map(joined_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok((records, total.max(0) as u64))
    }

    /// Every record of one month
    pub async fn list_by_month(&self, period: BillingPeriod) -> Result<Vec<RentRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM rent_records r WHERE r.month = ? ORDER BY r.created_at ASC, r.ROWID ASC",
            RENT_COLUMNS
        ))
        .bind(period.to_string())
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(rent_from_row).collect()
    }

    /// Pending records of a month that have not been notified yet
    pub async fn list_reminder_candidates(
        &self,
        period: BillingPeriod,
    ) -> Result<Vec<RentWithTenant>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, {} FROM rent_records r JOIN tenants t ON t.id = r.tenant_id \
             WHERE r.month = ? AND r.status = 'pending' AND r.whatsapp_sent = FALSE \
             ORDER BY r.created_at ASC, r.ROWID ASC",
            RENT_COLUMNS, JOINED_TENANT_COLUMNS
        ))
        .bind(period.to_string())
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(joined_from_row).collect()
    }

    /// Pending records for months strictly before `current`, oldest month first
    pub async fn list_overdue(&self, current: BillingPeriod) -> Result<Vec<RentWithTenant>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, {} FROM rent_records r JOIN tenants t ON t.id = r.tenant_id \
             WHERE r.status = 'pending' AND r.month < ? \
             ORDER BY r.month ASC, r.created_at ASC",
            RENT_COLUMNS, JOINED_TENANT_COLUMNS
        ))
        .bind(current.to_string())
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(joined_from_row).collect()
    }

    /// Every record whose month falls in `year`
    pub async fn list_by_year(&self, year: i32) -> Result<Vec<RentRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM rent_records r WHERE r.month >= ? AND r.month <= ? ORDER BY r.month ASC",
            RENT_COLUMNS
        ))
        .bind(format!("{:04}-01", year))
        .bind(format!("{:04}-12", year))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(rent_from_row).collect()
    }

    /// Records of a tenant that have had a message sent, latest send first
    pub async fn list_notified_for_tenant(&self, tenant_id: &str) -> Result<Vec<RentRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM rent_records r \
             WHERE r.tenant_id = ? AND r.whatsapp_sent = TRUE \
             ORDER BY r.whatsapp_sent_date DESC",
            RENT_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(rent_from_row).collect()
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &RentFilter) {
    let mut separator = " WHERE ";

    if let Some(period) = filter.period {
        query.push(separator).push("r.month = ").push_bind(period.to_string());
        separator = " AND ";
    }
    if let Some(status) = filter.status {
        query.push(separator);
        match (status, filter.overdue_before) {
            (RentStatus::Pending, Some(current)) => {
                query
                    .push("r.status = 'pending' AND r.month >= ")
                    .push_bind(current.to_string());
            }
            (RentStatus::Overdue, Some(current)) => {
                query
                    .push("(r.status = 'overdue' OR (r.status = 'pending' AND r.month < ")
                    .push_bind(current.to_string())
                    .push("))");
            }
            _ => {
                query.push("r.status = ").push_bind(status.as_str());
            }
        }
        separator = " AND ";
    }
    if let Some(tenant_id) = &filter.tenant_id {
        query.push(separator).push("r.tenant_id = ").push_bind(tenant_id.clone());
    }
}

fn rent_from_row(row: &SqliteRow) -> Result<RentRecord> {
    let month: String = row.try_get("month")?;
    let period = BillingPeriod::parse(&month).map_err(|e| anyhow!("bad stored month: {}", e))?;

    let status: String = row.try_get("status")?;
    let status = RentStatus::parse(&status).ok_or_else(|| anyhow!("bad stored status '{}'", status))?;

    let method: String = row.try_get("payment_method")?;
    let method = PaymentMethod::parse(&method)
        .ok_or_else(|| anyhow!("bad stored payment method '{}'", method))?;

    let amounts = RentAmounts::new(row.try_get("rent_amount")?, row.try_get("light_bill_amount")?)
        .map_err(|e| anyhow!("bad stored amounts: {}", e))?;

    let payment_date: Option<String> = row.try_get("payment_date")?;
    let sent_date: Option<String> = row.try_get("whatsapp_sent_date")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(RentRecord::restore(
        row.try_get("id")?,
        row.try_get("tenant_id")?,
        period,
        amounts,
        payment_date.as_deref().map(decode_timestamp).transpose()?,
        status,
        method,
        row.try_get("notes")?,
        row.try_get("whatsapp_sent")?,
        sent_date.as_deref().map(decode_timestamp).transpose()?,
        decode_timestamp(&created_at)?,
        decode_timestamp(&updated_at)?,
    ))
}

fn joined_from_row(row: &SqliteRow) -> Result<RentWithTenant> {
    Ok(RentWithTenant {
        record: rent_from_row(row)?,
        tenant: tenant_from_row(row, "t_")?,
    })
}
