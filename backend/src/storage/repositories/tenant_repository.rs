use anyhow::{Context, Result};
use chrono::NaiveDate;
use shared::KycDocument;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::domain::models::{PageRequest, Tenant, TenantFilter};
use crate::storage::connection::DbConnection;
use crate::storage::{decode_timestamp, encode_timestamp};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) const TENANT_COLUMNS: &str = "id, name, address, contact_number, aadhaar_number, \
     aadhaar_file, pan_number, pan_file, accommodation_from_date, deposit, agreement_done, \
     agreement_date, photo, monthly_rent, is_active, created_at, updated_at";

/// Repository for tenant operations
#[derive(Clone)]
pub struct TenantRepository {
    db: DbConnection,
}

impl TenantRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_tenant(&self, tenant: &Tenant) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, address, contact_number, aadhaar_number,
                aadhaar_file, pan_number, pan_file, accommodation_from_date, deposit,
                agreement_done, agreement_date, photo, monthly_rent, is_active,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.address)
        .bind(&tenant.contact_number)
        .bind(&tenant.aadhaar.number)
        .bind(&tenant.aadhaar.file)
        .bind(&tenant.pan.number)
        .bind(&tenant.pan.file)
        .bind(tenant.accommodation_from_date.format(DATE_FORMAT).to_string())
        .bind(tenant.deposit)
        .bind(tenant.agreement_done)
        .bind(tenant.agreement_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(&tenant.photo)
        .bind(tenant.monthly_rent)
        .bind(tenant.is_active)
        .bind(encode_timestamp(&tenant.created_at))
        .bind(encode_timestamp(&tenant.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>> {
        let row = sqlx::query(&format!("SELECT {} FROM tenants WHERE id = ?", TENANT_COLUMNS))
            .bind(tenant_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(|r| tenant_from_row(&r, "")).transpose()
    }

    /// Overwrite every mutable column of an existing tenant
    pub async fn update_tenant(&self, tenant: &Tenant) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tenants
            SET name = ?, address = ?, contact_number = ?, aadhaar_number = ?,
                aadhaar_file = ?, pan_number = ?, pan_file = ?,
                accommodation_from_date = ?, deposit = ?, agreement_done = ?,
                agreement_date = ?, photo = ?, monthly_rent = ?, is_active = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&tenant.name)
        .bind(&tenant.address)
        .bind(&tenant.contact_number)
        .bind(&tenant.aadhaar.number)
        .bind(&tenant.aadhaar.file)
        .bind(&tenant.pan.number)
        .bind(&tenant.pan.file)
        .bind(tenant.accommodation_from_date.format(DATE_FORMAT).to_string())
        .bind(tenant.deposit)
        .bind(tenant.agreement_done)
        .bind(tenant.agreement_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(&tenant.photo)
        .bind(tenant.monthly_rent)
        .bind(tenant.is_active)
        .bind(encode_timestamp(&tenant.updated_at))
        .bind(&tenant.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// One page of tenants, newest first, plus the unpaged match count
    pub async fn list_tenants(
        &self,
        filter: &TenantFilter,
        page: PageRequest,
    ) -> Result<(Vec<Tenant>, u64)> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM tenants");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build()
            .fetch_one(self.db.pool())
            .await?
            .get("count");

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM tenants", TENANT_COLUMNS));
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, ROWID DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = query.build().fetch_all(self.db.pool()).await?;
        let tenants = rows
            .iter()
            .map(|r| tenant_from_row(r, ""))
            .collect::<Result<Vec<_>>>()?;

        Ok((tenants, total.max(0) as u64))
    }

    /// All active tenants, oldest first
    pub async fn list_active_tenants(&self) -> Result<Vec<Tenant>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tenants WHERE is_active = TRUE ORDER BY created_at ASC, ROWID ASC",
            TENANT_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(|r| tenant_from_row(r, "")).collect()
    }

    pub async fn list_all_tenants(&self) -> Result<Vec<Tenant>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tenants ORDER BY created_at DESC, ROWID DESC",
            TENANT_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(|r| tenant_from_row(r, "")).collect()
    }

    /// Another tenant already holding either KYC number, if any
    pub async fn find_kyc_conflict(
        &self,
        aadhaar_number: &str,
        pan_number: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Tenant>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM tenants \
             WHERE (aadhaar_number = ? OR pan_number = ?) AND id != ? \
             LIMIT 1",
            TENANT_COLUMNS
        ))
        .bind(aadhaar_number)
        .bind(pan_number)
        .bind(exclude_id.unwrap_or(""))
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| tenant_from_row(&r, "")).transpose()
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &TenantFilter) {
    let mut has_where = false;

    if let Some(active) = filter.active.as_flag() {
        query.push(" WHERE is_active = ").push_bind(active);
        has_where = true;
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        query
            .push(if has_where { " AND " } else { " WHERE " })
            .push("(LOWER(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR LOWER(contact_number) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR LOWER(address) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Search text is matched literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Map a row to a tenant. `prefix` selects aliased columns in joins.
pub(crate) fn tenant_from_row(row: &SqliteRow, prefix: &str) -> Result<Tenant> {
    let col = |name: &str| format!("{}{}", prefix, name);

    let accommodation: String = row.try_get(col("accommodation_from_date").as_str())?;
    let agreement_date: Option<String> = row.try_get(col("agreement_date").as_str())?;
    let created_at: String = row.try_get(col("created_at").as_str())?;
    let updated_at: String = row.try_get(col("updated_at").as_str())?;

    Ok(Tenant {
        id: row.try_get(col("id").as_str())?,
        name: row.try_get(col("name").as_str())?,
        address: row.try_get(col("address").as_str())?,
        contact_number: row.try_get(col("contact_number").as_str())?,
        aadhaar: KycDocument {
            number: row.try_get(col("aadhaar_number").as_str())?,
            file: row.try_get(col("aadhaar_file").as_str())?,
        },
        pan: KycDocument {
            number: row.try_get(col("pan_number").as_str())?,
            file: row.try_get(col("pan_file").as_str())?,
        },
        accommodation_from_date: NaiveDate::parse_from_str(&accommodation, DATE_FORMAT)
            .with_context(|| format!("bad accommodation date '{}'", accommodation))?,
        deposit: row.try_get(col("deposit").as_str())?,
        agreement_done: row.try_get(col("agreement_done").as_str())?,
        agreement_date: agreement_date
            .map(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT))
            .transpose()?,
        photo: row.try_get(col("photo").as_str())?,
        monthly_rent: row.try_get(col("monthly_rent").as_str())?,
        is_active: row.try_get(col("is_active").as_str())?,
        created_at: decode_timestamp(&created_at)?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_tenant;
    use super::*;
    use crate::domain::models::ActiveFilter;
    use crate::storage::is_unique_violation;

    async fn setup_test() -> TenantRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        TenantRepository::new(db)
    }

    #[tokio::test]
    async fn test_store_and_get_tenant() {
        let repo = setup_test().await;
        let mut tenant = sample_tenant("Asha Verma", 1);
        tenant.agreement_done = true;
        tenant.agreement_date = NaiveDate::from_ymd_opt(2024, 1, 5);
        tenant.photo = Some("photo_file-1.png".to_string());

        repo.store_tenant(&tenant).await.expect("Failed to store tenant");

        let stored = repo
            .get_tenant(&tenant.id)
            .await
            .expect("Failed to get tenant")
            .expect("Tenant should exist");
        assert_eq!(stored, tenant);

        assert!(repo.get_tenant("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_kyc_is_unique_violation() {
        let repo = setup_test().await;
        let first = sample_tenant("Asha Verma", 1);
        repo.store_tenant(&first).await.unwrap();

        let mut second = sample_tenant("Ravi Kumar", 2);
        second.pan.number = first.pan.number.clone();
        let err = repo.store_tenant(&second).await.unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_find_kyc_conflict_excludes_self() {
        let repo = setup_test().await;
        let tenant = sample_tenant("Asha Verma", 1);
        repo.store_tenant(&tenant).await.unwrap();

        let conflict = repo
            .find_kyc_conflict(&tenant.aadhaar.number, "ZZZZZ9999Z", None)
            .await
            .unwrap();
        assert_eq!(conflict.map(|t| t.id), Some(tenant.id.clone()));

        let conflict = repo
            .find_kyc_conflict(&tenant.aadhaar.number, &tenant.pan.number, Some(&tenant.id))
            .await
            .unwrap();
        assert!(conflict.is_none());
    }

    #[tokio::test]
    async fn test_list_tenants_filters_and_pages() {
        let repo = setup_test().await;
        let names = ["Asha Verma", "Ravi Kumar", "Meena Iyer", "Asha Rao"];
        for (i, name) in names.iter().enumerate() {
            let mut tenant = sample_tenant(name, i as u32 + 1);
            if i == 1 {
                tenant.is_active = false;
            }
            repo.store_tenant(&tenant).await.unwrap();
        }

        let (all, total) = repo
            .list_tenants(&TenantFilter::default(), PageRequest::new(Some(1), Some(10)))
            .await
            .unwrap();
        assert_eq!(total, 4);
        // Newest first
        assert_eq!(all[0].name, "Asha Rao");
        assert_eq!(all[3].name, "Asha Verma");

        let filter = TenantFilter {
            search: Some("asha".to_string()),
            active: ActiveFilter::All,
        };
        let (found, total) = repo.list_tenants(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(found.iter().all(|t| t.name.starts_with("Asha")));

        let filter = TenantFilter {
            search: None,
            active: ActiveFilter::Inactive,
        };
        let (inactive, _) = repo.list_tenants(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].name, "Ravi Kumar");

        let (page_two, total) = repo
            .list_tenants(&TenantFilter::default(), PageRequest::new(Some(2), Some(3)))
            .await
            .unwrap();
        assert_eq!(total, 4);
        assert_eq!(page_two.len(), 1);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let repo = setup_test().await;
        repo.store_tenant(&sample_tenant("Asha Verma", 1)).await.unwrap();

        let filter = TenantFilter {
            search: Some("%".to_string()),
            active: ActiveFilter::All,
        };
        let (found, total) = repo.list_tenants(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(total, 0);
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_list_active() {
        let repo = setup_test().await;
        let mut tenant = sample_tenant("Asha Verma", 1);
        repo.store_tenant(&tenant).await.unwrap();
        repo.store_tenant(&sample_tenant("Ravi Kumar", 2)).await.unwrap();

        tenant.monthly_rent = 12500.0;
        tenant.is_active = false;
        repo.update_tenant(&tenant).await.unwrap();

        let stored = repo.get_tenant(&tenant.id).await.unwrap().unwrap();
        assert_eq!(stored.monthly_rent, 12500.0);
        assert!(!stored.is_active);

        let active = repo.list_active_tenants().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Ravi Kumar");
        assert_eq!(repo.list_all_tenants().await.unwrap().len(), 2);
    }
}
