use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

/// DbConnection owns the SQLite pool shared by every repository
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and ensure the schema exists
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Isolated in-memory database, one per test
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tenants (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                contact_number TEXT NOT NULL,
                aadhaar_number TEXT NOT NULL UNIQUE,
                aadhaar_file TEXT NOT NULL,
                pan_number TEXT NOT NULL UNIQUE,
                pan_file TEXT NOT NULL,
                accommodation_from_date TEXT NOT NULL,
                deposit REAL NOT NULL CHECK (deposit >= 0),
                agreement_done BOOLEAN NOT NULL DEFAULT FALSE,
                agreement_date TEXT,
                photo TEXT,
                monthly_rent REAL NOT NULL CHECK (monthly_rent >= 0),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Listing order
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_tenants_created_at
            ON tenants(created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_tenants_is_active
            ON tenants(is_active);
            "#,
        )
        .execute(pool)
        .await?;

        // One record per (tenant, month); total must always equal its parts
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rent_records (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                month TEXT NOT NULL,
                rent_amount REAL NOT NULL CHECK (rent_amount >= 0),
                light_bill_amount REAL NOT NULL DEFAULT 0 CHECK (light_bill_amount >= 0),
                total_amount REAL NOT NULL,
                payment_date TEXT,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'paid', 'overdue')),
                payment_method TEXT NOT NULL DEFAULT 'cash'
                    CHECK (payment_method IN ('cash', 'bank_transfer', 'upi', 'cheque')),
                notes TEXT,
                whatsapp_sent BOOLEAN NOT NULL DEFAULT FALSE,
                whatsapp_sent_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (tenant_id, month),
                CHECK (total_amount = rent_amount + light_bill_amount),
                FOREIGN KEY (tenant_id) REFERENCES tenants (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_rent_records_month_status
            ON rent_records(month, status);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_rent_records_tenant_id
            ON rent_records(tenant_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
