use crate::db::models::{DbAdmin, SalesRecord};
use crate::db::schema::{SALES_RESET, SQLITE_INIT, statements};
use crate::error::DashboardError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct DashboardStorage {
    pool: SqlitePool,
}

impl DashboardStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, DashboardError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // every in-memory connection is its own database; keep exactly one alive
        let pool_opts = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };
        let pool = pool_opts.connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), DashboardError> {
        for stmt in statements(SQLITE_INIT) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert the admin row unless one already exists. Returns true when a row was written.
    pub async fn ensure_admin_exists(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, DashboardError> {
        let mut tx = self.pool.begin().await?;
        let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin")
            .fetch_one(&mut *tx)
            .await?;
        if existing.0 > 0 {
            tx.commit().await?;
            return Ok(false);
        }

        sqlx::query("INSERT INTO admin (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    pub async fn password_hash_for(&self, username: &str) -> Result<Option<String>, DashboardError> {
        let rec: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM admin WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(rec.map(|r| r.0))
    }

    pub async fn list_admins(&self) -> Result<Vec<DbAdmin>, DashboardError> {
        let rows = sqlx::query_as::<_, DbAdmin>(
            "SELECT username, password_hash FROM admin ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Drop and recreate `sales`, then bulk insert `records`, all in one transaction.
    pub async fn replace_sales(&self, records: &[SalesRecord]) -> Result<(), DashboardError> {
        let mut tx = self.pool.begin().await?;

        for stmt in statements(SALES_RESET) {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }

        for rec in records {
            sqlx::query(
                r#"INSERT INTO sales (sales_id, country, customer_id, date, cost)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(rec.sales_id)
            .bind(&rec.country)
            .bind(&rec.customer_id)
            .bind(&rec.date)
            .bind(rec.cost)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// All sales rows in insertion order.
    pub async fn fetch_all(&self) -> Result<Vec<SalesRecord>, DashboardError> {
        let rows = sqlx::query_as::<_, SalesRecord>(
            r#"SELECT sales_id, customer_id, country, date, cost
               FROM sales ORDER BY rowid"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
