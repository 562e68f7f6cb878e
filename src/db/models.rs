use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DbAdmin {
    pub username: String,
    pub password_hash: String,
}

/// One row of the `sales` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct SalesRecord {
    pub sales_id: i64,
    pub customer_id: String,
    pub country: String,
    pub date: String,
    pub cost: f64,
}
