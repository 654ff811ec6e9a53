use serde_json::{Number, Value};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tracing::debug;

use super::{Backend, Row, TableName};
use crate::error::ExecutionError;

/// Direct PostgreSQL connection, used when the endpoint is a `postgres://` URL.
#[derive(Clone, Debug)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Builds a pool without opening any connection.
    pub fn lazy(options: PgConnectOptions) -> Self {
        let pool = PgPoolOptions::new().max_connections(1).connect_lazy_with(options);
        Self { pool }
    }
}

impl Backend for PgBackend {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        debug!(sql = sql.trim(), "executing sql");
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn select(&self, table: &TableName, limit: usize) -> Result<Vec<Row>, ExecutionError> {
        let sql = format!("SELECT * FROM public.{} LIMIT $1", table.quoted_ident());
        debug!(%sql, limit, "selecting rows");
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

fn row_to_json(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .map(|column| (column.name().to_string(), extract_pg_value(row, column.ordinal())))
        .collect()
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map_or_else(|| Value::String(v.to_string()), Value::Number)
}

fn extract_pg_value(row: &PgRow, idx: usize) -> Value {
    let value_ref = row.try_get_raw(idx).ok();

    if let Some(vr) = value_ref {
        if vr.is_null() {
            return Value::Null;
        }

        let type_info = vr.type_info().clone();
        let type_name = type_info.name();

        match type_name {
            "BOOL" => {
                if let Ok(v) = row.try_get::<bool, _>(idx) {
                    return Value::Bool(v);
                }
            }
            "INT2" => {
                if let Ok(v) = row.try_get::<i16, _>(idx) {
                    return Value::from(v);
                }
            }
            "INT4" => {
                if let Ok(v) = row.try_get::<i32, _>(idx) {
                    return Value::from(v);
                }
            }
            "INT8" => {
                if let Ok(v) = row.try_get::<i64, _>(idx) {
                    return Value::from(v);
                }
            }
            "FLOAT4" => {
                if let Ok(v) = row.try_get::<f32, _>(idx) {
                    return float(f64::from(v));
                }
            }
            "FLOAT8" => {
                if let Ok(v) = row.try_get::<f64, _>(idx) {
                    return float(v);
                }
            }
            "NUMERIC" => {
                if let Ok(v) = row.try_get::<sqlx::types::BigDecimal, _>(idx) {
                    return Value::String(v.to_string());
                }
            }
            "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
                if let Ok(v) = row.try_get::<String, _>(idx) {
                    return Value::String(v);
                }
            }
            "UUID" => {
                if let Ok(v) = row.try_get::<sqlx::types::Uuid, _>(idx) {
                    return Value::String(v.to_string());
                }
            }
            "DATE" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveDate, _>(idx) {
                    return Value::String(v.to_string());
                }
            }
            "TIME" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveTime, _>(idx) {
                    return Value::String(v.to_string());
                }
            }
            "TIMESTAMP" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::NaiveDateTime, _>(idx) {
                    return Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
                }
            }
            "TIMESTAMPTZ" => {
                if let Ok(v) = row.try_get::<sqlx::types::chrono::DateTime<sqlx::types::chrono::Utc>, _>(idx) {
                    return Value::String(v.to_rfc3339());
                }
            }
            "JSON" | "JSONB" => {
                if let Ok(v) = row.try_get::<sqlx::types::JsonValue, _>(idx) {
                    return v;
                }
            }
            "BYTEA" => {
                if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
                    return Value::String(format!("\\x{}", hex::encode(v)));
                }
            }
            _ => {}
        }
    }

    row.try_get::<String, _>(idx)
        .map(Value::String)
        .or_else(|_| row.try_get::<i64, _>(idx).map(Value::from))
        .or_else(|_| row.try_get::<i32, _>(idx).map(Value::from))
        .or_else(|_| row.try_get::<f64, _>(idx).map(float))
        .or_else(|_| row.try_get::<bool, _>(idx).map(Value::Bool))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_floats_become_text() {
        assert_eq!(float(1.5), serde_json::json!(1.5));
        assert_eq!(float(f64::NAN), Value::String("NaN".to_string()));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        let options: PgConnectOptions = "postgres://nobody@127.0.0.1:1/none".parse().unwrap();
        let backend = PgBackend::lazy(options);
        assert_eq!(backend.pool.size(), 0);
    }
}
