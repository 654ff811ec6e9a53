use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Backend, ColumnDescriptor, Row, TableName};
use crate::error::ExecutionError;

const LIST_TABLES_SQL: &str = "SELECT table_name
FROM information_schema.tables
WHERE table_schema = 'public'
AND table_type = 'BASE TABLE'
ORDER BY table_name";

#[derive(Deserialize)]
struct RawColumn {
    column_name: String,
    data_type: String,
    is_nullable: String,
    column_default: Option<String>,
    ordinal_position: Value,
}

/// Names of all base tables in the `public` schema, sorted by name.
pub async fn list_tables(backend: &impl Backend) -> Result<Vec<String>, ExecutionError> {
    let rows = backend.execute(LIST_TABLES_SQL).await?;
    let tables = rows
        .iter()
        .map(|row| match row.get("table_name") {
            Some(Value::String(name)) => Ok(name.clone()),
            _ => Err(ExecutionError::UnexpectedShape(
                "row without a string `table_name`".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = tables.len(), "listed tables");
    Ok(tables)
}

fn schema_sql(table: &TableName) -> String {
    format!(
        "SELECT column_name, data_type, is_nullable, column_default, ordinal_position
FROM information_schema.columns
WHERE table_name = {}
AND table_schema = 'public'
ORDER BY ordinal_position",
        table.sql_literal()
    )
}

/// Column metadata for `table`, ordered by ordinal position.
pub async fn table_schema(
    backend: &impl Backend,
    table: &TableName,
) -> Result<Vec<ColumnDescriptor>, ExecutionError> {
    let rows = backend.execute(&schema_sql(table)).await?;
    let mut columns = rows
        .into_iter()
        .map(column_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    columns.sort_by_key(|c| c.position);
    debug!(%table, count = columns.len(), "read schema");
    Ok(columns)
}

/// Up to `limit` rows of `table`, in whatever order the backend returns them.
pub async fn table_rows(
    backend: &impl Backend,
    table: &TableName,
    limit: usize,
) -> Result<Vec<Row>, ExecutionError> {
    let mut rows = backend.select(table, limit).await?;
    rows.truncate(limit);
    debug!(%table, count = rows.len(), limit, "read rows");
    Ok(rows)
}

fn column_from_row(row: Row) -> Result<ColumnDescriptor, ExecutionError> {
    let raw: RawColumn = serde_json::from_value(Value::Object(row))
        .map_err(|e| ExecutionError::UnexpectedShape(format!("column metadata: {e}")))?;

    let position = match &raw.ordinal_position {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        ExecutionError::UnexpectedShape(format!(
            "ordinal_position `{}` is not a position",
            raw.ordinal_position
        ))
    })?;

    Ok(ColumnDescriptor {
        name: raw.column_name,
        data_type: raw.data_type,
        nullable: raw.is_nullable.eq_ignore_ascii_case("YES"),
        default: raw.column_default,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RestBackend;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend(server: &MockServer) -> RestBackend {
        RestBackend::new(&Url::parse(&server.uri()).unwrap(), "anon").unwrap()
    }

    #[tokio::test]
    async fn list_tables_returns_names_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/exec_sql"))
            .and(body_string_contains("information_schema.tables"))
            .and(body_string_contains("BASE TABLE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "table_name": "orders" },
                { "table_name": "users" }
            ])))
            .mount(&server)
            .await;

        let tables = list_tables(&backend(&server).await).await.unwrap();
        assert_eq!(tables, vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn list_tables_empty_database() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(list_tables(&backend(&server).await).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_tables_rejects_malformed_rows() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "users" }])))
            .mount(&server)
            .await;

        assert!(matches!(
            list_tables(&backend(&server).await).await,
            Err(ExecutionError::UnexpectedShape(_))
        ));
    }

    #[tokio::test]
    async fn schema_is_ordered_by_position() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/exec_sql"))
            .and(body_string_contains("table_name = 'users'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "column_name": "email",
                    "data_type": "text",
                    "is_nullable": "YES",
                    "column_default": null,
                    "ordinal_position": "2"
                },
                {
                    "column_name": "id",
                    "data_type": "integer",
                    "is_nullable": "NO",
                    "column_default": "nextval('users_id_seq'::regclass)",
                    "ordinal_position": 1
                }
            ])))
            .mount(&server)
            .await;

        let table = TableName::parse("users").unwrap();
        let schema = table_schema(&backend(&server).await, &table).await.unwrap();
        assert_eq!(
            schema,
            vec![
                ColumnDescriptor {
                    name: "id".to_string(),
                    data_type: "integer".to_string(),
                    nullable: false,
                    default: Some("nextval('users_id_seq'::regclass)".to_string()),
                    position: 1,
                },
                ColumnDescriptor {
                    name: "email".to_string(),
                    data_type: "text".to_string(),
                    nullable: true,
                    default: None,
                    position: 2,
                },
            ]
        );
    }

    #[tokio::test]
    async fn rows_are_capped() {
        let server = MockServer::start().await;
        let rows: Vec<Value> = (0..150).map(|i| json!({ "id": i })).collect();
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(rows)))
            .mount(&server)
            .await;

        let table = TableName::parse("events").unwrap();
        let fetched = table_rows(&backend(&server).await, &table, 100).await.unwrap();
        assert_eq!(fetched.len(), 100);
    }

    #[tokio::test]
    async fn fewer_rows_than_cap_are_returned_as_is() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": 2 }])))
            .mount(&server)
            .await;

        let table = TableName::parse("events").unwrap();
        let fetched = table_rows(&backend(&server).await, &table, 100).await.unwrap();
        assert_eq!(fetched.len(), 2);
    }

    #[test]
    fn schema_sql_embeds_validated_literal() {
        let sql = schema_sql(&TableName::parse("users").unwrap());
        assert!(sql.contains("WHERE table_name = 'users'"));
        assert!(sql.contains("ORDER BY ordinal_position"));
    }

    #[test]
    fn bad_position_is_unexpected_shape() {
        let row = json!({
            "column_name": "id",
            "data_type": "integer",
            "is_nullable": "NO",
            "column_default": null,
            "ordinal_position": "first"
        });
        assert!(matches!(
            column_from_row(row.as_object().unwrap().clone()),
            Err(ExecutionError::UnexpectedShape(_))
        ));
    }
}
