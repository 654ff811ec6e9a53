use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use super::{Backend, Row, TableName};
use crate::error::{ConnectionError, ExecutionError};

const SQL_RPC: &str = "exec_sql";

/// PostgREST endpoint of a hosted project (`{url}/rest/v1`).
#[derive(Clone, Debug)]
pub struct RestBackend {
    client: reqwest::Client,
    base: Url,
}

#[derive(Deserialize)]
struct PostgrestError {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RestBackend {
    pub fn new(url: &Url, key: &str) -> Result<Self, ConnectionError> {
        let mut headers = HeaderMap::new();
        let mut apikey = HeaderValue::from_str(key).map_err(|_| ConnectionError::InvalidKey)?;
        apikey.set_sensitive(true);
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| ConnectionError::InvalidKey)?;
        bearer.set_sensitive(true);
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConnectionError::Client(e.to_string()))?;

        let mut base = url.clone();
        base.set_query(None);
        base.path_segments_mut()
            .map_err(|_| ConnectionError::InvalidUrl {
                url: url.to_string(),
                reason: "url cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["rest", "v1"]);

        Ok(Self { client, base })
    }

    /// `{base}/{segments...}` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut endpoint = self.base.clone();
        if let Ok(mut path) = endpoint.path_segments_mut() {
            path.extend(segments);
        }
        endpoint
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Row>, ExecutionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = describe_rejection(&body);
            warn!(status = status.as_u16(), %message, "backend rejected request");
            return Err(ExecutionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        rows_from_json(body)
    }
}

impl Backend for RestBackend {
    fn kind(&self) -> &'static str {
        "rest"
    }

    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        let endpoint = self.endpoint(&["rpc", SQL_RPC]);
        debug!(%endpoint, sql = sql.trim(), "executing sql");

        let response = self
            .client
            .post(endpoint)
            .json(&json!({ "sql": sql }))
            .send()
            .await?;
        Self::read_rows(response).await
    }

    async fn select(&self, table: &TableName, limit: usize) -> Result<Vec<Row>, ExecutionError> {
        let endpoint = self.endpoint(&[table.as_str()]);
        debug!(%endpoint, limit, "selecting rows");

        let response = self
            .client
            .get(endpoint)
            .query(&[("select", "*".to_string()), ("limit", limit.to_string())])
            .send()
            .await?;
        Self::read_rows(response).await
    }
}

fn describe_rejection(body: &str) -> String {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(err) => {
            let mut parts = vec![err.message.unwrap_or_else(|| "unknown error".to_string())];
            if let Some(code) = err.code {
                parts.push(format!("code {code}"));
            }
            if let Some(details) = err.details {
                parts.push(details);
            }
            if let Some(hint) = err.hint {
                parts.push(format!("hint: {hint}"));
            }
            parts.join("; ")
        }
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn rows_from_json(body: Value) -> Result<Vec<Row>, ExecutionError> {
    match body {
        Value::Null => Ok(vec![]),
        Value::Object(row) => Ok(vec![row]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(ExecutionError::UnexpectedShape(format!(
                    "expected an object per row, got `{other}`"
                ))),
            })
            .collect(),
        other => Err(ExecutionError::UnexpectedShape(format!(
            "expected an array of rows, got `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend(server: &MockServer) -> RestBackend {
        let url = Url::parse(&server.uri()).unwrap();
        RestBackend::new(&url, "anon-key").unwrap()
    }

    #[tokio::test]
    async fn execute_posts_sql_to_rpc_with_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/exec_sql"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(body_json(json!({ "sql": "SELECT 1 AS one" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "one": 1 }])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = backend(&server).await.execute("SELECT 1 AS one").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["one"], json!(1));
    }

    #[tokio::test]
    async fn select_sends_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("select", "*"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "ada" },
                { "id": 2, "name": "bob" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let table = TableName::parse("users").unwrap();
        let rows = backend(&server).await.select(&table, 100).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], json!("bob"));
    }

    #[tokio::test]
    async fn select_encodes_table_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/Order%20Items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/a%2Fb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server).await;
        let spaced = TableName::parse("Order Items").unwrap();
        assert_eq!(backend.select(&spaced, 100).await.unwrap().len(), 1);
        let slashed = TableName::parse("a/b").unwrap();
        assert!(backend.select(&slashed, 100).await.unwrap().is_empty());
    }

    #[test]
    fn base_endpoint_is_rest_v1() {
        let url = Url::parse("https://example.supabase.co/").unwrap();
        let backend = RestBackend::new(&url, "k").unwrap();
        assert_eq!(
            backend.endpoint(&["rpc", SQL_RPC]).as_str(),
            "https://example.supabase.co/rest/v1/rpc/exec_sql"
        );
    }

    #[tokio::test]
    async fn rejection_carries_postgrest_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "42P01",
                "details": null,
                "hint": null,
                "message": "relation \"public.missing\" does not exist"
            })))
            .mount(&server)
            .await;

        let table = TableName::parse("missing").unwrap();
        let err = backend(&server).await.select(&table, 10).await.unwrap_err();
        match err {
            ExecutionError::Rejected { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("does not exist"));
                assert!(message.contains("42P01"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rows_from_json_shapes() {
        assert!(rows_from_json(Value::Null).unwrap().is_empty());
        assert_eq!(rows_from_json(json!({ "a": 1 })).unwrap().len(), 1);
        assert!(matches!(
            rows_from_json(json!([1, 2])),
            Err(ExecutionError::UnexpectedShape(_))
        ));
        assert!(matches!(
            rows_from_json(json!("text")),
            Err(ExecutionError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn rejection_text_falls_back_to_body() {
        assert_eq!(describe_rejection(""), "empty response");
        assert_eq!(describe_rejection("bad gateway"), "bad gateway");
    }

    #[test]
    fn invalid_key_is_connection_error() {
        let url = Url::parse("https://example.supabase.co").unwrap();
        assert!(matches!(
            RestBackend::new(&url, "bad\nkey"),
            Err(ConnectionError::InvalidKey)
        ));
    }
}
