use secrecy::ExposeSecret;
use sqlx::postgres::PgConnectOptions;
use tracing::{info, warn};
use url::Url;

use super::{Backend, PgBackend, RestBackend, Row, TableName};
use crate::config::Secrets;
use crate::error::{ConnectionError, ExecutionError};

/// Handle to the backend service, bound to one set of credentials.
#[derive(Clone, Debug)]
pub enum Connection {
    Rest(RestBackend),
    Postgres(PgBackend),
}

impl Connection {
    /// Builds a handle from the configured secrets. No network round trip is made.
    pub fn connect(secrets: &Secrets) -> Result<Self, ConnectionError> {
        let raw_url = secrets
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConnectionError::MissingSecret("url"))?;
        let key = secrets
            .key
            .as_ref()
            .map(|k| k.expose_secret().trim())
            .filter(|k| !k.is_empty())
            .ok_or(ConnectionError::MissingSecret("anon_key"))?;

        let url = Url::parse(raw_url).map_err(|e| ConnectionError::InvalidUrl {
            url: raw_url.to_string(),
            reason: e.to_string(),
        })?;

        let connection = match url.scheme() {
            "https" | "http" => {
                if url.host_str().is_none() {
                    return Err(ConnectionError::InvalidUrl {
                        url: raw_url.to_string(),
                        reason: "missing host".to_string(),
                    });
                }
                Self::Rest(RestBackend::new(&url, key)?)
            }
            "postgres" | "postgresql" => {
                let options: PgConnectOptions =
                    raw_url.parse().map_err(|e: sqlx::Error| ConnectionError::InvalidUrl {
                        url: redact(&url),
                        reason: e.to_string(),
                    })?;
                Self::Postgres(PgBackend::lazy(options.password(key)))
            }
            other => return Err(ConnectionError::UnsupportedScheme(other.to_string())),
        };

        info!(endpoint = %redact(&url), kind = connection.kind(), "backend handle ready");
        Ok(connection)
    }
}

impl Backend for Connection {
    fn kind(&self) -> &'static str {
        match self {
            Self::Rest(backend) => backend.kind(),
            Self::Postgres(backend) => backend.kind(),
        }
    }

    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        match self {
            Self::Rest(backend) => backend.execute(sql).await,
            Self::Postgres(backend) => backend.execute(sql).await,
        }
    }

    async fn select(&self, table: &TableName, limit: usize) -> Result<Vec<Row>, ExecutionError> {
        match self {
            Self::Rest(backend) => backend.select(table, limit).await,
            Self::Postgres(backend) => backend.select(table, limit).await,
        }
    }
}

/// Produces a fresh backend handle for each page evaluation.
pub trait Connector {
    type Backend: Backend;

    fn connect(&self) -> Result<Self::Backend, ConnectionError>;
}

impl Connector for Secrets {
    type Backend = Connection;

    fn connect(&self) -> Result<Connection, ConnectionError> {
        Connection::connect(self).inspect_err(|e| warn!(error = %e, "connection failed"))
    }
}

/// The url without user info, safe for logs and messages.
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    let _ = url.set_password(None);
    let _ = url.set_username("");
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn secrets(url: Option<&str>, key: Option<&str>) -> Secrets {
        Secrets {
            url: url.map(str::to_string),
            key: key.map(|k| SecretString::new(k.to_string())),
        }
    }

    #[test]
    fn https_url_builds_rest_handle() {
        let conn = Connection::connect(&secrets(Some("https://demo.supabase.co"), Some("anon"))).unwrap();
        assert_eq!(conn.kind(), "rest");
    }

    #[tokio::test]
    async fn postgres_url_builds_lazy_handle() {
        let conn = Connection::connect(&secrets(
            Some("postgresql://postgres@db.demo.supabase.co:5432/postgres"),
            Some("secret"),
        ))
        .unwrap();
        assert_eq!(conn.kind(), "postgres");
    }

    #[test]
    fn missing_secrets_are_reported() {
        assert!(matches!(
            Connection::connect(&secrets(None, Some("anon"))),
            Err(ConnectionError::MissingSecret("url"))
        ));
        assert!(matches!(
            Connection::connect(&secrets(Some("https://demo.supabase.co"), Some("  "))),
            Err(ConnectionError::MissingSecret("anon_key"))
        ));
    }

    #[test]
    fn malformed_secrets_are_reported() {
        assert!(matches!(
            Connection::connect(&secrets(Some("not a url"), Some("anon"))),
            Err(ConnectionError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Connection::connect(&secrets(Some("ftp://demo.supabase.co"), Some("anon"))),
            Err(ConnectionError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            Connection::connect(&secrets(Some("https://demo.supabase.co"), Some("line\nbreak"))),
            Err(ConnectionError::InvalidKey)
        ));
    }

    #[test]
    fn redact_strips_credentials() {
        let url = Url::parse("postgres://user:pw@host:5432/db").unwrap();
        assert_eq!(redact(&url), "postgres://host:5432/db");
    }
}
