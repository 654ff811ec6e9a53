use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use serde::Deserialize;

const STREAMLIT_SECRETS: &str = ".streamlit/secrets.toml";

#[derive(Parser, Debug)]
#[command(name = "supaview", version, about = "Browse the tables of a hosted Postgres project")]
pub struct Cli {
    /// Secrets file with a `[supabase]` section holding `url` and `anon_key`
    #[arg(long)]
    pub secrets: Option<PathBuf>,

    /// Endpoint url (https:// for PostgREST, postgres:// for a direct connection)
    #[arg(long, env = "SUPABASE_URL")]
    pub url: Option<String>,

    /// Access key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Directory CSV exports are written to
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Table to open on startup
    #[arg(long)]
    pub table: Option<String>,
}

/// The two values the connector needs. Either may be absent; that is reported
/// when connecting, not when loading.
#[derive(Debug, Default)]
pub struct Secrets {
    pub url: Option<String>,
    pub key: Option<SecretString>,
}

#[derive(Deserialize, Default)]
struct SecretsFile {
    #[serde(default)]
    supabase: SupabaseSection,
}

#[derive(Deserialize, Default)]
struct SupabaseSection {
    url: Option<String>,
    #[serde(alias = "key", alias = "access_key")]
    anon_key: Option<SecretString>,
}

#[derive(Debug)]
pub struct AppConfig {
    pub secrets: Secrets,
    pub secrets_path: PathBuf,
    /// Why the secrets file could not be read, if it could not.
    pub secrets_error: Option<String>,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
    pub initial_table: Option<String>,
}

pub fn resolve_config(cli: Cli) -> Result<AppConfig> {
    let home = app_dir()?;
    let secrets_path = cli.secrets.unwrap_or_else(|| default_secrets_path(&home));

    let (mut secrets, secrets_error) = match load_secrets(&secrets_path) {
        Ok(secrets) => (secrets, None),
        Err(err) => (Secrets::default(), Some(format!("{err:#}"))),
    };

    if let Some(url) = cli.url {
        secrets.url = Some(url);
    }
    if let Some(key) = cli.key {
        secrets.key = Some(SecretString::new(key));
    }

    Ok(AppConfig {
        secrets,
        secrets_path,
        secrets_error,
        export_dir: cli.export_dir,
        log_file: cli.log_file.unwrap_or_else(|| home.join("supaview.log")),
        initial_table: cli.table,
    })
}

pub fn load_secrets(path: &Path) -> Result<Secrets> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let file: SecretsFile =
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    Ok(Secrets {
        url: file.supabase.url,
        key: file.supabase.anon_key,
    })
}

fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home.join(".supaview"))
}

fn default_secrets_path(app_dir: &Path) -> PathBuf {
    let local = PathBuf::from(STREAMLIT_SECRETS);
    if local.exists() {
        local
    } else {
        app_dir.join("secrets.toml")
    }
}
