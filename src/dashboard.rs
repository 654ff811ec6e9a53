//! One page evaluation per user interaction.
//!
//! [`Dashboard::handle`] takes the previously rendered [`Page`] and the
//! interaction that triggered the rerun and produces the next page. A fresh
//! backend handle is built for every evaluation; nothing else survives
//! between calls except what the caller passes back in.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::db::{
    self, Backend, ColumnDescriptor, Connector, DEFAULT_ROW_CAP, Row, TableName, row_columns,
};
use crate::error::ExecutionError;
use crate::export;

pub const SELECT_PROMPT: &str = "Select a table from the sidebar to view its details";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    Load,
    RefreshTables,
    Select(Option<String>),
    RefreshData,
    ExportCsv,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Pending,
    Connected { kind: &'static str },
    Failed { error: String, hint: String },
}

#[derive(Clone, Debug, Default)]
pub struct Page {
    pub connection: ConnectionState,
    pub tables: Vec<String>,
    pub tables_notice: Option<Notice>,
    pub selected: Option<String>,
    pub detail: Option<TableDetail>,
    pub export_notice: Option<Notice>,
}

impl Page {
    /// Text shown in the detail pane when connected but nothing is selected.
    pub fn prompt(&self) -> Option<&'static str> {
        let connected = matches!(self.connection, ConnectionState::Connected { .. });
        (connected && !self.tables.is_empty() && self.selected.is_none()).then_some(SELECT_PROMPT)
    }
}

#[derive(Clone, Debug)]
pub struct TableDetail {
    pub table: String,
    pub schema: Vec<ColumnDescriptor>,
    pub schema_notice: Option<Notice>,
    pub rows: Vec<Row>,
    pub data_notice: Option<Notice>,
}

impl TableDetail {
    pub fn columns(&self) -> Vec<String> {
        row_columns(&self.rows)
    }

    pub fn row_count_label(&self) -> String {
        format!("Showing {} rows", self.rows.len())
    }
}

pub struct Dashboard<C> {
    connector: C,
    export_dir: PathBuf,
    row_cap: usize,
    secrets_hint: String,
}

impl<C: Connector> Dashboard<C> {
    pub fn new(connector: C, export_dir: PathBuf) -> Self {
        Self {
            connector,
            export_dir,
            row_cap: DEFAULT_ROW_CAP,
            secrets_hint: "Make sure your secrets file has a [supabase] section with url and anon_key"
                .to_string(),
        }
    }

    pub fn with_secrets_hint(mut self, hint: impl Into<String>) -> Self {
        self.secrets_hint = hint.into();
        self
    }

    pub async fn handle(&self, previous: Page, interaction: Interaction) -> Page {
        match interaction {
            Interaction::ExportCsv => self.export(previous),
            Interaction::Load | Interaction::RefreshTables => match self.connect() {
                Ok(backend) => self.reload(&backend, previous).await,
                Err(failed) => failed,
            },
            Interaction::Select(choice) => match self.connect() {
                Ok(backend) => self.select(&backend, previous, choice).await,
                Err(failed) => failed,
            },
            Interaction::RefreshData => match self.connect() {
                Ok(backend) => self.refresh_data(&backend, previous).await,
                Err(failed) => failed,
            },
        }
    }

    /// A fresh backend handle, or the page shown when none can be built.
    fn connect(&self) -> Result<C::Backend, Page> {
        self.connector.connect().map_err(|err| Page {
            connection: ConnectionState::Failed {
                error: format!("Cannot connect to the database: {err}"),
                hint: self.secrets_hint.clone(),
            },
            ..Page::default()
        })
    }

    async fn reload(&self, backend: &C::Backend, previous: Page) -> Page {
        let (tables, tables_notice) = fetch_tables(backend).await;
        let selected = previous.selected.filter(|t| tables.contains(t));
        let detail = match &selected {
            Some(table) => Some(self.load_detail(backend, table, &tables).await),
            None => None,
        };
        Page {
            connection: ConnectionState::Connected { kind: backend.kind() },
            tables,
            tables_notice,
            selected,
            detail,
            export_notice: None,
        }
    }

    async fn select(&self, backend: &C::Backend, previous: Page, choice: Option<String>) -> Page {
        let detail = match &choice {
            Some(table) => Some(self.load_detail(backend, table, &previous.tables).await),
            None => None,
        };
        Page {
            connection: ConnectionState::Connected { kind: backend.kind() },
            selected: choice,
            detail,
            export_notice: None,
            ..previous
        }
    }

    /// Re-reads rows only; the schema shown stays the one from `previous`.
    async fn refresh_data(&self, backend: &C::Backend, previous: Page) -> Page {
        let detail = match previous.detail {
            Some(mut detail) => {
                let (rows, data_notice) =
                    self.fetch_rows(backend, &detail.table, &previous.tables).await;
                detail.rows = rows;
                detail.data_notice = data_notice;
                Some(detail)
            }
            None => None,
        };
        Page {
            connection: ConnectionState::Connected { kind: backend.kind() },
            detail,
            export_notice: None,
            ..previous
        }
    }

    async fn load_detail(&self, backend: &C::Backend, table: &str, listed: &[String]) -> TableDetail {
        let (schema, schema_notice) = fetch_schema(backend, table, listed).await;
        let (rows, data_notice) = self.fetch_rows(backend, table, listed).await;
        TableDetail {
            table: table.to_string(),
            schema,
            schema_notice,
            rows,
            data_notice,
        }
    }

    async fn fetch_rows(
        &self,
        backend: &impl Backend,
        table: &str,
        listed: &[String],
    ) -> (Vec<Row>, Option<Notice>) {
        let result = match TableName::listed(table, listed) {
            Ok(name) => db::table_rows(backend, &name, self.row_cap).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(rows) if rows.is_empty() => {
                (rows, Some(Notice::Info("No data found in this table".to_string())))
            }
            Ok(rows) => (rows, None),
            Err(err) => (vec![], Some(report("Error fetching table data", &err))),
        }
    }

    fn export(&self, previous: Page) -> Page {
        let notice = match &previous.detail {
            Some(detail) => match export::save_csv(&self.export_dir, &detail.table, &detail.rows) {
                Ok(path) => Notice::Success(format!(
                    "Saved {} rows to {}",
                    detail.rows.len(),
                    path.display()
                )),
                Err(err) => {
                    warn!(table = %detail.table, error = %err, "csv export failed");
                    Notice::Error(format!("Export failed: {err}"))
                }
            },
            None => Notice::Warning("Select a table before exporting".to_string()),
        };
        Page {
            export_notice: Some(notice),
            ..previous
        }
    }
}

async fn fetch_tables(backend: &impl Backend) -> (Vec<String>, Option<Notice>) {
    match db::list_tables(backend).await {
        Ok(tables) if tables.is_empty() => (
            tables,
            Some(Notice::Warning("No tables found in your database".to_string())),
        ),
        Ok(tables) => {
            info!(count = tables.len(), "tables loaded");
            (tables, None)
        }
        Err(err) => (vec![], Some(report("Error fetching tables", &err))),
    }
}

async fn fetch_schema(
    backend: &impl Backend,
    table: &str,
    listed: &[String],
) -> (Vec<ColumnDescriptor>, Option<Notice>) {
    let result = match TableName::listed(table, listed) {
        Ok(name) => db::table_schema(backend, &name).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(schema) if schema.is_empty() => (
            schema,
            Some(Notice::Warning("No schema information available".to_string())),
        ),
        Ok(schema) => (schema, None),
        Err(err) => (vec![], Some(report("Error fetching table schema", &err))),
    }
}

fn report(context: &str, err: &ExecutionError) -> Notice {
    warn!(error = %err, "{context}");
    Notice::Error(format!("{context}: {err}"))
}
