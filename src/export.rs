//! CSV export of the rows currently shown in the data tab.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::db::{Row, cell_text, row_columns};
use crate::error::ExportError;

pub fn export_filename(table: &str) -> String {
    format!("{table}_data.csv")
}

/// Serializes `rows` with a header row and no index column.
pub fn rows_to_csv(rows: &[Row]) -> Result<String, ExportError> {
    let columns = row_columns(rows);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(
            columns
                .iter()
                .map(|c| row.get(c).map(cell_text).unwrap_or_default()),
        )?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes `{dir}/{table}_data.csv` and returns its path.
pub fn save_csv(dir: &Path, table: &str, rows: &[Row]) -> Result<PathBuf, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    let csv = rows_to_csv(rows)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(table));
    std::fs::write(&path, csv)?;
    info!(path = %path.display(), rows = rows.len(), "exported csv");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        vec![
            json!({ "id": 1, "name": "Ada, Countess", "meta": { "tags": ["a"] } }),
            json!({ "id": 2, "name": "Bob \"B\"", "meta": null }),
            json!({ "id": 3, "name": "line\nbreak", "note": "late column" }),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    #[test]
    fn filename_follows_table() {
        assert_eq!(export_filename("users"), "users_data.csv");
    }

    #[test]
    fn export_round_trips_displayed_cells() {
        let rows = rows();
        let csv = rows_to_csv(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, row_columns(&rows));

        let parsed: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        let displayed: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|c| row.get(c).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        assert_eq!(parsed, displayed);
    }

    #[test]
    fn save_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_csv(dir.path(), "users", &rows()).unwrap();
        assert_eq!(path, dir.path().join("users_data.csv"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("id,name,meta,note\n"));
    }

    #[test]
    fn empty_export_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(save_csv(dir.path(), "users", &[]), Err(ExportError::Empty)));
    }
}
