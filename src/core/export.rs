//! Full database backup to a dated JSON file

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::data::AppData;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not serialize inventory: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File name used for a backup taken on `date`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("inventory-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Write the whole aggregate, pretty-printed, into `dir`.
///
/// Returns the path written. An existing backup from the same day is
/// overwritten.
pub fn export_database(data: &AppData, dir: &Path, date: NaiveDate) -> Result<PathBuf, ExportError> {
    let contents = serde_json::to_string_pretty(data)?;
    let path = dir.join(backup_file_name(date));
    fs::write(&path, contents).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), records = data.record_count(), "database exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;
    use tempfile::tempdir;

    #[test]
    fn test_backup_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(backup_file_name(date), "inventory-backup-2024-02-09.json");
    }

    #[test]
    fn test_export_writes_whole_aggregate() {
        let tmp = tempdir().unwrap();
        let data = seed::default_data("0000");
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();

        let path = export_database(&data, tmp.path(), date).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let parsed: AppData = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_export_into_missing_dir_fails() {
        let tmp = tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        let result = export_database(&AppData::default(), &tmp.path().join("nope"), date);
        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
