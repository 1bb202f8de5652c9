//! Export of the visible rows to a timestamped file.

use procmon::{to_csv, to_json, write_utf8, ProcError, ProcessRecord};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    fn render(self, rows: &[ProcessRecord]) -> Result<String, ProcError> {
        match self {
            ExportFormat::Json => to_json(rows),
            ExportFormat::Csv => to_csv(rows),
        }
    }
}

/// Write `rows` to `dir/procmon-<timestamp>.<ext>` and return the path.
pub fn export_view(
    rows: &[ProcessRecord],
    format: ExportFormat,
    dir: &Path,
    bom: bool,
) -> Result<PathBuf, ProcError> {
    let content = format.render(rows)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("procmon-{}.{}", stamp, format.extension()));
    write_utf8(&path, &content, bom)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<ProcessRecord> {
        vec![ProcessRecord {
            pid: 5,
            ppid: 1,
            name: "cron".to_string(),
            path: "/usr/sbin/cron".to_string(),
            memory_bytes: 4096,
            state: "S".to_string(),
            start_time: 9,
        }]
    }

    #[test]
    fn writes_json_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_view(&rows(), ExportFormat::Json, dir.path(), true).unwrap();

        assert_eq!(path.extension().unwrap(), "json");
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert!(String::from_utf8_lossy(&bytes[3..]).contains("\"name\":\"cron\""));
    }

    #[test]
    fn writes_csv_without_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_view(&rows(), ExportFormat::Csv, dir.path(), false).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("PID,PPID,RSS_BYTES,Name,Path\n"));
        assert!(text.contains("5,1,4096,\"cron\",\"/usr/sbin/cron\""));
    }
}
