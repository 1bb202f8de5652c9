//! JSON and CSV export of a process list.

use crate::types::{ProcError, ProcessRecord};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const CSV_HEADER: [&str; 5] = ["PID", "PPID", "RSS_BYTES", "Name", "Path"];

#[derive(Serialize)]
struct JsonDocument<'a> {
    processes: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    pid: i32,
    ppid: i32,
    name: &'a str,
    path: &'a str,
    rss_bytes: u64,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    pid: i32,
    ppid: i32,
    rss_bytes: u64,
    name: &'a str,
    path: &'a str,
}

/// `{"processes":[...]}` followed by a newline.
pub fn to_json(processes: &[ProcessRecord]) -> Result<String, ProcError> {
    let document = JsonDocument {
        processes: processes
            .iter()
            .map(|p| JsonRow {
                pid: p.pid,
                ppid: p.ppid,
                name: &p.name,
                path: &p.path,
                rss_bytes: p.memory_bytes,
            })
            .collect(),
    };
    let mut json = serde_json::to_string(&document)?;
    json.push('\n');
    Ok(json)
}

/// Header row plus one row per process; text columns are always quoted.
/// The header is written even when there are no rows.
pub fn to_csv(processes: &[ProcessRecord]) -> Result<String, ProcError> {
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    header.write_record(CSV_HEADER)?;
    let buffer = header
        .into_inner()
        .map_err(|e| ProcError::Export(e.to_string()))?;

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(buffer);
    for p in processes {
        writer.serialize(CsvRow {
            pid: p.pid,
            ppid: p.ppid,
            rss_bytes: p.memory_bytes,
            name: &p.name,
            path: &p.path,
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ProcError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ProcError::Export(e.to_string()))
}

/// Write `content` as UTF-8, optionally prefixed with a byte-order mark.
pub fn write_utf8(path: &Path, content: &str, bom: bool) -> Result<(), ProcError> {
    let mut file = File::create(path)?;
    if bom {
        file.write_all(UTF8_BOM)?;
    }
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ProcessRecord> {
        vec![
            ProcessRecord {
                pid: 42,
                ppid: 1,
                name: "say \"hi\"".to_string(),
                path: "/opt/a,b/tool".to_string(),
                memory_bytes: 8192,
                state: "S".to_string(),
                start_time: 7,
            },
            ProcessRecord {
                pid: 2,
                ppid: 0,
                name: "kthreadd".to_string(),
                path: String::new(),
                memory_bytes: 0,
                state: "S".to_string(),
                start_time: 1,
            },
        ]
    }

    #[test]
    fn json_shape() {
        let json = to_json(&sample()).unwrap();
        assert!(json.ends_with("]}\n"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value["processes"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["pid"], 42);
        assert_eq!(rows[0]["name"], "say \"hi\"");
        assert_eq!(rows[0]["rss_bytes"], 8192);
        assert_eq!(rows[1]["path"], "");
        assert!(rows[0].get("state").is_none());
    }

    #[test]
    fn empty_json() {
        assert_eq!(to_json(&[]).unwrap(), "{\"processes\":[]}\n");
    }

    #[test]
    fn empty_csv_still_has_header() {
        assert_eq!(to_csv(&[]).unwrap(), "PID,PPID,RSS_BYTES,Name,Path\n");
    }

    #[test]
    fn csv_quotes_text_columns() {
        let csv = to_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "PID,PPID,RSS_BYTES,Name,Path");
        assert_eq!(lines[1], "42,1,8192,\"say \"\"hi\"\"\",\"/opt/a,b/tool\"");
        assert_eq!(lines[2], "2,0,0,\"kthreadd\",\"\"");
    }

    #[test]
    fn bom_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let with = dir.path().join("with.csv");
        let without = dir.path().join("without.csv");

        write_utf8(&with, "ä", true).unwrap();
        write_utf8(&without, "ä", false).unwrap();

        assert_eq!(std::fs::read(&with).unwrap(), b"\xEF\xBB\xBF\xC3\xA4");
        assert_eq!(std::fs::read(&without).unwrap(), "ä".as_bytes());
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(matches!(
            write_utf8(&path, "{}", true),
            Err(ProcError::Io(_))
        ));
    }
}
