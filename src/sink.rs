//! Result delivery.
//!
//! The aggregated records are serialized once as a pretty-printed JSON array
//! and either written to a file or printed to stdout. The mode is chosen
//! once per run from `[output] persist`.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the result collection goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Write to this file, replacing any previous contents.
    Persist(PathBuf),
    /// Print to stdout.
    Display,
}

/// Serialize `records` as a pretty-printed JSON array into `writer`.
pub fn write_records<W: Write>(records: &[Value], mut writer: W) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Deliver the final collection according to `mode`.
pub fn deliver(records: &[Value], mode: &OutputMode) -> Result<()> {
    match mode {
        OutputMode::Persist(path) => {
            persist(records, path)?;
            info!(
                records = records.len(),
                path = %path.display(),
                "results written"
            );
        }
        OutputMode::Display => {
            let stdout = std::io::stdout();
            write_records(records, stdout.lock())?;
        }
    }
    Ok(())
}

/// Write to a sibling temp file and rename it over `path`, so readers see
/// either the old file or the complete new one.
fn persist(records: &[Value], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "results.json".into());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let file = std::fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
    write_records(records, std::io::BufWriter::new(file))?;

    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_write_records_pretty_array() {
        let mut buf = Vec::new();
        write_records(&[json!({"id": 1}), json!({"id": 2})], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.contains("  {\n    \"id\": 1\n  }"));
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn test_empty_collection_is_empty_array() {
        let mut buf = Vec::new();
        write_records(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[]\n");
    }

    #[test]
    fn test_persist_creates_dirs_and_truncates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("results.json");
        let mode = OutputMode::Persist(path.clone());

        deliver(&[json!(1), json!(2), json!(3)], &mode).unwrap();
        deliver(&[json!("only")], &mode).unwrap();

        let back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, json!(["only"]));
        assert!(!tmp.path().join("out").join("results.json.tmp").exists());
    }
}
