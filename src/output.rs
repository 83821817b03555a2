//! Writing snapshot files.
//!
//! Records are encoded in full before anything touches the disk, then written
//! to a sibling temporary file that is renamed over the target. A failure at
//! any point leaves the previous file (or no file) in place.

use crate::error::FetchError;
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Writes `records` to `path` as a 2-space indented JSON array, replacing any
/// existing file.
pub async fn write_records(path: &Path, records: &[Value]) -> Result<(), FetchError> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| FetchError::io(dir, e))?;
    }

    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, &bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(FetchError::io(&tmp, e));
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(FetchError::io(path, e));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("records"));
    name.push(".tmp");
    path.with_file_name(name)
}
