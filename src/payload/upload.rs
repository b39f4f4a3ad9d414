use std::path::Path;

use uuid::Uuid;

use super::Upload;

/// URL prefix uploaded files are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Write an upload into `dir` under a generated name and return the
/// reference stored on the record, e.g. `/uploads/0190....png`.
pub async fn store(dir: &Path, upload: &Upload) -> Result<String, String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("Failed to create upload dir {}: {e}", dir.display()))?;

    let name = match extension(&upload.file_name) {
        Some(ext) => format!("{}.{ext}", Uuid::now_v7()),
        None => Uuid::now_v7().to_string(),
    };

    let path = dir.join(&name);
    tokio::fs::write(&path, &upload.data)
        .await
        .map_err(|e| format!("Failed to write upload {}: {e}", path.display()))?;

    tracing::info!(size = upload.data.len(), file = %name, "Stored upload");
    Ok(format!("{PUBLIC_PREFIX}/{name}"))
}

/// Remove a previously stored upload. Failures are logged, not returned.
pub async fn discard(dir: &Path, reference: &str) {
    let Some(name) = reference.strip_prefix(PUBLIC_PREFIX).and_then(|r| r.strip_prefix('/')) else {
        return;
    };
    if name.contains('/') || name.contains("..") {
        return;
    }
    if let Err(e) = tokio::fs::remove_file(dir.join(name)).await {
        tracing::warn!("Failed to discard upload {name}: {e}");
    }
}

/// Lowercased extension of the client file name, if it is short and alphanumeric.
fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| ext.to_ascii_lowercase())
}
