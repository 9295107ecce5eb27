use std::ffi::OsString;
use std::fs;
use std::path::Path;
use crate::errors::PublishError;
use crate::models::snapshot::Snapshot;

/// Writes the snapshot to a temporary file next to the target and renames it
/// into place, so a reader never sees a half written document and the old
/// snapshot survives a failed write
///
/// # Arguments
///
/// * 'snapshot' - the snapshot to publish
/// * 'path' - the target json file
pub fn publish(snapshot: &Snapshot, path: &Path) -> Result<(), PublishError> {
    if let Some(parent) = path.parent() {
        if parent != Path::new("") {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(snapshot)?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    if let Err(e) = fs::write(tmp, json) {
        let _ = fs::remove_file(tmp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(tmp, path) {
        let _ = fs::remove_file(tmp);
        return Err(e.into());
    }

    Ok(())
}
