use std::{
    fs::{self, File},
    io::Write as _,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};
use similar::TextDiff;
use tracing::debug;

use crate::{Error, KubeConfig, Result};

/// Serializes a document the way it is written to disk.
pub fn render(kc: &KubeConfig) -> Result<String> {
    kc.to_yaml().map_err(Error::Marshal)
}

/// `<path>.backup.<YYYYMMDD>`
pub fn backup_path(path: &Path, day: NaiveDate) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".backup.{}", day.format("%Y%m%d")));
    PathBuf::from(name)
}

/// Where [`apply`] and [`apply_on`] wrote things.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub backup: PathBuf,
    pub config: PathBuf,
}

/// Backs up `original` next to `path` with today's date, then replaces
/// `path` with `kc`.
pub fn apply(path: &Path, original: &[u8], kc: &KubeConfig) -> Result<Written> {
    apply_on(path, original, kc, Local::now().date_naive())
}

/// [`apply`] with an explicit backup date.
///
/// The backup is written first, with the permissions `path` has; if that
/// fails `path` is never touched. A failure writing `path` leaves the backup
/// in place.
pub fn apply_on(path: &Path, original: &[u8], kc: &KubeConfig, day: NaiveDate) -> Result<Written> {
    let rendered = render(kc)?;

    let backup = backup_path(path, day);
    write_backup(&backup, path, original).map_err(|source| Error::Write {
        path: backup.clone(),
        source,
    })?;
    debug!(backup = %backup.display(), "saved original kubeconfig");

    fs::write(path, rendered).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "wrote updated kubeconfig");

    Ok(Written {
        backup,
        config: path.to_path_buf(),
    })
}

// Permissions go on before any bytes do.
fn write_backup(backup: &Path, source: &Path, original: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(backup)?;
    if let Ok(meta) = fs::metadata(source) {
        file.set_permissions(meta.permissions())?;
    }
    file.write_all(original)
}

/// Unified diff from the file as read to the document as it would be written.
pub fn diff(path: &Path, original: &[u8], rendered: &str) -> String {
    let original = String::from_utf8_lossy(original);
    let name = path.display().to_string();
    let diff = TextDiff::from_lines(original.as_ref(), rendered);
    let mut unified = diff.unified_diff();
    unified
        .context_radius(3)
        .header(&name, &format!("{name} (updated)"));
    unified.to_string()
}
