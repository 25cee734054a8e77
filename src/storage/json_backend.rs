use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::{debug, info};

use crate::errors::{BudgetError, Result};
use crate::utils::paths::{app_data_dir, ensure_dir};

use super::RecordStore;

const RECORD_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// File-backed record store rooted at the application data directory.
///
/// ```text
/// <root>/records/<name>.json
/// <root>/backups/<name>/<name>_<timestamp>.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    records_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&root)?;
        let records_dir = root.join("records");
        let backups_dir = root.join("backups");
        ensure_dir(&records_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            records_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, name: &str) -> PathBuf {
        self.records_dir
            .join(format!("{}.{}", canonical_name(name), RECORD_EXTENSION))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    /// Backup file names for `name`, newest first.
    pub fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", canonical_name(name));
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            match path.file_name().and_then(|file| file.to_str()) {
                Some(file) if file.starts_with(&prefix) => entries.push(file.to_string()),
                _ => continue,
            }
        }
        entries.sort_by(|a, b| backup_order_key(b).cmp(&backup_order_key(a)));
        Ok(entries)
    }

    /// Copies `backup_name` over the live `name` record. Only names listed
    /// by [`Self::list_backups`] are accepted.
    pub fn restore_backup(&self, name: &str, backup_name: &str) -> Result<()> {
        if !self.list_backups(name)?.iter().any(|known| known == backup_name) {
            return Err(BudgetError::NotFound(format!("backup `{backup_name}`")));
        }
        let backup_path = self.backup_path(name, backup_name);
        let target = self.record_path(name);
        let data = fs::read_to_string(&backup_path)?;
        self.replace_file(name, &target, &data)?;
        info!(record = name, backup = backup_name, "record restored from backup");
        Ok(())
    }

    fn replace_file(&self, name: &str, path: &Path, data: &str) -> Result<()> {
        if path.exists() {
            self.backup_existing_file(name, path)?;
        }
        let tmp = tmp_path(path);
        write_atomic(&tmp, data)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let stem = format!(
            "{}_{}",
            canonical_name(name),
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        let mut backup_path = dir.join(format!("{stem}.{RECORD_EXTENSION}"));
        let mut attempt = 1;
        while backup_path.exists() {
            backup_path = dir.join(format!("{stem}-{attempt}.{RECORD_EXTENSION}"));
            attempt += 1;
        }
        fs::copy(path, &backup_path)?;
        debug!(record = name, backup = %backup_path.display(), "backup written");
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for entry in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backup_path(name, entry));
        }
        Ok(())
    }
}

impl RecordStore for JsonStorage {
    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, name: &str, data: &str) -> Result<()> {
        let path = self.record_path(name);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        self.replace_file(name, &path, data)
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.record_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "record".into()
    } else {
        sanitized
    }
}

/// Fixed-width timestamp stem plus the collision counter, if any.
fn backup_order_key(file_name: &str) -> (&str, u32) {
    let stem = file_name
        .strip_suffix(RECORD_EXTENSION)
        .and_then(|stem| stem.strip_suffix('.'))
        .unwrap_or(file_name);
    match stem.rsplit_once('-') {
        Some((base, counter)) => match counter.parse() {
            Ok(counter) => (base, counter),
            Err(_) => (stem, 0),
        },
        None => (stem, 0),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
