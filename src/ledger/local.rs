//! Ledger kept in a local CSV file

use crate::error::Result;
use crate::ledger::record::{ResponseLedger, ResponseRecord};
use crate::ledger::store::{AppendReceipt, ResponseStore};
use log::{debug, info};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct LocalLedgerStore {
    path: PathBuf,
}

impl LocalLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write through a sibling temp file so readers never see a partial ledger.
/// An existing ledger keeps its permissions.
fn write_atomically(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    match std::fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == ErrorKind::NotFound => set_new_ledger_permissions(tmp.as_file())?,
        Err(e) => return Err(e),
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// Temp files are created 0600; a new ledger gets the usual 0644.
#[cfg(unix)]
fn set_new_ledger_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_new_ledger_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}

impl ResponseStore for LocalLedgerStore {
    async fn load(&self) -> Result<ResponseLedger> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => ResponseLedger::from_csv(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger at {}, starting empty", self.path.display());
                Ok(ResponseLedger::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn append(&self, record: ResponseRecord) -> Result<AppendReceipt> {
        let mut ledger = self.load().await?;
        ledger.append(record);

        let content = ledger.to_csv()?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &content))
            .await
            .map_err(|e| std::io::Error::new(ErrorKind::Other, e))??;

        info!("Saved response {} to {}", ledger.len(), self.path.display());
        Ok(AppendReceipt {
            records: ledger.len(),
            location: self.location(),
            version: None,
            attempts: 1,
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
