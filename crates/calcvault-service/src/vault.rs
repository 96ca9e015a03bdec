//! Vault session
//!
//! Lives only after the calculator has produced a [`VaultUnlock`], and
//! holds the PIN in zeroizing memory for the duration. File payloads are
//! encrypted on the way in and decrypted on the way out; the database only
//! ever holds ciphertext.

use crate::{Error, Result, SharedDb};
use calcvault_core::{apply, is_valid_pin, VaultUnlock};
use calcvault_storage_sqlite::{NewVaultFile, Repository, VaultFileSummary};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// An unlocked vault.
pub struct VaultSession {
    db: SharedDb,
    pin: Zeroizing<String>,
}

impl VaultSession {
    /// Open the vault with an unlock token produced by the calculator.
    pub fn open(db: SharedDb, unlock: VaultUnlock) -> Self {
        Self {
            db,
            pin: unlock.into_pin(),
        }
    }

    /// All stored files, newest first, metadata only.
    pub fn list_files(&self) -> Result<Vec<VaultFileSummary>> {
        let db = self.db.lock();
        Ok(Repository::new(&db).list_files()?)
    }

    /// Number of stored files.
    pub fn file_count(&self) -> Result<i64> {
        let db = self.db.lock();
        Ok(Repository::new(&db).file_count()?)
    }

    /// Encrypt and store a file, returning its id.
    pub fn store_file(&self, file_name: &str, file_type: &str, plaintext: &[u8]) -> Result<i64> {
        let file = NewVaultFile {
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            file_size: plaintext.len() as i64,
            data: apply(plaintext, &self.pin),
        };
        let db = self.db.lock();
        let id = Repository::new(&db).insert_file(&file)?;
        tracing::debug!("Stored vault file {} ({} bytes)", id, plaintext.len());
        Ok(id)
    }

    /// Decrypt one file, returning its metadata and plaintext.
    pub fn read_file(&self, id: i64) -> Result<(VaultFileSummary, Vec<u8>)> {
        let file = {
            let db = self.db.lock();
            Repository::new(&db).get_file(id)?
        };
        let plaintext = apply(&file.data, &self.pin);
        let summary = VaultFileSummary {
            id: file.id,
            file_name: file.file_name,
            file_type: file.file_type,
            file_size: file.file_size,
            date_added: file.date_added,
        };
        Ok((summary, plaintext))
    }

    /// Decrypt one file and write it to `dir` under its original name,
    /// returning the written path.
    pub fn export_file(&self, id: i64, dir: &Path) -> Result<PathBuf> {
        let (summary, plaintext) = self.read_file(id)?;
        let path = dir.join(&summary.file_name);
        std::fs::write(&path, &plaintext)?;
        tracing::info!("Exported vault file {} to {}", id, path.display());
        Ok(path)
    }

    /// Remove one file. Returns false when no such file existed.
    pub fn delete_file(&self, id: i64) -> Result<bool> {
        let db = self.db.lock();
        Ok(Repository::new(&db).delete_file(id)?)
    }

    /// Change the PIN. Every stored file is re-encrypted in one
    /// transaction, guarded by the canary check; on any failure the vault
    /// is untouched and this session keeps its current PIN. Calculator
    /// sessions must re-read the digest afterwards.
    pub fn change_pin(&mut self, new_pin: &str) -> Result<()> {
        if !is_valid_pin(new_pin) {
            return Err(Error::InvalidPin(
                "PIN must be exactly five digits".to_string(),
            ));
        }
        if new_pin == self.pin.as_str() {
            return Err(Error::InvalidPin(
                "new PIN must differ from the current one".to_string(),
            ));
        }
        {
            let db = self.db.lock();
            Repository::new(&db).rekey_vault(&self.pin, new_pin)?;
        }
        self.pin = Zeroizing::new(new_pin.to_string());
        tracing::info!("Vault PIN changed");
        Ok(())
    }

    /// End the session, consuming it; the held PIN is wiped on drop.
    pub fn lock(self) {}
}
