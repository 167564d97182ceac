//! Key-material lookup strategies.
//!
//! Material is fetched fresh on every operation and never cached by the
//! manager, so operators can rotate or zero it outside the manager's
//! lifetime.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use wicker_support::key_fingerprint;
use zeroize::Zeroizing;

/// Source of master key material.
pub trait KeyFinder: Send + Sync {
    /// Fetch the current key material. Called once per operation.
    fn find_key(&self) -> Result<Zeroizing<Vec<u8>>>;
}

impl<T> KeyFinder for Arc<T>
where
    T: KeyFinder + ?Sized,
{
    fn find_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        (**self).find_key()
    }
}

impl<T> KeyFinder for Box<T>
where
    T: KeyFinder + ?Sized,
{
    fn find_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        (**self).find_key()
    }
}

/// Fixed in-memory key material (embedding, tests).
pub struct StaticKeyFinder {
    material: Zeroizing<Vec<u8>>,
}

impl StaticKeyFinder {
    pub fn new(material: impl Into<Vec<u8>>) -> Self {
        Self {
            material: Zeroizing::new(material.into()),
        }
    }
}

impl KeyFinder for StaticKeyFinder {
    fn find_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(self.material.clone())
    }
}

/// Key material read from a file on every call.
///
/// Re-reading per operation is deliberate: rotating or zeroing the file takes
/// effect immediately, without restarting anything that holds a manager.
pub struct FileKeyFinder {
    path: PathBuf,
}

impl FileKeyFinder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeyFinder for FileKeyFinder {
    fn find_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        let mut material = Zeroizing::new(
            std::fs::read(&self.path)
                .map_err(|err| Error::KeyUnavailable(format!("{}: {err}", self.path.display())))?,
        );
        // Key files written by editors commonly end with a newline.
        while material.last().is_some_and(|b| matches!(b, b'\n' | b'\r')) {
            material.pop();
        }
        if material.is_empty() {
            return Err(Error::KeyUnavailable(format!(
                "{}: key file is empty",
                self.path.display()
            )));
        }
        debug!(
            path = %self.path.display(),
            fingerprint = %key_fingerprint(&material),
            "loaded key material"
        );
        Ok(material)
    }
}
