use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::{DaytaskError, Result};

/// Take an exclusive, non-blocking lock on `path`, creating the file if needed.
/// The lock is held until the returned handle is dropped or released.
pub fn acquire_lock(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    file.try_lock_exclusive()
        .map_err(|_| DaytaskError::Locked(path.display().to_string()))?;

    Ok(file)
}

pub fn release_lock(file: File) -> Result<()> {
    FileExt::unlock(&file)?;
    Ok(())
}
