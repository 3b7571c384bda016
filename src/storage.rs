//! Backing stores for a volume.
//! A volume only needs byte-addressed reads and writes plus a length query;
//! there is no block granularity at this layer.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::{Error, Result};

pub trait Storage: Send + Sync {
    /// Returns the total length of the store in bytes.
    /// Fixed for the lifetime of a mount.
    fn len(&self) -> Result<u64>;

    /// Reads exactly buf.len() bytes starting at `offset`.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Writes all of buf starting at `offset`.
    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()>;

    /// Flushes any buffered data to the underlying store.
    fn flush(&self) -> Result<()>;
}

fn out_of_bounds() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "access past the end of the backing store",
    ))
}

/// A volume image on the host file system.
#[derive(Debug)]
pub struct FileStorage {
    inner: Mutex<File>,
}

impl FileStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::options().read(true).write(true).open(path)?;
        Ok(Self { inner: Mutex::new(file) })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, File> {
        // A poisoned lock still guards a valid file handle.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for FileStorage {
    fn len(&self) -> Result<u64> {
        Ok(self.lock().metadata()?.len())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut inner = self.lock();
        inner.seek(SeekFrom::Start(offset))?;
        inner.read_exact(buf)?;
        Ok(())
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        let len = inner.metadata()?.len();
        if offset + buf.len() as u64 > len {
            return Err(out_of_bounds());
        }
        inner.seek(SeekFrom::Start(offset))?;
        inner.write_all(buf)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.flush()?;
        inner.sync_data()?;
        Ok(())
    }
}

/// An in-memory store, handy for tests and scratch volumes.
#[derive(Debug)]
pub struct MemStorage {
    inner: Mutex<Vec<u8>>,
}

impl MemStorage {
    /// Creates a zero-filled store of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self { inner: Mutex::new(vec![0u8; size]) }
    }

    /// Copies out the whole store.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemStorage {
    fn len(&self) -> Result<u64> {
        Ok(self.lock().len() as u64)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let data = self.lock();
        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(buf.len()).ok_or_else(out_of_bounds)?;
        if end > data.len() {
            return Err(out_of_bounds());
        }
        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()> {
        let mut data = self.lock();
        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(buf.len()).ok_or_else(out_of_bounds)?;
        if end > data.len() {
            return Err(out_of_bounds());
        }
        data[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Nothing to do, data is already in memory.
        Ok(())
    }
}
