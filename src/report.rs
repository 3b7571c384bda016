//! Console tables for the shell: single file info, volume info and the catalog.

use std::fmt;

use crate::config::BLOCK_SIZE;
use crate::{DirEntry, MountedVolume, Result, Storage};

pub struct FileInfo<'a>(pub &'a DirEntry);

impl fmt::Display for FileInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>42} | {:>10} | {:>10} | {:>20} | {:>20}",
            "Filename", "Size", "Read Only", "Date Created", "Last Modified"
        )?;
        let e = self.0;
        write!(
            f,
            "{:>42} | {:>10} | {:>10} | {:>20} | {:>20}",
            e.name, e.size, e.read_only, e.created_at.to_string(), e.modified_at.to_string()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub size: u64,
    pub free_bytes: u64,
    pub file_count: usize,
}

impl VolumeInfo {
    pub fn gather<D: Storage>(volume: &MountedVolume<D>) -> Result<Self> {
        let mut file_count = 0;
        for entry in volume.entries() {
            entry?;
            file_count += 1;
        }
        Ok(Self {
            size: volume.layout().total_bytes,
            free_bytes: volume.free_blocks()? * BLOCK_SIZE as u64,
            file_count,
        })
    }
}

impl fmt::Display for VolumeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} | {:>10} | {:>10}", "Size", "Free Space", "File Count")?;
        write!(f, "{:>10} | {:>10} | {:>10}", self.size, self.free_bytes, self.file_count)
    }
}

pub struct Catalog(pub Vec<DirEntry>);

impl Catalog {
    pub fn gather<D: Storage>(volume: &MountedVolume<D>) -> Result<Self> {
        Ok(Self(volume.entries().collect::<Result<Vec<_>>>()?))
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>42} | {:>10} | {:>10} | {:>25} | {:>25} | {:>12}",
            "Filename", "Size", "Read Only", "Date Created", "Last Modified", "Start Block"
        )?;
        for e in &self.0 {
            write!(
                f,
                "\n{:>42} | {:>10} | {:>10} | {:>25} | {:>25} | {:>12}",
                e.name,
                e.size,
                e.read_only,
                e.created_at.to_string(),
                e.modified_at.to_string(),
                e.start_block
            )?;
        }
        Ok(())
    }
}
