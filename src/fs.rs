use std::sync::Arc;

use crate::bitmap::{alloc_blocks, count_free, free_blocks, set_range};
use crate::directory::{self, clear_entry_at, find_empty_slot, find_offset, read_entry_at, write_entry_at, Entries};
use crate::file::{fread, fwrite, relocate, zero_fill};
use crate::layout::Layout;
use crate::structs::{blocks_for, validate_name, DirEntry, Timestamp};
use crate::config::*;
use crate::{Error, Result, Storage};

/// A mounted volume: the backing store plus the layout computed at mount time.
/// All operations go straight to the store; nothing is cached between calls.
#[derive(Debug)]
pub struct MountedVolume<D: Storage> {
    device: Arc<D>,
    layout: Layout,
}

impl<D: Storage> MountedVolume<D> {
    pub fn mount(device: Arc<D>) -> Result<Self> {
        let layout = Layout::compute(device.len()?)?;
        log::debug!(
            "mount: {} bytes, {} entries, {} blocks",
            layout.total_bytes, layout.dir_slots, layout.data_blocks
        );
        Ok(Self { device, layout })
    }

    /// Flushes the store and releases this handle.
    pub fn unmount(self) -> Result<()> {
        self.device.flush()
    }

    /// Creates an empty file holding one block.
    /// An existing file of the same name is truncated instead.
    pub fn create(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        if find_offset(&*self.device, &self.layout, name)?.is_some() {
            return self.truncate(name);
        }

        let offset = find_empty_slot(&*self.device, &self.layout)?.ok_or_else(|| {
            log::debug!("create {}: directory is full", name);
            Error::NoSpace
        })?;
        let block = alloc_blocks(&*self.device, &self.layout, 1)?.ok_or(Error::NoSpace)?;

        let entry = DirEntry::new(name, block as u16)?;
        write_entry_at(&*self.device, offset, &entry)?;
        self.device.flush()?;
        log::debug!("create {}: slot offset {}, block {}", name, offset, block);
        Ok(())
    }

    /// Removes a file, releasing its blocks and zeroing its directory slot.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let (offset, entry) = self.find_writable(name)?;

        free_blocks(&*self.device, &self.layout, entry.start_block as u64, entry.num_blocks())?;
        clear_entry_at(&*self.device, offset)?;
        self.device.flush()?;
        log::debug!("delete {}: released {} blocks", name, entry.num_blocks());
        Ok(())
    }

    /// Drops a file's content, leaving it empty on a single block.
    /// The entry keeps its slot and stored name.
    pub fn truncate(&mut self, name: &str) -> Result<()> {
        let (offset, old) = self.find_writable(name)?;
        let old_start = old.start_block as u64;

        free_blocks(&*self.device, &self.layout, old_start, old.num_blocks())?;
        let block = match alloc_blocks(&*self.device, &self.layout, 1)? {
            Some(block) => block,
            None => {
                set_range(&*self.device, &self.layout, old_start, old.num_blocks(), true)?;
                return Err(Error::NoSpace);
            }
        };

        let now = Timestamp::now();
        let entry = DirEntry {
            name: old.name.clone(),
            size: 0,
            read_only: false,
            created_at: now,
            modified_at: now,
            start_block: block as u16,
        };
        write_entry_at(&*self.device, offset, &entry)?;
        self.device.flush()?;
        log::debug!(
            "truncate {}: released {} blocks, now at block {}",
            entry.name, old.num_blocks(), block
        );
        Ok(())
    }

    /// Writes `data` at `start`, growing (and if needed relocating) the block run.
    /// Any gap between the old end of file and `start` reads back as zeros.
    pub fn write(&mut self, name: &str, start: i64, data: &[u8]) -> Result<()> {
        let (offset, mut entry) = self.find_writable(name)?;

        let start = u64::try_from(start).map_err(|_| Error::InvalidRange)?;
        let end = start
            .checked_add(data.len() as u64)
            .filter(|&end| end <= MAX_FILE_SIZE)
            .ok_or(Error::InvalidRange)?;
        let old_size = entry.size as u64;

        let old_blocks = entry.num_blocks();
        let new_blocks = blocks_for(end).max(1);
        if new_blocks > old_blocks {
            self.grow(&mut entry, old_blocks, new_blocks)?;
        }

        if start > old_size {
            zero_fill(&*self.device, &self.layout, entry.start_block, old_size, start)?;
        }
        fwrite(&*self.device, &self.layout, entry.start_block, start, data)?;

        entry.size = old_size.max(end) as u32;
        entry.modified_at = Timestamp::now();
        write_entry_at(&*self.device, offset, &entry)?;
        self.device.flush()?;
        Ok(())
    }

    /// Moves the entry onto a run of `new_blocks` blocks, copying its content if the run moved.
    /// On NoSpace the old run is reserved again and nothing else changes.
    fn grow(&mut self, entry: &mut DirEntry, old_blocks: u64, new_blocks: u64) -> Result<()> {
        let old_start = entry.start_block as u64;
        free_blocks(&*self.device, &self.layout, old_start, old_blocks)?;

        let new_start = match alloc_blocks(&*self.device, &self.layout, new_blocks)? {
            Some(start) => start,
            None => {
                set_range(&*self.device, &self.layout, old_start, old_blocks, true)?;
                log::debug!("write {}: cannot grow to {} blocks", entry.name, new_blocks);
                return Err(Error::NoSpace);
            }
        };

        if new_start != old_start {
            relocate(
                &*self.device,
                &self.layout,
                entry.start_block,
                new_start as u16,
                entry.size as u64,
            )?;
            entry.start_block = new_start as u16;
        }
        log::debug!(
            "write {}: grew from {} to {} blocks at block {}",
            entry.name, old_blocks, new_blocks, new_start
        );
        Ok(())
    }

    /// Reads the bytes in `start..end`, with `end` clamped to the file size.
    /// Read-only files can be read.
    pub fn read(&self, name: &str, start: i64, end: i64) -> Result<Vec<u8>> {
        let entry = self.lookup(name)?;
        if start < 0 {
            return Err(Error::InvalidRange);
        }

        let end = end.min(entry.size as i64);
        let length = end.saturating_sub(start).max(0) as u64;
        fread(&*self.device, &self.layout, entry.start_block, start as u64, length)
    }

    /// Sets the read-only flag. The modified time only changes if the flag does.
    pub fn set_read_only(&mut self, name: &str, value: bool) -> Result<()> {
        let offset = find_offset(&*self.device, &self.layout, name)?.ok_or(Error::NotFound)?;
        let mut entry = read_entry_at(&*self.device, offset)?;

        if entry.read_only != value {
            entry.read_only = value;
            entry.modified_at = Timestamp::now();
            write_entry_at(&*self.device, offset, &entry)?;
            self.device.flush()?;
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<DirEntry> {
        let offset = find_offset(&*self.device, &self.layout, name)?.ok_or(Error::NotFound)?;
        read_entry_at(&*self.device, offset)
    }

    /// Lazily scans the in-use directory entries.
    pub fn entries(&self) -> Entries<'_, D> {
        directory::entries(&*self.device, &self.layout)
    }

    /// Number of unallocated data blocks.
    pub fn free_blocks(&self) -> Result<u64> {
        count_free(&*self.device, &self.layout)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn find_writable(&self, name: &str) -> Result<(u64, DirEntry)> {
        let offset = find_offset(&*self.device, &self.layout, name)?.ok_or(Error::NotFound)?;
        let entry = read_entry_at(&*self.device, offset)?;
        if entry.read_only {
            return Err(Error::PermissionDenied);
        }
        Ok((offset, entry))
    }
}
