//! Region layout of a volume, derived from nothing but its byte length.
//!
//! Linear layout:
//! - Directory entry table (64-byte slots)
//! - Lock table (1 bit per data block)
//! - Data blocks (4096-byte slots)
//!
//! The three regions are sized in the proportion 512 : 1 : 32768, i.e. one
//! "slot group" of 8 entries, 8 lock bits and 8 blocks per 33281 bytes.

use crate::config::*;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub total_bytes: u64,

    pub dir_offset: u64, // Always 0
    pub dir_bytes: u64,
    pub dir_slots: u64,

    pub bitmap_offset: u64,
    pub bitmap_bytes: u64,

    pub data_offset: u64,
    pub data_blocks: u64,
}

impl Layout {
    /// Splits a store of `total_bytes` into the three regions.
    /// Fails with InvalidLayout if any region would hold no slot at all.
    pub fn compute(total_bytes: u64) -> Result<Self> {
        let dir_bytes = (total_bytes as u128 * DIR_GROUP_BYTES as u128 / SLOT_GROUP_BYTES as u128) as u64;
        let dir_slots = dir_bytes / ENTRY_SIZE as u64;

        let bitmap_offset = dir_bytes;
        let bitmap_bytes = (total_bytes - dir_bytes).div_ceil(SLOT_GROUP_BYTES);

        let data_offset = bitmap_offset + bitmap_bytes;
        let remaining = total_bytes.saturating_sub(data_offset);
        // Keep exactly one lock bit per block, and keep block indices inside the i16 start-block field.
        let data_blocks = (remaining / BLOCK_SIZE as u64)
            .min(bitmap_bytes * 8)
            .min(MAX_BLOCKS);

        if dir_slots == 0 || data_blocks == 0 {
            log::debug!("layout: {} bytes is too small for a volume", total_bytes);
            return Err(Error::InvalidLayout);
        }

        Ok(Self {
            total_bytes,
            dir_offset: 0,
            dir_bytes,
            dir_slots,
            bitmap_offset,
            bitmap_bytes,
            data_offset,
            data_blocks,
        })
    }

    /// Number of lock bits in use, always equal to the data block count.
    pub fn bitmap_bits(&self) -> u64 {
        self.data_blocks
    }

    /// Byte offset of directory slot `index`.
    pub fn dir_slot_offset(&self, index: u64) -> u64 {
        self.dir_offset + index * ENTRY_SIZE as u64
    }

    /// Byte offset of data block `block`.
    pub fn block_offset(&self, block: u64) -> u64 {
        self.data_offset + block * BLOCK_SIZE as u64
    }

    /// Byte span of the data region actually addressable by blocks.
    pub fn data_bytes(&self) -> u64 {
        self.data_blocks * BLOCK_SIZE as u64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_group() {
        let layout = Layout::compute(SLOT_GROUP_BYTES).unwrap();
        assert_eq!(layout.dir_slots, 8);
        assert_eq!(layout.bitmap_bits(), 8);
        assert_eq!(layout.data_blocks, 8);
        assert_eq!(layout.bitmap_offset, 512);
        assert_eq!(layout.bitmap_bytes, 1);
        assert_eq!(layout.data_offset, 513);
        assert_eq!(layout.data_offset + layout.data_bytes(), SLOT_GROUP_BYTES);
    }

    #[test]
    fn test_regions_fit_and_do_not_overlap() {
        for size in [SLOT_GROUP_BYTES, 40_000, 100_000, 1 << 20, 3_328_100, 64 << 20] {
            let layout = Layout::compute(size).unwrap();
            assert!(layout.dir_slots * ENTRY_SIZE as u64 <= layout.bitmap_offset);
            assert!(layout.data_blocks <= layout.bitmap_bytes * 8);
            assert!(layout.bitmap_offset + layout.bitmap_bytes <= layout.data_offset);
            assert!(layout.dir_bytes + layout.bitmap_bytes + layout.data_bytes() <= size);
        }
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(Layout::compute(0), Err(Error::InvalidLayout)));
        assert!(matches!(Layout::compute(4096), Err(Error::InvalidLayout)));
        assert!(matches!(Layout::compute(4160), Err(Error::InvalidLayout)));
        let smallest = Layout::compute(4161).unwrap();
        assert_eq!(smallest.dir_slots, 1);
        assert_eq!(smallest.data_blocks, 1);
    }
}
