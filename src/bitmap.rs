//! Management of the lock table, one bit per data block (1 = allocated).
//! Bit `i` lives in byte `i / 8` of the lock region, at bit position `i % 8`
//! counted from the least significant bit.
//! There is no in-memory free list: every call re-reads the table from the store.

use crate::layout::Layout;
use crate::{Error, Result, Storage};

fn read_bitmap(device: &impl Storage, layout: &Layout) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; layout.bitmap_bytes as usize];
    device.read_at(layout.bitmap_offset, &mut buf)?;
    Ok(buf)
}

fn bit_is_set(bitmap: &[u8], index: u64) -> bool {
    bitmap[(index / 8) as usize] & (1 << (index % 8)) != 0
}

/// Finds the first (lowest index) run of at least `length` clear bits.
/// Returns the index of the first bit of the run.
pub fn find_free_run(device: &impl Storage, layout: &Layout, length: u64) -> Result<Option<u64>> {
    if length == 0 {
        return Ok(None);
    }

    let bitmap = read_bitmap(device, layout)?;
    let mut run = 0;
    for i in 0..layout.bitmap_bits() {
        if bit_is_set(&bitmap, i) {
            run = 0;
            continue;
        }
        run += 1;
        if run >= length {
            return Ok(Some(i + 1 - run));
        }
    }

    Ok(None)
}

/// Sets `length` consecutive bits starting at `start` to `value`.
/// The range may straddle byte boundaries. A zero length is a no-op.
pub fn set_range(
    device: &impl Storage,
    layout: &Layout,
    start: u64,
    length: u64,
    value: bool,
) -> Result<()> {
    if length == 0 {
        return Ok(());
    }
    let end = start.checked_add(length).ok_or(Error::InvalidRange)?;
    if end > layout.bitmap_bits() {
        return Err(Error::InvalidRange);
    }

    let first_byte = start / 8;
    let last_byte = (end - 1) / 8;
    let mut buf = vec![0u8; (last_byte - first_byte + 1) as usize];
    device.read_at(layout.bitmap_offset + first_byte, &mut buf)?;

    for i in start..end {
        let byte = &mut buf[(i / 8 - first_byte) as usize];
        if value {
            *byte |= 1 << (i % 8);
        } else {
            *byte &= !(1 << (i % 8));
        }
    }

    device.write_at(layout.bitmap_offset + first_byte, &buf)?;
    Ok(())
}

/// Reserves the first free run of `length` blocks.
/// Returns None, leaving the table untouched, when no run is big enough.
pub fn alloc_blocks(device: &impl Storage, layout: &Layout, length: u64) -> Result<Option<u64>> {
    let start = match find_free_run(device, layout, length)? {
        Some(start) => start,
        None => {
            log::debug!("alloc_blocks: no free run of {} blocks", length);
            return Ok(None);
        }
    };
    set_range(device, layout, start, length, true)?;
    log::trace!("alloc_blocks: reserved blocks {}..{}", start, start + length);
    Ok(Some(start))
}

/// Releases a run of blocks.
/// No ownership tracking: the caller passes back exactly the run it was given.
pub fn free_blocks(device: &impl Storage, layout: &Layout, start: u64, length: u64) -> Result<()> {
    set_range(device, layout, start, length, false)?;
    log::trace!("free_blocks: released blocks {}..{}", start, start + length);
    Ok(())
}

/// Counts clear bits in the table.
pub fn count_free(device: &impl Storage, layout: &Layout) -> Result<u64> {
    let bitmap = read_bitmap(device, layout)?;
    Ok((0..layout.bitmap_bits()).filter(|&i| !bit_is_set(&bitmap, i)).count() as u64)
}
