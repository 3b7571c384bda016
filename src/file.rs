//! Byte-level access to a file's contiguous block run.
//! Offsets passed here are relative to the start of the file; bounds against the
//! entry's size and block count are checked by the caller.

use crate::config::BLOCK_SIZE;
use crate::layout::Layout;
use crate::{Result, Storage};

fn run_offset(layout: &Layout, start_block: u16, offset: u64) -> u64 {
    layout.block_offset(start_block as u64) + offset
}

/// Reads `length` bytes at `offset` within the run starting at `start_block`.
pub fn fread(
    device: &impl Storage,
    layout: &Layout,
    start_block: u16,
    offset: u64,
    length: u64,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; length as usize];
    if length > 0 {
        device.read_at(run_offset(layout, start_block, offset), &mut buf)?;
    }
    Ok(buf)
}

/// Writes `data` at `offset` within the run starting at `start_block`.
pub fn fwrite(
    device: &impl Storage,
    layout: &Layout,
    start_block: u16,
    offset: u64,
    data: &[u8],
) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    device.write_at(run_offset(layout, start_block, offset), data)
}

/// Zeroes the file range `from..to`, one block-sized chunk at a time.
pub fn zero_fill(
    device: &impl Storage,
    layout: &Layout,
    start_block: u16,
    from: u64,
    to: u64,
) -> Result<()> {
    let zeros = [0u8; BLOCK_SIZE];
    let mut pos = from;
    while pos < to {
        let chunk = (to - pos).min(BLOCK_SIZE as u64);
        device.write_at(run_offset(layout, start_block, pos), &zeros[..chunk as usize])?;
        pos += chunk;
    }
    Ok(())
}

/// Copies the first `length` bytes of one run to another.
/// The source is read in full before writing, so overlapping runs are safe.
pub fn relocate(
    device: &impl Storage,
    layout: &Layout,
    from_block: u16,
    to_block: u16,
    length: u64,
) -> Result<()> {
    if from_block == to_block {
        return Ok(());
    }
    let content = fread(device, layout, from_block, 0, length)?;
    fwrite(device, layout, to_block, 0, &content)?;
    log::debug!(
        "relocate: moved {} bytes from block {} to block {}",
        length, from_block, to_block
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::SLOT_GROUP_BYTES;
    use crate::MemStorage;

    #[test]
    fn test_relocate_overlapping() {
        let layout = Layout::compute(SLOT_GROUP_BYTES).unwrap();
        let device = MemStorage::new(SLOT_GROUP_BYTES as usize);
        let content: Vec<u8> = (0..6000u32).map(|i| (i % 251) as u8).collect();
        fwrite(&device, &layout, 1, 0, &content).unwrap();

        // Destination run 0..3 overlaps source run 1..3
        relocate(&device, &layout, 1, 0, content.len() as u64).unwrap();
        assert_eq!(fread(&device, &layout, 0, 0, 6000).unwrap(), content);
    }

    #[test]
    fn test_zero_fill_spans_blocks() {
        let layout = Layout::compute(SLOT_GROUP_BYTES).unwrap();
        let device = MemStorage::new(SLOT_GROUP_BYTES as usize);
        fwrite(&device, &layout, 2, 0, &vec![0xaa; 3 * BLOCK_SIZE]).unwrap();
        zero_fill(&device, &layout, 2, 100, 9000).unwrap();

        let data = fread(&device, &layout, 2, 0, 3 * BLOCK_SIZE as u64).unwrap();
        assert!(data[..100].iter().all(|&b| b == 0xaa));
        assert!(data[100..9000].iter().all(|&b| b == 0));
        assert!(data[9000..].iter().all(|&b| b == 0xaa));
    }
}
