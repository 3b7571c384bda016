//! The directory entry table: a flat array of 64-byte slots at the start of the volume.
//! Callers address entries by absolute byte offset, obtained from a lookup.

use crate::config::*;
use crate::layout::Layout;
use crate::structs::{slot_in_use, trim_name, DirEntry};
use crate::{Result, Storage};

fn read_slot(device: &impl Storage, offset: u64) -> Result<[u8; ENTRY_SIZE]> {
    let mut buf = [0u8; ENTRY_SIZE];
    device.read_at(offset, &mut buf)?;
    Ok(buf)
}

fn name_cmp(n1: &[u8], n2: &[u8]) -> bool {
    trim_name(n1) == trim_name(n2)
}

/// Returns the byte offset of the slot holding `name`, comparing trimmed names case-sensitively.
pub fn find_offset(device: &impl Storage, layout: &Layout, name: &str) -> Result<Option<u64>> {
    if trim_name(name.as_bytes()).is_empty() {
        return Ok(None);
    }

    let mut name_buf = [0u8; FILENAME_LEN];
    for i in 0..layout.dir_slots {
        let offset = layout.dir_slot_offset(i);
        device.read_at(offset, &mut name_buf)?;
        if name_cmp(&name_buf, name.as_bytes()) {
            return Ok(Some(offset));
        }
    }

    Ok(None)
}

/// Returns the byte offset of the first unused slot.
pub fn find_empty_slot(device: &impl Storage, layout: &Layout) -> Result<Option<u64>> {
    for i in 0..layout.dir_slots {
        let offset = layout.dir_slot_offset(i);
        if !slot_in_use(&read_slot(device, offset)?) {
            return Ok(Some(offset));
        }
    }
    Ok(None)
}

/// Decodes the slot at `offset`. Does not check that the slot is in use.
pub fn read_entry_at(device: &impl Storage, offset: u64) -> Result<DirEntry> {
    Ok(DirEntry::from_bytes(&read_slot(device, offset)?))
}

pub fn write_entry_at(device: &impl Storage, offset: u64, entry: &DirEntry) -> Result<()> {
    device.write_at(offset, &entry.to_bytes())
}

/// Zeroes the whole slot at `offset`.
pub fn clear_entry_at(device: &impl Storage, offset: u64) -> Result<()> {
    device.write_at(offset, &[0u8; ENTRY_SIZE])
}

/// Lazy scan over the in-use slots, in slot order.
/// Each call to `entries` starts a fresh scan of the store.
pub struct Entries<'a, D: Storage> {
    device: &'a D,
    layout: Layout,
    next_slot: u64,
}

pub fn entries<'a, D: Storage>(device: &'a D, layout: &Layout) -> Entries<'a, D> {
    Entries { device, layout: *layout, next_slot: 0 }
}

impl<D: Storage> Iterator for Entries<'_, D> {
    type Item = Result<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_slot < self.layout.dir_slots {
            let offset = self.layout.dir_slot_offset(self.next_slot);
            self.next_slot += 1;
            match read_slot(self.device, offset) {
                Ok(raw) if slot_in_use(&raw) => return Some(Ok(DirEntry::from_bytes(&raw))),
                Ok(_) => continue,
                Err(e) => {
                    // Stop after reporting the failure once.
                    self.next_slot = self.layout.dir_slots;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemStorage;

    fn setup() -> (MemStorage, Layout) {
        let size = SLOT_GROUP_BYTES;
        (MemStorage::new(size as usize), Layout::compute(size).unwrap())
    }

    #[test]
    fn test_name_cmp() {
        assert_eq!(name_cmp(b"test", b"test"), true);
        assert_eq!(name_cmp(b"test   ", b" test"), true);
        assert_eq!(name_cmp(b"test", b"test1"), false);
        assert_eq!(name_cmp(b"test", b"Test"), false);
    }

    #[test]
    fn test_lookup_and_slots() {
        let (device, layout) = setup();
        assert_eq!(find_empty_slot(&device, &layout).unwrap(), Some(0));
        assert_eq!(find_offset(&device, &layout, "a.txt").unwrap(), None);

        write_entry_at(&device, 0, &DirEntry::new("a.txt", 0).unwrap()).unwrap();
        write_entry_at(&device, 128, &DirEntry::new("c.txt", 2).unwrap()).unwrap();

        assert_eq!(find_empty_slot(&device, &layout).unwrap(), Some(64));
        assert_eq!(find_offset(&device, &layout, "c.txt").unwrap(), Some(128));
        assert_eq!(find_offset(&device, &layout, " c.txt ").unwrap(), Some(128));
        assert_eq!(find_offset(&device, &layout, "").unwrap(), None);
        assert_eq!(read_entry_at(&device, 128).unwrap().start_block, 2);

        clear_entry_at(&device, 0).unwrap();
        assert_eq!(find_empty_slot(&device, &layout).unwrap(), Some(0));
        assert_eq!(find_offset(&device, &layout, "a.txt").unwrap(), None);
    }

    #[test]
    fn test_entries_in_slot_order() {
        let (device, layout) = setup();
        for (slot, name) in [(5, "e"), (1, "b"), (7, "h")] {
            write_entry_at(&device, layout.dir_slot_offset(slot), &DirEntry::new(name, 0).unwrap()).unwrap();
        }
        let names: Vec<String> = entries(&device, &layout).map(|e| e.unwrap().name).collect();
        assert_eq!(names, ["b", "e", "h"]);

        // Restartable: a second scan sees new state
        clear_entry_at(&device, layout.dir_slot_offset(5)).unwrap();
        assert_eq!(entries(&device, &layout).count(), 2);
    }

    #[test]
    fn test_full_directory() {
        let (device, layout) = setup();
        for i in 0..layout.dir_slots {
            let entry = DirEntry::new(&format!("f{}", i), 0).unwrap();
            write_entry_at(&device, layout.dir_slot_offset(i), &entry).unwrap();
        }
        assert_eq!(find_empty_slot(&device, &layout).unwrap(), None);
    }
}
