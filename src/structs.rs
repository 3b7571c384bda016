use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::*;
use crate::{Error, Result};

/// Opaque 64-bit instant stored in an entry: microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => Self(d.as_micros() as i64),
            Err(e) => Self(-(e.duration().as_micros() as i64)),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.div_euclid(1_000_000);
        let micros = self.0.rem_euclid(1_000_000);
        write!(f, "{}.{:06}", secs, micros)
    }
}

/// Metadata of one file, stored in a 64-byte directory slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub size: u32,
    pub read_only: bool,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub start_block: u16,
}

impl DirEntry {
    /// A fresh, empty, writable file starting at `start_block`.
    pub fn new(name: &str, start_block: u16) -> Result<Self> {
        validate_name(name)?;
        let now = Timestamp::now();
        Ok(Self {
            name: name.to_string(),
            size: 0,
            read_only: false,
            created_at: now,
            modified_at: now,
            start_block,
        })
    }

    /// Blocks held by this entry. An empty file still owns one block.
    pub fn num_blocks(&self) -> u64 {
        blocks_for(self.size as u64).max(1)
    }

    /// Decodes a raw slot. Never fails on content: an all-zero slot decodes
    /// to an entry with an empty name, which callers treat as unused.
    pub fn from_bytes(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let name = trim_name(&bytes[..FILENAME_LEN])
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect();
        let size = i32::from_le_bytes(field(bytes, SIZE_OFFSET));
        let created = i64::from_le_bytes(field(bytes, CREATED_OFFSET));
        let modified = i64::from_le_bytes(field(bytes, MODIFIED_OFFSET));
        let start_block = i16::from_le_bytes(field(bytes, START_BLOCK_OFFSET));

        Self {
            name,
            size: size.max(0) as u32,
            read_only: bytes[READ_ONLY_OFFSET] != 0,
            created_at: Timestamp(created),
            modified_at: Timestamp(modified),
            start_block: start_block.max(0) as u16,
        }
    }

    /// Encodes into a raw slot, space-padding the name.
    /// The name must already have passed validation.
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut bytes = [0u8; ENTRY_SIZE];
        bytes[..FILENAME_LEN].fill(b' ');
        let name = self.name.as_bytes();
        let len = name.len().min(FILENAME_LEN);
        bytes[..len].copy_from_slice(&name[..len]);

        bytes[SIZE_OFFSET..READ_ONLY_OFFSET].copy_from_slice(&(self.size as i32).to_le_bytes());
        bytes[READ_ONLY_OFFSET] = self.read_only as u8;
        bytes[CREATED_OFFSET..MODIFIED_OFFSET].copy_from_slice(&self.created_at.0.to_le_bytes());
        bytes[MODIFIED_OFFSET..START_BLOCK_OFFSET].copy_from_slice(&self.modified_at.0.to_le_bytes());
        bytes[START_BLOCK_OFFSET..].copy_from_slice(&(self.start_block as i16).to_le_bytes());
        bytes
    }
}

fn field<const N: usize>(bytes: &[u8; ENTRY_SIZE], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

/// Number of blocks needed to hold `size` bytes, rounded up.
pub fn blocks_for(size: u64) -> u64 {
    size.div_ceil(BLOCK_SIZE as u64)
}

fn is_blank(b: u8) -> bool {
    b == 0 || b == b' '
}

/// Strips padding (spaces and NULs) from both ends of a name field.
pub fn trim_name(name: &[u8]) -> &[u8] {
    let start = name.iter().position(|&b| !is_blank(b)).unwrap_or(name.len());
    let end = name.iter().rposition(|&b| !is_blank(b)).map_or(start, |i| i + 1);
    &name[start..end]
}

/// A slot is in use iff its name field holds a non-blank character.
pub fn slot_in_use(bytes: &[u8; ENTRY_SIZE]) -> bool {
    bytes[..FILENAME_LEN].iter().any(|&b| !is_blank(b))
}

/// Names are 1..=41 printable ASCII characters without spaces.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > FILENAME_LEN {
        return Err(Error::InvalidFileName);
    }
    if !name.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(Error::InvalidFileName);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> DirEntry {
        DirEntry {
            name: "notes.txt".to_string(),
            size: 5000,
            read_only: true,
            created_at: Timestamp(1_700_000_000_123_456),
            modified_at: Timestamp(1_700_000_100_000_001),
            start_block: 3,
        }
    }

    #[test]
    fn test_entry_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(&bytes[..9], b"notes.txt");
        assert!(bytes[9..FILENAME_LEN].iter().all(|&b| b == b' '));
        assert_eq!(&bytes[41..45], &5000i32.to_le_bytes());
        assert_eq!(bytes[45], 1);
        assert_eq!(&bytes[62..64], &3i16.to_le_bytes());
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = sample();
        assert_eq!(DirEntry::from_bytes(&entry.to_bytes()), entry);
    }

    #[test]
    fn test_zero_slot_decodes() {
        let zero = [0u8; ENTRY_SIZE];
        let entry = DirEntry::from_bytes(&zero);
        assert!(entry.name.is_empty());
        assert_eq!(entry.size, 0);
        assert!(!entry.read_only);
        assert!(!slot_in_use(&zero));
    }

    #[test]
    fn test_in_use_ignores_other_fields() {
        let mut raw = [0u8; ENTRY_SIZE];
        raw[50] = 0xff;
        assert!(!slot_in_use(&raw));
        raw[0] = b'a';
        assert!(slot_in_use(&raw));
    }

    #[test]
    fn test_trim_name() {
        assert_eq!(trim_name(b"  abc  \0\0"), b"abc");
        assert_eq!(trim_name(b"\0\0\0"), b"");
        assert_eq!(trim_name(b"a b"), b"a b");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("test.txt").is_ok());
        assert!(validate_name(&"x".repeat(FILENAME_LEN)).is_ok());
        assert!(validate_name(&"x".repeat(FILENAME_LEN + 1)).is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("caf\u{e9}").is_err());
    }

    #[test]
    fn test_num_blocks() {
        let mut entry = sample();
        entry.size = 0;
        assert_eq!(entry.num_blocks(), 1);
        entry.size = 4096;
        assert_eq!(entry.num_blocks(), 1);
        entry.size = 4097;
        assert_eq!(entry.num_blocks(), 2);
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(Timestamp(1_500_000).to_string(), "1.500000");
        assert_eq!(Timestamp(-1).to_string(), "-1.999999");
    }
}
