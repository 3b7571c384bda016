pub const ENTRY_SIZE: usize = 64; // Size of a directory entry slot
pub const BLOCK_SIZE: usize = 4096; // Size of a data block
pub const FILENAME_LEN: usize = 41; // Fixed width of the name field inside an entry

// One "slot group" is 8 directory entries + 8 lock bits (1 byte) + 8 data blocks.
// Volumes are split proportionally to this group.
pub const DIR_GROUP_BYTES: u64 = 8 * ENTRY_SIZE as u64; // 512
pub const LOCK_GROUP_BYTES: u64 = 1;
pub const DATA_GROUP_BYTES: u64 = 8 * BLOCK_SIZE as u64; // 32768
pub const SLOT_GROUP_BYTES: u64 = DIR_GROUP_BYTES + LOCK_GROUP_BYTES + DATA_GROUP_BYTES; // 33281

// Entry field offsets
pub const SIZE_OFFSET: usize = 41;
pub const READ_ONLY_OFFSET: usize = 45;
pub const CREATED_OFFSET: usize = 46;
pub const MODIFIED_OFFSET: usize = 54;
pub const START_BLOCK_OFFSET: usize = 62;

pub const MAX_FILE_SIZE: u64 = i32::MAX as u64; // Size field is a signed 32-bit integer
pub const MAX_BLOCKS: u64 = i16::MAX as u64 + 1; // Start block field is a signed 16-bit integer

pub const PROMPT_SUFFIX: &str = ":> ";
