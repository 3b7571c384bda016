//! slotfs emulates a single-file virtual volume: one flat backing file that holds
//! a directory entry table, a lock table (one bit per block) and fixed-size data blocks.
//! Files are flat (no directories) and each occupies one contiguous run of blocks.
//!
//! Volume linear layout:
//! - Directory entries (64 bytes each)
//! - Lock table (1 bit per data block)
//! - Data blocks (4096 bytes each)
//!
//! Layers (from bottom to top):
//! 1. Storage: byte-addressed backing store (file or memory).
//! 2. Layout: region offsets computed from the store length at mount time.
//! 3. Bitmap / Directory: lock table allocator and directory slot access.
//! 4. File: byte ranges inside a block run.
//! 5. MountedVolume: create, delete, truncate, write, read, set read-only.
//! 6. Session / Shell: single-mount session and the interactive command loop.

mod config;
mod storage;
mod layout;
mod structs;
mod bitmap;
mod directory;
mod file;
mod fs;
mod session;
mod error;
pub mod image;
pub mod report;
pub mod shell;

pub use storage::{FileStorage, MemStorage, Storage};
pub use config::*;
pub use layout::Layout;
pub use structs::{validate_name, DirEntry, Timestamp};
pub use bitmap::{alloc_blocks, count_free, find_free_run, free_blocks, set_range};
pub use directory::{find_empty_slot, find_offset, read_entry_at, write_entry_at, Entries};
pub use fs::MountedVolume;
pub use session::Session;
pub use error::VolumeError as Error;
pub use error::Result;
