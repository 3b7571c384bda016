//! Common utilities for tests

#![allow(unused)]

use std::sync::Arc;

use slotfs::{MemStorage, MountedVolume, SLOT_GROUP_BYTES};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($msg:expr) => {
        println!("{}[test] {}{}", crate::common::ORANGE, $msg, crate::common::RESET)
    };
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
}

/// An in-memory volume of `groups` slot groups (8 entries and 8 blocks each).
pub fn ram_volume(groups: u64) -> (Arc<MemStorage>, MountedVolume<MemStorage>) {
    let device = Arc::new(MemStorage::new((groups * SLOT_GROUP_BYTES) as usize));
    let volume = MountedVolume::mount(Arc::clone(&device)).unwrap();
    (device, volume)
}
