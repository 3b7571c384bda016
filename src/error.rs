use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("File not found!")]
    NotFound,

    #[error("Permission denied: file is read-only.")]
    PermissionDenied,

    #[error("No space left on volume.")]
    NoSpace,

    #[error("Invalid range.")]
    InvalidRange,

    #[error("Volume is too small to hold a directory, lock table and data region.")]
    InvalidLayout,

    #[error("Invalid file name.")]
    InvalidFileName,

    #[error("A volume is already mounted.")]
    AlreadyMounted,

    #[error("No volume is mounted.")]
    NotMounted,

    #[error("Volume not found: {}", .0.display())]
    VolumeNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, VolumeError>;
