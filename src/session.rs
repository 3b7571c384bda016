//! At most one volume image is mounted per session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{Error, FileStorage, MountedVolume, Result};

#[derive(Default)]
pub struct Session {
    mounted: Option<(PathBuf, MountedVolume<FileStorage>)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the image at `path` and computes its layout.
    pub fn mount(&mut self, path: impl AsRef<Path>) -> Result<&mut MountedVolume<FileStorage>> {
        let path = path.as_ref();
        if self.mounted.is_some() {
            return Err(Error::AlreadyMounted);
        }
        if !path.is_file() {
            return Err(Error::VolumeNotFound(path.to_path_buf()));
        }

        let volume = MountedVolume::mount(Arc::new(FileStorage::open(path)?))?;
        log::info!("mounted {}", path.display());
        let (_, volume) = self.mounted.insert((path.to_path_buf(), volume));
        Ok(volume)
    }

    /// Flushes and closes the mounted image.
    pub fn unmount(&mut self) -> Result<()> {
        let (path, volume) = self.mounted.take().ok_or(Error::NotMounted)?;
        volume.unmount()?;
        log::info!("unmounted {}", path.display());
        Ok(())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.mounted.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn volume(&self) -> Result<&MountedVolume<FileStorage>> {
        self.mounted.as_ref().map(|(_, v)| v).ok_or(Error::NotMounted)
    }

    pub fn volume_mut(&mut self) -> Result<&mut MountedVolume<FileStorage>> {
        self.mounted.as_mut().map(|(_, v)| v).ok_or(Error::NotMounted)
    }
}
