//! Whole-image operations on volume files in the host file system.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::config::BLOCK_SIZE;
use crate::{Error, Result};

fn require(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::VolumeNotFound(path.to_path_buf()))
    }
}

fn write_zeros(out: &mut impl Write, mut size: u64) -> Result<()> {
    let zeros = [0u8; BLOCK_SIZE];
    while size > 0 {
        let chunk = size.min(BLOCK_SIZE as u64) as usize;
        out.write_all(&zeros[..chunk])?;
        size -= chunk as u64;
    }
    Ok(())
}

/// Creates (or overwrites) an image of `size` zero bytes.
pub fn allocate(path: impl AsRef<Path>, size: u64) -> Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    write_zeros(&mut out, size)?;
    out.flush()?;
    log::info!("allocated {} ({} bytes)", path.as_ref().display(), size);
    Ok(())
}

/// Removes an image.
pub fn deallocate(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    require(path)?;
    fs::remove_file(path)?;
    log::info!("deallocated {}", path.display());
    Ok(())
}

/// Zeroes an existing image, keeping its length.
pub fn truncate(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    require(path)?;
    let file = File::options().write(true).open(path)?;
    let size = file.metadata()?.len();
    let mut out = BufWriter::new(file);
    write_zeros(&mut out, size)?;
    out.flush()?;
    log::info!("truncated {}", path.display());
    Ok(())
}

/// Writes every byte of the image as two upper-case hex digits.
pub fn dump(path: impl AsRef<Path>, out: &mut impl Write) -> Result<()> {
    let path = path.as_ref();
    require(path)?;
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = [0u8; BLOCK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        for byte in &buf[..n] {
            write!(out, "{:02X}", byte)?;
        }
    }
    out.flush()?;
    Ok(())
}
