use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::Result;

/// An exclusively-held block device (or image file standing in for one).
///
/// The partition-table library drives the `Read`/`Write`/`Seek` surface;
/// geometry and the partition re-scan signal belong to the tool.
pub trait Device: io::Read + io::Write + io::Seek {
    /// Block size in bytes.
    fn block_size(&self) -> u64;

    /// Number of addressable blocks.
    fn block_count(&self) -> u64;

    /// Asks the hosting environment to re-read the partition layout.
    fn rescan_partitions(&mut self) -> Result<()>;
}

#[cfg(feature = "device")]
mod sys {
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    use crate::Result;

    const BLKRRPART: libc::c_ulong = 0x125f;
    const BLKSSZGET: libc::c_ulong = 0x1268;
    const BLKGETSIZE64: libc::c_ulong = 0x8008_1272;

    pub fn geometry(file: &File) -> Result<(u64, u64)> {
        let fd = file.as_raw_fd();

        let mut block_size: libc::c_int = 0;
        if unsafe { libc::ioctl(fd, BLKSSZGET as _, &mut block_size) } < 0 {
            return Err(io::Error::last_os_error().into());
        }

        let mut total_bytes: u64 = 0;
        if unsafe { libc::ioctl(fd, BLKGETSIZE64 as _, &mut total_bytes) } < 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok((block_size as u64, total_bytes))
    }

    pub fn rescan(file: &File) -> Result<()> {
        if unsafe { libc::ioctl(file.as_raw_fd(), BLKRRPART as _) } < 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(())
    }
}

#[cfg(not(feature = "device"))]
mod sys {
    use std::fs::File;

    use crate::{Error, Result};

    pub fn geometry(_file: &File) -> Result<(u64, u64)> {
        Err(Error::NotSupported)
    }

    pub fn rescan(_file: &File) -> Result<()> {
        Err(Error::NotSupported)
    }
}

fn is_block_device(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;

    meta.file_type().is_block_device()
}

/// A device opened from a path: either a real block device (geometry comes
/// from the kernel) or a regular image file (geometry derived from the file
/// length and the caller-supplied sector size).
pub struct RawDevice {
    file: File,
    block_size: u64,
    block_count: u64,
    is_block: bool,
}

impl RawDevice {
    pub fn open(path: &Path, sector_size: u64) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let meta = file.metadata()?;

        let is_block = is_block_device(&meta);
        let (block_size, total_bytes) = if is_block {
            sys::geometry(&file)?
        } else {
            (sector_size, meta.len())
        };

        Ok(Self {
            file,
            block_size,
            block_count: total_bytes / block_size,
            is_block,
        })
    }
}

impl Read for RawDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for RawDevice {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl Write for RawDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Device for RawDevice {
    fn block_size(&self) -> u64 {
        self.block_size
    }

    fn block_count(&self) -> u64 {
        self.block_count
    }

    fn rescan_partitions(&mut self) -> Result<()> {
        if self.is_block {
            sys::rescan(&self.file)
        } else {
            Ok(())
        }
    }
}

/// Memory-backed device, used by tests.
pub struct MemDevice {
    buffer: Cursor<Vec<u8>>,
    block_size: u64,
}

impl MemDevice {
    pub fn new_zeroed(block_size: u64, num_blocks: u64) -> Self {
        let size_in_bytes = block_size as usize * num_blocks as usize;

        Self {
            buffer: Cursor::new(vec![0u8; size_in_bytes]),
            block_size,
        }
    }
}

impl Read for MemDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buffer.read(buf)
    }
}

impl Seek for MemDevice {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.buffer.seek(pos)
    }
}

impl Write for MemDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buffer.flush()
    }
}

impl Device for MemDevice {
    fn block_size(&self) -> u64 {
        self.block_size
    }

    fn block_count(&self) -> u64 {
        self.buffer.get_ref().len() as u64 / self.block_size
    }

    fn rescan_partitions(&mut self) -> Result<()> {
        Ok(())
    }
}
