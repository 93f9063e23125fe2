//! Seekable byte sink abstraction

use std::io::{self, Seek, SeekFrom, Write};

/// A growable, seekable byte output.
///
/// The container writer appends through `Write`, asks for its position with
/// [`offset`](ByteSink::offset), and overwrites previously written length
/// fields with [`patch_u32_le`](ByteSink::patch_u32_le). Any `Write + Seek`
/// type qualifies; production uses `BufWriter<File>`, tests use
/// `Cursor<Vec<u8>>`.
pub trait ByteSink: Write + Seek {
    /// Current write position.
    fn offset(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    /// Overwrite 4 bytes at `pos` with `value` (little-endian), then return
    /// to the previous position.
    fn patch_u32_le(&mut self, pos: u64, value: u32) -> io::Result<()> {
        let end = self.stream_position()?;
        self.seek(SeekFrom::Start(pos))?;
        self.write_all(&value.to_le_bytes())?;
        self.seek(SeekFrom::Start(end))?;
        Ok(())
    }
}

impl<T: Write + Seek> ByteSink for T {}
