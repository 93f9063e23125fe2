//! RIFF chunk primitives and deferred length-field patching
//!
//! RIFF sizes chunks top-down but their lengths are only known bottom-up, so
//! every chunk whose size cannot be precomputed gets a 4-byte placeholder
//! that is patched once the content has been written. Open placeholders form
//! a LIFO stack mirroring the format's nested-list structure.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::sink::ByteSink;
use crate::Result;

/// Writes RIFF primitives to a [`ByteSink`] and tracks open length fields.
pub struct ChunkWriter<S: ByteSink> {
    sink: S,
    length_fields: Vec<u64>,
}

impl<S: ByteSink> ChunkWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            length_fields: Vec::with_capacity(8),
        }
    }

    /// Write a four-character chunk tag.
    pub fn write_tag(&mut self, tag: &[u8; 4]) -> Result<()> {
        self.sink.write_all(tag)?;
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.sink.write_u32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.sink.write_i32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.sink.write_u16::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_all(bytes)?;
        Ok(())
    }

    /// Current write position of the underlying sink.
    pub fn offset(&mut self) -> Result<u64> {
        Ok(self.sink.offset()?)
    }

    /// Overwrite a previously written 4-byte field, keeping the cursor at
    /// the current end of the data.
    pub fn patch_u32(&mut self, pos: u64, value: u32) -> Result<()> {
        self.sink.patch_u32_le(pos, value)?;
        Ok(())
    }

    /// Reserve a 4-byte length field at the current position and push it
    /// onto the stack of fields awaiting [`close_length_field`].
    ///
    /// [`close_length_field`]: ChunkWriter::close_length_field
    pub fn open_length_field(&mut self) -> Result<()> {
        let pos = self.sink.offset()?;
        self.length_fields.push(pos);
        self.sink.write_u32::<LittleEndian>(0)?;
        Ok(())
    }

    /// Close the most recently opened length field, patching it with the
    /// number of bytes written since (excluding the field itself).
    ///
    /// RIFF chunks are 2-byte aligned: an odd-length payload gets one
    /// trailing pad byte, which is not counted in the patched size. The
    /// cursor is left at the (padded) end. Returns the patched size.
    ///
    /// # Panics
    ///
    /// Panics if no length field is open.
    pub fn close_length_field(&mut self) -> Result<u32> {
        let field_pos = self
            .length_fields
            .pop()
            .expect("close_length_field with no open length field");
        let mut end = self.sink.offset()?;
        let size = (end - field_pos - 4) as u32;

        if end & 1 != 0 {
            self.sink.write_all(&[0])?;
            end += 1;
        }
        self.sink.patch_u32_le(field_pos, size)?;

        debug_assert_eq!(self.sink.offset()?, end);
        Ok(size)
    }

    /// Number of length fields still awaiting their size.
    pub fn open_fields(&self) -> usize {
        self.length_fields.len()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}
