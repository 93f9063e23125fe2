//! minavi - Minimal streaming MJPEG AVI writer
//!
//! Builds an `.avi` file one frame at a time: JPEG-encoded frames (or images
//! encoded on the fly) are streamed straight to disk, and finalization
//! back-patches the RIFF length fields and appends the seek index. Only the
//! index (16 bytes per frame) is held in memory.
//!
//! ```no_run
//! use minavi::AviWriter;
//!
//! # fn main() -> minavi::Result<()> {
//! let mut writer = AviWriter::create("out.avi", 640, 480, 25)?;
//! for jpeg in frames() {
//!     writer.add_jpeg(&jpeg)?;
//! }
//! writer.finalize()?;
//! # Ok(())
//! # }
//! # fn frames() -> Vec<Vec<u8>> { Vec::new() }
//! ```

pub mod chunk;
pub mod error;
pub mod index;
pub mod sink;

mod writer;

pub use error::{Error, Result};
pub use index::IndexEntry;
pub use sink::ByteSink;
pub use writer::AviWriter;
