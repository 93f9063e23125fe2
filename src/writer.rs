//! Streaming MJPEG AVI writer
//!
//! The header is written once at construction, leaving the `movi` list's
//! length field open for the lifetime of the writer. Each frame appends one
//! `00dc` chunk and one index entry; `finalize` closes the remaining length
//! fields, appends the `idx1` chunk, and back-patches the two frame-count
//! fields whose positions were remembered while writing the header.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::chunk::ChunkWriter;
use crate::index::IndexBuilder;
use crate::sink::ByteSink;
use crate::{Error, Result};

/// AVIF_HASINDEX: the file carries an idx1 chunk.
const AVIF_HASINDEX: u32 = 0x10;
/// AVIIF_KEYFRAME: the frame is a usable seek point. MJPEG has no
/// inter-frame prediction, so every frame qualifies.
const AVIIF_KEYFRAME: u32 = 0x10;
/// Compressed video chunk of stream 00.
const FRAME_TAG: &[u8; 4] = b"00dc";
/// Content of the strn diagnostic chunk. Fixed so output is deterministic.
const STREAM_NAME: &str = "minavi MJPEG video stream";

const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Incremental writer for an MJPEG-encoded `.avi` file.
///
/// Frames are appended one at a time and streamed straight to the sink;
/// nothing but the (16 bytes per frame) index is buffered. The writer must
/// be finalized, otherwise the file's length fields and frame counts remain
/// zero and the index is missing.
pub struct AviWriter<S: ByteSink> {
    chunk: ChunkWriter<S>,
    index: IndexBuilder,

    width: u32,
    height: u32,
    frames: u32,
    jpeg_quality: u8,

    /// Position just after the `movi` fourcc; index offsets are relative
    /// to this.
    movi_start: u64,
    /// Position of the avih total-frames field.
    frames_field_pos: u64,
    /// Position of the strh stream-length field.
    stream_frames_field_pos: u64,

    closed: bool,
}

impl AviWriter<BufWriter<File>> {
    /// Create an AVI file at `path`.
    ///
    /// [`finalize`](AviWriter::finalize) must be called to produce a valid
    /// file. If construction fails partway through the header, the partial
    /// file is removed before the error is returned.
    pub fn create<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        AviWriter::new(BufWriter::new(file), width, height, fps).map_err(|e| {
            let _ = fs::remove_file(path);
            e
        })
    }
}

impl<S: ByteSink> AviWriter<S> {
    /// Create a writer over an arbitrary sink and emit the container header.
    pub fn new(sink: S, width: u32, height: u32, fps: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "Dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if fps == 0 {
            return Err(Error::InvalidInput("Frame rate must be positive".into()));
        }

        let mut writer = Self {
            chunk: ChunkWriter::new(sink),
            index: IndexBuilder::new(),
            width,
            height,
            frames: 0,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            movi_start: 0,
            frames_field_pos: 0,
            stream_frames_field_pos: 0,
            closed: false,
        };
        writer.write_header(fps)?;
        Ok(writer)
    }

    fn write_header(&mut self, fps: u32) -> Result<()> {
        let c = &mut self.chunk;

        c.write_tag(b"RIFF")?;
        c.open_length_field()?; // file size
        c.write_tag(b"AVI ")?;

        // Header list
        c.write_tag(b"LIST")?;
        c.open_length_field()?;
        c.write_tag(b"hdrl")?;

        // Main AVI header, fixed 56-byte layout
        c.write_tag(b"avih")?;
        c.write_u32(56)?;
        c.write_u32(1_000_000 / fps)?; // frame delay in microseconds
        c.write_u32(0)?; // max bytes per second
        c.write_u32(0)?; // reserved
        c.write_u32(AVIF_HASINDEX)?;
        self.frames_field_pos = c.offset()?;
        c.write_u32(0)?; // total frames, patched at finalize
        c.write_u32(0)?; // initial frames
        c.write_u32(1)?; // stream count
        c.write_u32(0)?; // suggested buffer size
        c.write_u32(self.width)?;
        c.write_u32(self.height)?;
        for _ in 0..4 {
            c.write_u32(0)?; // reserved
        }

        // Stream list
        c.write_tag(b"LIST")?;
        c.open_length_field()?;
        c.write_tag(b"strl")?;

        // Stream header, fixed 56-byte layout
        c.write_tag(b"strh")?;
        c.write_u32(56)?;
        c.write_tag(b"vids")?;
        c.write_tag(b"MJPG")?;
        c.write_u32(0)?; // flags
        c.write_u32(0)?; // priority, language
        c.write_u32(0)?; // initial frames
        c.write_u32(1)?; // rate scale
        c.write_u32(fps)?; // rate; fps = rate / scale
        c.write_u32(0)?; // start
        self.stream_frames_field_pos = c.offset()?;
        c.write_u32(0)?; // stream length in frames, patched at finalize
        c.write_u32(0)?; // suggested buffer size
        c.write_i32(-1)?; // quality, -1 selects the driver default
        c.write_u32(0)?; // sample size, 0 = one frame per chunk
        for _ in 0..4 {
            c.write_u16(0)?; // destination rectangle
        }

        // Stream format: BITMAPINFOHEADER
        c.write_tag(b"strf")?;
        c.open_length_field()?;
        c.write_u32(40)?; // header size
        c.write_u32(self.width)?;
        c.write_u32(self.height)?;
        c.write_u16(1)?; // planes
        c.write_u16(24)?; // bits per pixel
        c.write_tag(b"MJPG")?; // compression
        c.write_u32(self.width * self.height * 3)?; // uncompressed image size
        for _ in 0..4 {
            c.write_u32(0)?; // resolution and palette fields
        }
        c.close_length_field()?;

        // Stream name: zero-terminated, even total length
        c.write_tag(b"strn")?;
        let mut name = STREAM_NAME.as_bytes().to_vec();
        if name.len() % 2 == 0 {
            name.push(b' ');
        }
        name.push(0);
        c.write_u32(name.len() as u32)?;
        c.write_bytes(&name)?;

        c.close_length_field()?; // strl
        c.close_length_field()?; // hdrl

        // Movie data list; its length field stays open until finalize
        c.write_tag(b"LIST")?;
        c.open_length_field()?;
        c.write_tag(b"movi")?;
        self.movi_start = c.offset()?;

        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::State("Writer is already finalized".into()));
        }
        Ok(())
    }

    /// Append one frame from JPEG-encoded bytes.
    pub fn add_jpeg(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_open()?;

        let offset = (self.chunk.offset()? - self.movi_start) as u32;
        self.chunk.write_tag(FRAME_TAG)?;
        self.chunk.open_length_field()?;
        self.chunk.write_bytes(data)?;
        let size = self.chunk.close_length_field()?;

        self.index.record(*FRAME_TAG, AVIIF_KEYFRAME, offset, size);
        self.frames += 1;
        Ok(())
    }

    /// Append one frame from a JPEG file on disk.
    pub fn add_jpeg_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.ensure_open()?;
        let data = fs::read(path)?;
        self.add_jpeg(&data)
    }

    /// Append one frame by JPEG-encoding an image in memory.
    ///
    /// The image dimensions must match the writer's.
    pub fn add_image(&mut self, img: &DynamicImage) -> Result<()> {
        self.ensure_open()?;
        if img.width() != self.width || img.height() != self.height {
            return Err(Error::InvalidInput(format!(
                "Frame is {}x{}, writer expects {}x{}",
                img.width(),
                img.height(),
                self.width,
                self.height
            )));
        }

        let rgb = img.to_rgb8();
        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality);
        encoder.encode_image(&rgb)?;

        self.add_jpeg(&jpeg)
    }

    /// Quality used by [`add_image`](AviWriter::add_image), 1-100.
    pub fn set_jpeg_quality(&mut self, quality: u8) {
        self.jpeg_quality = quality;
    }

    /// Number of frames appended so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Close the movie-data list, append the index, patch the file-length
    /// and frame-count fields, and flush the sink.
    ///
    /// Any further call on the writer, including a second `finalize`,
    /// returns a state error.
    pub fn finalize(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;

        self.chunk.close_length_field()?; // movi list

        self.chunk.write_tag(b"idx1")?;
        self.chunk.open_length_field()?;
        self.chunk.write_bytes(&self.index.serialize())?;
        self.chunk.close_length_field()?;

        self.chunk.close_length_field()?; // RIFF file size
        debug_assert_eq!(self.chunk.open_fields(), 0);

        self.chunk.patch_u32(self.frames_field_pos, self.frames)?;
        self.chunk.patch_u32(self.stream_frames_field_pos, self.frames)?;

        self.chunk.flush()?;
        Ok(())
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> S {
        self.chunk.into_inner()
    }
}
