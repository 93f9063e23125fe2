//! Common test utilities

#![allow(dead_code)]

use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};

/// Generate a test image with a solid color and a subtle gradient
pub fn generate_test_image(width: u32, height: u32, base_color: [u8; 3]) -> RgbImage {
    let mut img = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let r = base_color[0].saturating_add((x % 50) as u8);
        let g = base_color[1].saturating_add((y % 50) as u8);
        let b = base_color[2];
        *pixel = Rgb([r, g, b]);
    }

    img
}

/// Generate a numbered test image (useful for distinguishable frames)
pub fn generate_numbered_image(width: u32, height: u32, number: u32) -> DynamicImage {
    let colors = [
        [255, 100, 100], // Red-ish
        [100, 255, 100], // Green-ish
        [100, 100, 255], // Blue-ish
        [255, 255, 100], // Yellow-ish
    ];

    let color = colors[(number as usize) % colors.len()];
    DynamicImage::ImageRgb8(generate_test_image(width, height, color))
}

/// Encode a test image to in-memory JPEG bytes
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&img.to_rgb8()).unwrap();
    buf
}

/// One parsed idx1 entry
#[derive(Debug, Clone, Copy)]
pub struct IndexRecord {
    pub tag: [u8; 4],
    pub flags: u32,
    pub offset: u32,
    pub size: u32,
}

/// Header fields and index recovered from a produced AVI file
#[derive(Debug, Default)]
pub struct ParsedAvi {
    pub delay_us: u32,
    pub avih_flags: u32,
    pub total_frames: u32,
    pub width: u32,
    pub height: u32,
    pub rate_scale: u32,
    pub rate: u32,
    pub stream_frames: u32,
    pub codec: [u8; 4],
    /// Position of the first byte after the movi fourcc
    pub movi_data: usize,
    pub entries: Vec<IndexRecord>,
}

fn u32_at(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap())
}

fn tag_at(bytes: &[u8], pos: usize) -> [u8; 4] {
    bytes[pos..pos + 4].try_into().unwrap()
}

/// Structurally parse an AVI file: walk the RIFF chunk tree, pull the header
/// fields the writer is responsible for, and collect the idx1 entries.
/// Panics on malformed structure, which is what the tests want.
pub fn parse_avi(bytes: &[u8]) -> ParsedAvi {
    assert_eq!(&bytes[0..4], b"RIFF", "missing RIFF magic");
    assert_eq!(
        u32_at(bytes, 4) as usize,
        bytes.len() - 8,
        "RIFF size disagrees with file length"
    );
    assert_eq!(&bytes[8..12], b"AVI ", "missing AVI signature");

    let mut avi = ParsedAvi::default();

    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let tag = tag_at(bytes, pos);
        let size = u32_at(bytes, pos + 4) as usize;
        match &tag {
            b"LIST" => {
                let kind = tag_at(bytes, pos + 8);
                match &kind {
                    b"hdrl" => parse_hdrl(bytes, pos + 12, pos + 8 + size, &mut avi),
                    b"movi" => avi.movi_data = pos + 12,
                    _ => {}
                }
            }
            b"idx1" => {
                assert_eq!(size % 16, 0, "idx1 body not a whole number of entries");
                let mut entry = pos + 8;
                while entry < pos + 8 + size {
                    avi.entries.push(IndexRecord {
                        tag: tag_at(bytes, entry),
                        flags: u32_at(bytes, entry + 4),
                        offset: u32_at(bytes, entry + 8),
                        size: u32_at(bytes, entry + 12),
                    });
                    entry += 16;
                }
            }
            _ => {}
        }
        pos += 8 + size + (size & 1);
    }

    assert_eq!(pos, bytes.len(), "trailing bytes after last chunk");
    assert_ne!(avi.movi_data, 0, "no movi list found");
    avi
}

fn parse_hdrl(bytes: &[u8], mut pos: usize, end: usize, avi: &mut ParsedAvi) {
    while pos + 8 <= end {
        let tag = tag_at(bytes, pos);
        let size = u32_at(bytes, pos + 4) as usize;
        let body = pos + 8;
        match &tag {
            b"avih" => {
                assert_eq!(size, 56);
                avi.delay_us = u32_at(bytes, body);
                avi.avih_flags = u32_at(bytes, body + 12);
                avi.total_frames = u32_at(bytes, body + 16);
                avi.width = u32_at(bytes, body + 32);
                avi.height = u32_at(bytes, body + 36);
            }
            b"LIST" if tag_at(bytes, body) == *b"strl" => {
                parse_strl(bytes, body + 4, body + size, avi);
            }
            _ => {}
        }
        pos += 8 + size + (size & 1);
    }
}

fn parse_strl(bytes: &[u8], mut pos: usize, end: usize, avi: &mut ParsedAvi) {
    while pos + 8 <= end {
        let tag = tag_at(bytes, pos);
        let size = u32_at(bytes, pos + 4) as usize;
        let body = pos + 8;
        match &tag {
            b"strh" => {
                assert_eq!(size, 56);
                assert_eq!(tag_at(bytes, body), *b"vids");
                avi.codec = tag_at(bytes, body + 4);
                avi.rate_scale = u32_at(bytes, body + 20);
                avi.rate = u32_at(bytes, body + 24);
                avi.stream_frames = u32_at(bytes, body + 32);
            }
            b"strn" => {
                assert_eq!(size % 2, 0, "strn length must be even");
                assert_eq!(bytes[body + size - 1], 0, "strn must be zero-terminated");
            }
            _ => {}
        }
        pos += 8 + size + (size & 1);
    }
}

/// Extract every indexed frame payload, verifying each entry points at a
/// well-formed chunk.
pub fn extract_frames(bytes: &[u8], avi: &ParsedAvi) -> Vec<Vec<u8>> {
    avi.entries
        .iter()
        .map(|entry| {
            let start = avi.movi_data + entry.offset as usize;
            assert_eq!(tag_at(bytes, start), entry.tag, "index tag mismatch");
            assert_eq!(u32_at(bytes, start + 4), entry.size, "index size mismatch");
            bytes[start + 8..start + 8 + entry.size as usize].to_vec()
        })
        .collect()
}
