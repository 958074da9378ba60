// Pure image operations: decoding, the side-by-side composite, low quality
// JPEG re-encoding and picking an accent colour.

use crate::core::commands::CommandError;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;

/// Horizontal gap appended after every image in a composite.
pub const COMPOSITE_GAP: u32 = 10;
/// Refuse to allocate composites larger than this many pixels.
const MAX_COMPOSITE_PIXELS: u64 = 16_000_000;

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CommandError> {
    image::load_from_memory(bytes).map_err(|e| CommandError::Decode(e.to_string()))
}

/// Paste images left to right, top aligned. Width is the sum of every
/// image's width plus a gap each, height is the tallest image.
pub fn compose_row(images: &[DynamicImage]) -> Result<RgbaImage, CommandError> {
    let width: u64 = images
        .iter()
        .map(|img| u64::from(img.width()) + u64::from(COMPOSITE_GAP))
        .sum();
    let height: u64 = images.iter().map(|img| u64::from(img.height())).max().unwrap_or(0);

    if width * height > MAX_COMPOSITE_PIXELS {
        return Err(CommandError::invalid("those images are too large to combine"));
    }

    let mut canvas = RgbaImage::new(width as u32, height as u32);
    let mut offset: i64 = 0;
    for img in images {
        image::imageops::replace(&mut canvas, &img.to_rgba8(), offset, 0);
        offset += i64::from(img.width() + COMPOSITE_GAP);
    }

    Ok(canvas)
}

pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>, CommandError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| CommandError::Decode(e.to_string()))?;
    Ok(bytes)
}

/// Re-encode as baseline JPEG at the given quality (1 = worst).
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CommandError> {
    let rgb = image.to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| CommandError::Decode(e.to_string()))?;
    Ok(bytes)
}

/// Most common colour of an image, as `0xRRGGBB`.
///
/// Pixels are bucketed by their top three bits per channel on a 64px
/// thumbnail; the winning bucket's mean is returned. Mostly transparent
/// pixels are ignored, and a fully transparent image has no colour.
pub fn dominant_color(image: &DynamicImage) -> Option<u32> {
    let thumb = if image.width() > 64 || image.height() > 64 {
        image.thumbnail(64, 64)
    } else {
        image.clone()
    };

    let mut buckets: HashMap<(u8, u8, u8), (u64, [u64; 3])> = HashMap::new();
    for (_, _, pixel) in thumb.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < 128 {
            continue;
        }
        let entry = buckets.entry((r >> 5, g >> 5, b >> 5)).or_insert((0, [0; 3]));
        entry.0 += 1;
        entry.1[0] += u64::from(r);
        entry.1[1] += u64::from(g);
        entry.1[2] += u64::from(b);
    }

    let (count, sums) = buckets
        .into_values()
        .max_by_key(|(count, sums)| (*count, sums[0] + sums[1] + sums[2]))?;

    let channel = |sum: u64| (sum / count) as u32;
    Some((channel(sums[0]) << 16) | (channel(sums[1]) << 8) | channel(sums[2]))
}
