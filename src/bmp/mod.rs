//! BMP header codec for uncompressed 24-bit bitmaps.
//!
//! Only the fields the transcoder needs are decoded; the encoder always
//! emits a 54-byte BITMAPFILEHEADER + BITMAPINFOHEADER for a bottom-up,
//! 24-bit, uncompressed image.

mod decode;
mod encode;

pub use decode::{HEADER_PROBE_LEN, SourceImage, decode_header};
pub use encode::{HEADER_LEN, encode_header};

/// Bytes per pixel of a 24-bit BMP.
pub const BYTES_PER_PIXEL: u32 = 3;

/// Byte length of one pixel row of `width` pixels, padded to 4 bytes.
///
/// Returns `None` if the computation overflows `u32`.
pub fn row_size(width: u32) -> Option<u32> {
    width
        .checked_mul(BYTES_PER_PIXEL)
        .and_then(|r| r.checked_add(3))
        .map(|r| r & !3)
}
