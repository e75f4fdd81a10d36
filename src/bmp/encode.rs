//! BMP header encoder: uncompressed 24-bit, bottom-up.

use crate::cursor::ByteWriter;
use crate::error::StorageError;

/// Size of BITMAPFILEHEADER (14) + BITMAPINFOHEADER (40).
pub const HEADER_LEN: usize = 54;

/// Serialize the header of a bottom-up 24-bit BMP whose pixel data is
/// `image_size` bytes long.
pub fn encode_header(
    width: u32,
    height: u32,
    image_size: u32,
) -> Result<[u8; HEADER_LEN], StorageError> {
    let mut out = [0u8; HEADER_LEN];
    let mut w = ByteWriter::new(&mut out);

    // File header (14 bytes)
    w.write_bytes(b"BM")?;
    w.write_u32_le(image_size.saturating_add(HEADER_LEN as u32))?;
    w.write_u32_le(0)?; // reserved
    w.write_u32_le(HEADER_LEN as u32)?; // data offset

    // DIB header (BITMAPINFOHEADER, 40 bytes)
    w.write_u32_le(40)?;
    w.write_i32_le(width as i32)?;
    w.write_i32_le(height as i32)?; // positive = bottom-up
    w.write_u16_le(1)?; // planes
    w.write_u16_le(24)?;
    w.write_u32_le(0)?; // compression
    w.write_u32_le(image_size)?;
    w.write_u32_le(2835)?; // h resolution (72 DPI)
    w.write_u32_le(2835)?; // v resolution
    w.write_u32_le(0)?; // colors used
    w.write_u32_le(0)?; // important colors
    debug_assert_eq!(w.position(), HEADER_LEN);

    Ok(out)
}
