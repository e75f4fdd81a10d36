//! BMP header decoder.

use log::trace;

use crate::cursor::ByteReader;
use crate::error::StaffError;

/// Number of leading bytes [`decode_header`] needs: the 14-byte file header
/// plus the BITMAPINFOHEADER up to and including the compression field.
pub const HEADER_PROBE_LEN: usize = 34;

/// Validated geometry of a 24-bit uncompressed source bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    /// Rows are stored top row first (negative height in the header).
    pub top_down: bool,
    /// Byte offset of the first pixel row within the file.
    pub data_offset: u32,
    /// Padded byte length of one stored row.
    pub row_size: u32,
}

impl SourceImage {
    /// Index of the stored row holding logical row `y` (0 = top).
    pub fn file_row(&self, y: u32) -> u32 {
        if self.top_down {
            y
        } else {
            self.height - 1 - y
        }
    }

    /// Absolute byte offset of logical row `y`.
    pub fn row_offset(&self, y: u32) -> u64 {
        u64::from(self.data_offset) + u64::from(self.file_row(y)) * u64::from(self.row_size)
    }
}

/// Parse and validate the leading bytes of a BMP file.
///
/// `data` is usually the first [`HEADER_PROBE_LEN`] bytes of the file; a
/// shorter slice is accepted as long as it holds every field.
pub fn decode_header(data: &[u8]) -> Result<SourceImage, StaffError> {
    let mut bytes = ByteReader::new(data);

    let magic = bytes.read_u16_le().map_err(|_| StaffError::NotBmp)?;
    if magic != u16::from_le_bytes(*b"BM") {
        return Err(StaffError::NotBmp);
    }

    // file size, reserved
    bytes.skip(8).map_err(StaffError::Read)?;
    let data_offset = bytes.read_u32_le().map_err(StaffError::Read)?;
    // DIB header size
    bytes.skip(4).map_err(StaffError::Read)?;
    let width = bytes.read_i32_le().map_err(StaffError::Read)?;
    let height_signed = bytes.read_i32_le().map_err(StaffError::Read)?;

    let planes = bytes.read_u16_le().map_err(StaffError::Read)?;
    if planes != 1 {
        return Err(StaffError::InvalidPlanes(planes));
    }
    let bit_depth = bytes.read_u16_le().map_err(StaffError::Read)?;
    let compression = bytes.read_u32_le().map_err(StaffError::Read)?;

    trace!("BMP width: {width}");
    trace!("BMP height: {height_signed}");
    trace!("BMP depth: {bit_depth}, compression: {compression}");
    trace!("BMP data offset: {data_offset}");

    if bit_depth != 24 || compression != 0 {
        return Err(StaffError::UnsupportedFormat {
            bit_depth,
            compression,
        });
    }

    let top_down = height_signed < 0;
    let height = height_signed.unsigned_abs();
    if width <= 0 || height_signed == 0 || height > i32::MAX as u32 {
        return Err(StaffError::InvalidSize {
            width,
            height: height_signed,
        });
    }
    let width = width as u32;

    let row_size = super::row_size(width).ok_or(StaffError::InvalidSize {
        width: width as i32,
        height: height_signed,
    })?;

    Ok(SourceImage {
        width,
        height,
        top_down,
        data_offset,
        row_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn header(width: i32, height: i32, planes: u16, depth: u16, compression: u32) -> Vec<u8> {
        let mut h = Vec::new();
        h.extend_from_slice(b"BM");
        h.extend_from_slice(&0u32.to_le_bytes());
        h.extend_from_slice(&0u32.to_le_bytes());
        h.extend_from_slice(&54u32.to_le_bytes());
        h.extend_from_slice(&40u32.to_le_bytes());
        h.extend_from_slice(&width.to_le_bytes());
        h.extend_from_slice(&height.to_le_bytes());
        h.extend_from_slice(&planes.to_le_bytes());
        h.extend_from_slice(&depth.to_le_bytes());
        h.extend_from_slice(&compression.to_le_bytes());
        h
    }

    #[test]
    fn bottom_up() {
        let img = decode_header(&header(5, 3, 1, 24, 0)).unwrap();
        assert_eq!(img.width, 5);
        assert_eq!(img.height, 3);
        assert!(!img.top_down);
        assert_eq!(img.data_offset, 54);
        assert_eq!(img.row_size, 16);
        assert_eq!(img.file_row(0), 2);
        assert_eq!(img.row_offset(0), 54 + 32);
    }

    #[test]
    fn negative_height_is_top_down() {
        let img = decode_header(&header(2, -4, 1, 24, 0)).unwrap();
        assert_eq!(img.height, 4);
        assert!(img.top_down);
        assert_eq!(img.file_row(1), 1);
        assert_eq!(img.row_offset(3), 54 + 3 * 8);
    }

    #[test]
    fn rejects() {
        assert!(matches!(
            decode_header(b"PN\0\0"),
            Err(StaffError::NotBmp)
        ));
        assert!(matches!(decode_header(b"B"), Err(StaffError::NotBmp)));
        assert!(matches!(
            decode_header(&header(2, 2, 2, 24, 0)),
            Err(StaffError::InvalidPlanes(2))
        ));
        assert!(matches!(
            decode_header(&header(2, 2, 1, 8, 0)),
            Err(StaffError::UnsupportedFormat { bit_depth: 8, .. })
        ));
        assert!(matches!(
            decode_header(&header(2, 2, 1, 24, 1)),
            Err(StaffError::UnsupportedFormat { compression: 1, .. })
        ));
        assert!(matches!(
            decode_header(&header(0, 2, 1, 24, 0)),
            Err(StaffError::InvalidSize { .. })
        ));
        assert!(matches!(
            decode_header(&header(-3, 2, 1, 24, 0)),
            Err(StaffError::InvalidSize { .. })
        ));
        assert!(matches!(
            decode_header(&header(3, 0, 1, 24, 0)),
            Err(StaffError::InvalidSize { .. })
        ));
    }

    #[test]
    fn truncated_after_magic() {
        let full = header(2, 2, 1, 24, 0);
        assert!(matches!(
            decode_header(&full[..20]),
            Err(StaffError::Read(_))
        ));
    }
}
