//! Output geometry: size resolution and output→source pixel mapping.

use log::debug;

use crate::bmp::{SourceImage, row_size};
use crate::error::StaffError;
use crate::limits::Limits;

/// What the caller asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputSpec {
    pub out_width: u16,
    /// Soft cap on the output height; the memory budget may lower it further.
    pub max_height: u16,
    /// Rotate the image 90° clockwise.
    pub rotate_cw: bool,
    /// Explicit output height, or 0 to derive it from the aspect ratio.
    pub requested_height: u16,
}

/// Fully resolved output geometry. Nothing is written before this exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedGeometry {
    /// Source width as seen after rotation.
    pub virtual_width: u32,
    /// Source height as seen after rotation.
    pub virtual_height: u32,
    pub out_width: u32,
    pub out_height: u32,
    pub out_row_size: u32,
    /// Pixel-data size of the output, `out_row_size * out_height`.
    pub out_size: u32,
    pub rotate_cw: bool,
}

impl OutputSpec {
    pub fn new(out_width: u16, max_height: u16) -> Self {
        Self {
            out_width,
            max_height,
            rotate_cw: false,
            requested_height: 0,
        }
    }

    /// Resolve the output size for `src` under `limits`.
    pub fn resolve(
        &self,
        src: &SourceImage,
        limits: &Limits,
    ) -> Result<ResolvedGeometry, StaffError> {
        let out_width = u32::from(self.out_width);
        let out_row_size = row_size(out_width)
            .filter(|&r| r != 0)
            .ok_or(StaffError::InvalidOutputWidth)?;

        let max_from_budget = limits.max_output_bytes / out_row_size;
        let ceiling = u32::from(self.max_height).min(max_from_budget);

        let (virtual_width, virtual_height) = if self.rotate_cw {
            (src.height, src.width)
        } else {
            (src.width, src.height)
        };

        let out_height = if self.requested_height > 0 {
            u32::from(self.requested_height)
        } else {
            aspect_height(out_width, virtual_width, virtual_height)
        }
        .min(ceiling);

        let out_size = u64::from(out_row_size) * u64::from(out_height);
        limits.check_output(out_size)?;

        let geometry = ResolvedGeometry {
            virtual_width,
            virtual_height,
            out_width,
            out_height,
            out_row_size,
            // bounded by max_output_bytes above
            out_size: out_size as u32,
            rotate_cw: self.rotate_cw,
        };
        debug!(
            "{}x{} source -> {}x{} output ({} bytes, rotate_cw={})",
            src.width, src.height, out_width, out_height, geometry.out_size, self.rotate_cw
        );
        Ok(geometry)
    }
}

/// `round(out_width * virtual_height / virtual_width)`, at least 1.
fn aspect_height(out_width: u32, virtual_width: u32, virtual_height: u32) -> u32 {
    let num = 2 * u64::from(out_width) * u64::from(virtual_height) + u64::from(virtual_width);
    let den = 2 * u64::from(virtual_width);
    let h = num / den;
    h.clamp(1, u64::from(u32::MAX)) as u32
}

impl ResolvedGeometry {
    /// Map output pixel `(out_x, out_y)` (0 = top-left) to the source pixel
    /// it samples, in logical source coordinates (0 = top row).
    ///
    /// Returns `None` when the mapped position falls outside the source; the
    /// output pixel then stays black.
    pub fn source_pixel(&self, src: &SourceImage, out_x: u32, out_y: u32) -> Option<(u32, u32)> {
        let rot_x = scale(out_x, self.virtual_width, self.out_width);
        let rot_y = scale(out_y, self.virtual_height, self.out_height);

        let (src_x, src_y) = if self.rotate_cw {
            (rot_y, src.height.checked_sub(1 + rot_x)?)
        } else {
            (rot_x, rot_y)
        };

        if src_x >= src.width || src_y >= src.height {
            return None;
        }
        Some((src_x, src_y))
    }
}

/// Nearest-neighbour position of `pos` (out of `out_len`) on an axis of
/// `virtual_len` samples, clamped to the last sample.
fn scale(pos: u32, virtual_len: u32, out_len: u32) -> u32 {
    let v = u64::from(pos) * u64::from(virtual_len) / u64::from(out_len);
    v.min(u64::from(virtual_len.saturating_sub(1))) as u32
}
