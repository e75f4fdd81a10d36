/// Output memory budget of the reference device, in bytes.
pub const DEFAULT_OUTPUT_BUDGET: u32 = 64_000;

/// Resource limits for a conversion.
///
/// `max_output_bytes` bounds the pixel data of the produced bitmap and
/// therefore its height. Source limits default to `None` (no limit).
#[derive(Clone, Debug)]
pub struct Limits {
    /// Maximum output pixel-data size (padded rows × height).
    pub max_output_bytes: u32,
    pub max_source_width: Option<u32>,
    pub max_source_height: Option<u32>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_output_bytes: DEFAULT_OUTPUT_BUDGET,
            max_source_width: None,
            max_source_height: None,
        }
    }
}

impl Limits {
    /// Check source dimensions against limits.
    pub(crate) fn check_source(&self, width: u32, height: u32) -> Result<(), crate::StaffError> {
        let too_wide = self.max_source_width.is_some_and(|max_w| width > max_w);
        let too_tall = self.max_source_height.is_some_and(|max_h| height > max_h);
        if too_wide || too_tall {
            return Err(crate::StaffError::SourceTooLarge { width, height });
        }
        Ok(())
    }

    /// Check that an output pixel-data size is nonzero and within budget.
    pub(crate) fn check_output(&self, bytes: u64) -> Result<(), crate::StaffError> {
        if bytes == 0 || bytes > u64::from(self.max_output_bytes) {
            return Err(crate::StaffError::OutputTooLarge {
                size: bytes,
                budget: self.max_output_bytes,
            });
        }
        Ok(())
    }
}
