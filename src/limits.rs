use crate::error::LoadError;
use crate::pixel::PixelType;

/// Resource limits for a decode.
///
/// All fields default to `None` (no limit). They are enforced twice:
/// against the header dimensions before the backend decodes anything
/// (when the backend can report them), and against the assembled output.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for decode buffers. Also passed to backends that can
    /// cap their own allocations.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    pub fn is_unlimited(&self) -> bool {
        self.max_width.is_none()
            && self.max_height.is_none()
            && self.max_pixels.is_none()
            && self.max_memory_bytes.is_none()
    }

    /// Header-time check, before any pixel buffer exists.
    ///
    /// `min_bytes_per_pixel` is the smallest output layout the request can
    /// produce; `None` skips the memory check.
    pub(crate) fn check_header(
        &self,
        width: u32,
        height: u32,
        min_bytes_per_pixel: Option<usize>,
    ) -> Result<(), LoadError> {
        self.check_dimensions(width, height)?;
        match min_bytes_per_pixel {
            Some(bpp) => self.check_bytes(output_bytes(width, height, bpp)),
            None => Ok(()),
        }
    }

    /// Final check on the layout the image was resolved to.
    pub(crate) fn check_output(
        &self,
        width: u32,
        height: u32,
        pixel_type: PixelType,
    ) -> Result<(), LoadError> {
        self.check_dimensions(width, height)?;
        self.check_bytes(output_bytes(width, height, pixel_type.bytes_per_pixel()))
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LoadError> {
        if let Some(max_w) = self.max_width.filter(|&m| u64::from(width) > m) {
            return Err(LoadError::LimitExceeded(alloc::format!(
                "width {width} exceeds limit {max_w}"
            )));
        }
        if let Some(max_h) = self.max_height.filter(|&m| u64::from(height) > m) {
            return Err(LoadError::LimitExceeded(alloc::format!(
                "height {height} exceeds limit {max_h}"
            )));
        }
        let pixels = u64::from(width) * u64::from(height);
        if let Some(max_px) = self.max_pixels.filter(|&m| pixels > m) {
            return Err(LoadError::LimitExceeded(alloc::format!(
                "pixel count {pixels} exceeds limit {max_px}"
            )));
        }
        Ok(())
    }

    fn check_bytes(&self, bytes: u64) -> Result<(), LoadError> {
        match self.max_memory_bytes {
            Some(max_mem) if bytes > max_mem => Err(LoadError::LimitExceeded(alloc::format!(
                "{bytes} output bytes exceed memory limit {max_mem}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Saturates instead of overflowing; a saturated size fails any finite limit.
fn output_bytes(width: u32, height: u32, bytes_per_pixel: usize) -> u64 {
    (u64::from(width) * u64::from(height)).saturating_mul(bytes_per_pixel as u64)
}
