/// Pixel memory layout of a decoded [`crate::Image`].
///
/// The set is closed: every successful decode resolves to exactly one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// Single channel, 8-bit luminance.
    Luminance,
    /// 3 channels, 8-bit RGB.
    Rgb,
    /// 4 channels, 8-bit RGBA.
    Rgba,
    /// 3 channels, 32-bit linear float RGB (native endian).
    Rgb32F,
    /// 4 channels, 32-bit linear float RGBA (native endian).
    Rgba32F,
}

impl PixelType {
    /// Bytes per pixel for this layout.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Luminance => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
            Self::Rgb32F => 3 * size_of::<f32>(),
            Self::Rgba32F => 4 * size_of::<f32>(),
        }
    }

    /// Number of channels.
    pub const fn channels(&self) -> usize {
        match self {
            Self::Luminance => 1,
            Self::Rgb | Self::Rgb32F => 3,
            Self::Rgba | Self::Rgba32F => 4,
        }
    }

    /// Whether samples are linear-light `f32` rather than 8-bit integers.
    pub const fn is_linear(&self) -> bool {
        matches!(self, Self::Rgb32F | Self::Rgba32F)
    }

    pub const fn has_alpha(&self) -> bool {
        matches!(self, Self::Rgba | Self::Rgba32F)
    }

    /// Classify an 8-bit channel count. Two channels (luminance + alpha) are
    /// not a layout of their own; callers collapse them to `Luminance` first.
    pub(crate) fn from_integer_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::Luminance),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }

    pub(crate) fn from_linear_channels(channels: u8) -> Option<Self> {
        match channels {
            3 => Some(Self::Rgb32F),
            4 => Some(Self::Rgba32F),
            _ => None,
        }
    }
}

/// 8-bit pixel types that can view an [`crate::Image`] buffer without copying.
#[cfg(feature = "rgb")]
pub trait LoadPixel: Copy + 'static {
    fn pixel_type() -> PixelType;
}

#[cfg(feature = "rgb")]
impl LoadPixel for rgb::Gray<u8> {
    fn pixel_type() -> PixelType {
        PixelType::Luminance
    }
}

#[cfg(feature = "rgb")]
impl LoadPixel for rgb::Rgb<u8> {
    fn pixel_type() -> PixelType {
        PixelType::Rgb
    }
}

#[cfg(feature = "rgb")]
impl LoadPixel for rgb::Rgba<u8> {
    fn pixel_type() -> PixelType {
        PixelType::Rgba
    }
}
