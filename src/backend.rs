//! The codec seam: everything below channel policy lives behind [`DecoderBackend`].

use alloc::string::String;
use alloc::vec::Vec;

use crate::format::Formats;

/// Raw output of a backend primitive.
///
/// `samples` is interleaved, `channels` samples per pixel, row-major with no
/// padding.
#[derive(Clone, Debug, PartialEq)]
pub struct RawImage<T> {
    pub width: u32,
    pub height: u32,
    /// Channel count the backend actually produced.
    pub channels: u8,
    pub samples: Vec<T>,
}

/// A pluggable codec.
///
/// Implementations either return a fully valid buffer of the stated
/// dimensions and channel count, or a human-readable reason for failing.
/// `desired_channels` is 0 for "native" or 1-4 to request a conversion.
pub trait DecoderBackend {
    /// Container formats this backend accepts.
    fn formats(&self) -> Formats;

    /// Whether `data` is a linear (floating-point) format. Must depend only
    /// on the bytes.
    fn is_linear_format(&self, data: &[u8]) -> bool;

    /// Width and height from the stream header, without decoding pixels.
    ///
    /// Used to enforce [`crate::Limits`] before any pixel buffer is
    /// allocated. Backends that can't read the header cheaply return `None`,
    /// and limits are then only checked on the decoded output.
    fn dimensions(&self, _data: &[u8]) -> Option<(u32, u32)> {
        None
    }

    fn decode_float(&self, data: &[u8], desired_channels: u8) -> Result<RawImage<f32>, String>;

    fn decode_bytes(&self, data: &[u8], desired_channels: u8) -> Result<RawImage<u8>, String>;
}

impl<B: DecoderBackend + ?Sized> DecoderBackend for &B {
    fn formats(&self) -> Formats {
        (**self).formats()
    }

    fn is_linear_format(&self, data: &[u8]) -> bool {
        (**self).is_linear_format(data)
    }

    fn dimensions(&self, data: &[u8]) -> Option<(u32, u32)> {
        (**self).dimensions(data)
    }

    fn decode_float(&self, data: &[u8], desired_channels: u8) -> Result<RawImage<f32>, String> {
        (**self).decode_float(data, desired_channels)
    }

    fn decode_bytes(&self, data: &[u8], desired_channels: u8) -> Result<RawImage<u8>, String> {
        (**self).decode_bytes(data, desired_channels)
    }
}
