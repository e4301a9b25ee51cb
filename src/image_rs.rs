//! Reference backend built on the `image` crate.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use std::io::Cursor;

use image::DynamicImage;
use image::io::Reader;

use crate::backend::{DecoderBackend, RawImage};
use crate::format::{Formats, ImageFormat};
use crate::limits::Limits;

/// [`DecoderBackend`] over image-rs codecs.
///
/// Only formats in both the capability set and the compiled feature set
/// decode; everything else fails with a reason string.
#[derive(Clone, Debug)]
pub struct ImageRsBackend {
    formats: Formats,
    limits: Option<Limits>,
}

impl Default for ImageRsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageRsBackend {
    /// Accept every format linked into this build.
    pub fn new() -> Self {
        Self {
            formats: Formats::compiled(),
            limits: None,
        }
    }

    /// Restrict (or widen) the accepted container formats.
    pub fn with_formats(mut self, formats: Formats) -> Self {
        self.formats = formats;
        self
    }

    /// Cap the codec's own allocations.
    ///
    /// Width, height and memory limits are handed to image-rs, so an
    /// oversized stream fails inside the codec before its pixel buffer is
    /// allocated. Pixel-count limits have no image-rs equivalent and are
    /// left to the front end.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    fn accepted(&self, data: &[u8]) -> Result<ImageFormat, String> {
        let format = ImageFormat::sniff(data).ok_or_else(|| "unknown image type".to_string())?;
        if !self.formats.supports(format) {
            return Err(format!("{format:?} support is disabled"));
        }
        Ok(format)
    }

    fn load(&self, data: &[u8]) -> Result<DynamicImage, String> {
        let format = self.accepted(data)?;
        let mut reader = Reader::with_format(Cursor::new(data), to_image_rs(format));
        if let Some(limits) = &self.limits {
            reader.limits(codec_limits(limits));
        }
        reader.decode().map_err(|e| e.to_string())
    }
}

fn codec_limits(limits: &Limits) -> image::io::Limits {
    let clamp = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);
    let mut codec = image::io::Limits::no_limits();
    codec.max_image_width = limits.max_width.map(clamp);
    codec.max_image_height = limits.max_height.map(clamp);
    codec.max_alloc = limits.max_memory_bytes;
    codec
}

fn to_image_rs(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Hdr => image::ImageFormat::Hdr,
        ImageFormat::Bmp => image::ImageFormat::Bmp,
        ImageFormat::Gif => image::ImageFormat::Gif,
        ImageFormat::Pnm => image::ImageFormat::Pnm,
    }
}

fn requested(desired_channels: u8, native: u8) -> Result<u8, String> {
    match desired_channels {
        0 => Ok(native),
        1..=4 => Ok(desired_channels),
        n => Err(format!("bad desired channel count {n}")),
    }
}

impl DecoderBackend for ImageRsBackend {
    fn formats(&self) -> Formats {
        self.formats
    }

    fn is_linear_format(&self, data: &[u8]) -> bool {
        ImageFormat::sniff(data)
            .is_some_and(|format| format.is_linear() && self.formats.supports(format))
    }

    fn dimensions(&self, data: &[u8]) -> Option<(u32, u32)> {
        let format = self.accepted(data).ok()?;
        Reader::with_format(Cursor::new(data), to_image_rs(format))
            .into_dimensions()
            .ok()
    }

    fn decode_float(&self, data: &[u8], desired_channels: u8) -> Result<RawImage<f32>, String> {
        let img = self.load(data)?;
        let channels = requested(desired_channels, img.color().channel_count())?;
        let (width, height) = (img.width(), img.height());
        let samples = match channels {
            3 => img.into_rgb32f().into_raw(),
            4 => img.into_rgba32f().into_raw(),
            1 => img
                .into_rgb32f()
                .as_raw()
                .chunks_exact(3)
                .map(mean)
                .collect(),
            _ => img
                .into_rgb32f()
                .as_raw()
                .chunks_exact(3)
                .flat_map(|px| [mean(px), 1.0])
                .collect(),
        };
        Ok(RawImage {
            width,
            height,
            channels,
            samples,
        })
    }

    fn decode_bytes(&self, data: &[u8], desired_channels: u8) -> Result<RawImage<u8>, String> {
        let img = self.load(data)?;
        let channels = requested(desired_channels, img.color().channel_count())?;
        let (width, height) = (img.width(), img.height());
        let samples: Vec<u8> = match channels {
            1 => img.into_luma8().into_raw(),
            2 => img.into_luma_alpha8().into_raw(),
            3 => img.into_rgb8().into_raw(),
            _ => img.into_rgba8().into_raw(),
        };
        Ok(RawImage {
            width,
            height,
            channels,
            samples,
        })
    }
}

fn mean(rgb: &[f32]) -> f32 {
    (rgb[0] + rgb[1] + rgb[2]) / 3.0
}
