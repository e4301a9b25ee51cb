use alloc::string::String;
use alloc::vec::Vec;

use enough::Stop;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::alpha::{collapse_luminance_alpha, premultiply};
use crate::backend::{DecoderBackend, RawImage};
use crate::error::LoadError;
use crate::limits::Limits;
use crate::pixel::PixelType;

/// Caller preferences for a decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// 0 keeps the format's native channel count; 1-4 asks the backend to
    /// convert. Other values are a caller error and are passed through
    /// unchecked.
    pub desired_channels: u8,
    /// Premultiply color by alpha. Only applies to 8-bit RGBA output.
    pub premultiply_alpha: bool,
}

impl LoadOptions {
    /// Native channels, with or without premultiplication.
    pub fn premultiplied(premultiply_alpha: bool) -> Self {
        Self {
            desired_channels: 0,
            premultiply_alpha,
        }
    }

    pub fn with_desired_channels(mut self, channels: u8) -> Self {
        self.desired_channels = channels;
        self
    }
}

/// A decoded image that owns its pixel buffer.
///
/// The buffer is always exactly `width * height * pixel_type.bytes_per_pixel()`
/// bytes. Float layouts store native-endian `f32` samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    pixel_type: PixelType,
}

impl Image {
    fn new(pixels: Vec<u8>, width: u32, height: u32, pixel_type: PixelType) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * pixel_type.bytes_per_pixel()
        );
        Self {
            pixels,
            width,
            height,
            pixel_type,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Whether the image has been released (or has no pixels).
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Free the pixel buffer and reset the dimensions to zero.
    ///
    /// Returns `false` if there was nothing to free, so a second release is
    /// observable and harmless.
    pub fn release(&mut self) -> bool {
        if self.width == 0 && self.height == 0 && self.pixels.capacity() == 0 {
            return false;
        }
        self.pixels = Vec::new();
        self.width = 0;
        self.height = 0;
        true
    }

    /// Copy out linear samples. `None` for 8-bit layouts.
    ///
    /// The pixel buffer is a byte vector with no `f32` alignment guarantee,
    /// so float access always copies; use [`Image::pixels`] for the raw
    /// native-endian bytes.
    pub fn linear_samples(&self) -> Option<Vec<f32>> {
        if !self.pixel_type.is_linear() {
            return None;
        }
        Some(self.samples_f32().collect())
    }

    fn samples_f32(&self) -> impl Iterator<Item = f32> + '_ {
        self.pixels
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
    }

    /// Copy an `Rgb32F` image out as typed pixels.
    #[cfg(feature = "rgb")]
    pub fn to_linear_rgb(&self) -> Option<Vec<rgb::Rgb<f32>>> {
        if self.pixel_type != PixelType::Rgb32F {
            return None;
        }
        let samples: Vec<f32> = self.samples_f32().collect();
        Some(
            samples
                .chunks_exact(3)
                .map(|c| rgb::Rgb {
                    r: c[0],
                    g: c[1],
                    b: c[2],
                })
                .collect(),
        )
    }

    /// Copy an `Rgba32F` image out as typed pixels.
    #[cfg(feature = "rgb")]
    pub fn to_linear_rgba(&self) -> Option<Vec<rgb::Rgba<f32>>> {
        if self.pixel_type != PixelType::Rgba32F {
            return None;
        }
        let samples: Vec<f32> = self.samples_f32().collect();
        Some(
            samples
                .chunks_exact(4)
                .map(|c| rgb::Rgba {
                    r: c[0],
                    g: c[1],
                    b: c[2],
                    a: c[3],
                })
                .collect(),
        )
    }

    /// Reinterpret 8-bit pixel data as a typed pixel slice.
    ///
    /// `None` if the pixel type doesn't match `P`.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: crate::LoadPixel>(&self) -> Option<&[P]>
    where
        [u8]: rgb::AsPixels<P>,
    {
        if self.pixel_type != P::pixel_type() {
            return None;
        }
        Some(self.pixels().as_pixels())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: crate::LoadPixel>(&self) -> Option<imgref::ImgRef<'_, P>>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Some(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }
}

/// Builder for a single decode.
///
/// ```no_run
/// # #[cfg(feature = "png")]
/// # {
/// use zenload::{DecodeRequest, ImageRsBackend, Unstoppable};
///
/// let data: &[u8] = &[]; // your encoded bytes
/// let image = DecodeRequest::new(data)
///     .premultiply_alpha(true)
///     .decode(&ImageRsBackend::new(), Unstoppable)?;
/// println!("{}x{} {:?}", image.width(), image.height(), image.pixel_type());
/// # }
/// # Ok::<(), zenload::LoadError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    options: LoadOptions,
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            options: LoadOptions::default(),
            limits: None,
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn desired_channels(mut self, channels: u8) -> Self {
        self.options.desired_channels = channels;
        self
    }

    pub fn premultiply_alpha(mut self, premultiply: bool) -> Self {
        self.options.premultiply_alpha = premultiply;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Classify the stream, run the matching backend primitive and apply
    /// channel policy.
    pub fn decode<B: DecoderBackend + ?Sized>(
        self,
        backend: &B,
        stop: impl Stop,
    ) -> Result<Image, LoadError> {
        stop.check()?;
        let linear = backend.is_linear_format(self.data);
        self.check_header(backend, linear)?;
        if linear {
            self.load_linear(backend, &stop)
        } else {
            self.load_integer(backend, &stop)
        }
    }

    /// Reject oversized streams from their header, before the backend
    /// allocates pixel buffers.
    fn check_header<B: DecoderBackend + ?Sized>(
        &self,
        backend: &B,
        linear: bool,
    ) -> Result<(), LoadError> {
        let Some(limits) = self.limits.filter(|l| !l.is_unlimited()) else {
            return Ok(());
        };
        match backend.dimensions(self.data) {
            Some((width, height)) => limits.check_header(
                width,
                height,
                min_output_bytes_per_pixel(linear, self.options.desired_channels),
            ),
            None => Ok(()),
        }
    }

    fn load_linear<B: DecoderBackend + ?Sized>(
        &self,
        backend: &B,
        stop: &dyn Stop,
    ) -> Result<Image, LoadError> {
        let raw = backend
            .decode_float(self.data, self.options.desired_channels)
            .map_err(decode_failed)?;
        stop.check()?;

        let channels = resolve_channels(self.options.desired_channels, raw.channels);
        let pixel_type =
            PixelType::from_linear_channels(channels).ok_or_else(|| unsupported(channels, true))?;
        check_sample_count(&raw, channels)?;
        check_output(self.limits, raw.width, raw.height, pixel_type)?;
        trace_out_of_range(&raw.samples);

        let mut pixels = Vec::with_capacity(raw.samples.len() * size_of::<f32>());
        for sample in &raw.samples {
            pixels.extend_from_slice(&sample.to_ne_bytes());
        }
        Ok(Image::new(pixels, raw.width, raw.height, pixel_type))
    }

    fn load_integer<B: DecoderBackend + ?Sized>(
        &self,
        backend: &B,
        stop: &dyn Stop,
    ) -> Result<Image, LoadError> {
        let raw = backend
            .decode_bytes(self.data, self.options.desired_channels)
            .map_err(decode_failed)?;
        stop.check()?;

        let channels = resolve_channels(self.options.desired_channels, raw.channels);
        let pixel_type = match channels {
            // Luminance + alpha has no layout of its own.
            2 => PixelType::Luminance,
            n => PixelType::from_integer_channels(n).ok_or_else(|| unsupported(n, false))?,
        };
        check_sample_count(&raw, channels)?;

        let RawImage {
            width,
            height,
            mut samples,
            ..
        } = raw;
        check_output(self.limits, width, height, pixel_type)?;

        if channels == 2 {
            collapse_luminance_alpha(&mut samples, width as usize * height as usize);
        } else if pixel_type == PixelType::Rgba && self.options.premultiply_alpha {
            stop.check()?;
            premultiply(&mut samples, width, height);
        }
        Ok(Image::new(samples, width, height, pixel_type))
    }
}

/// A requested channel count overrides whatever the backend reports.
fn resolve_channels(desired: u8, achieved: u8) -> u8 {
    if desired > 0 { desired } else { achieved }
}

fn check_sample_count<T>(raw: &RawImage<T>, channels: u8) -> Result<(), LoadError> {
    let expected = (raw.width as usize)
        .checked_mul(raw.height as usize)
        .and_then(|px| px.checked_mul(usize::from(channels)));
    match expected {
        Some(n) if n == raw.samples.len() => Ok(()),
        _ => Err(decode_failed(alloc::format!(
            "backend returned {} samples for {}x{} with {} channel(s)",
            raw.samples.len(),
            raw.width,
            raw.height,
            channels
        ))),
    }
}

/// Smallest layout a request can resolve to. `None` when the request can
/// only end in `UnsupportedChannelLayout`, which should win over limits.
fn min_output_bytes_per_pixel(linear: bool, desired: u8) -> Option<usize> {
    let layout = match (linear, desired) {
        (true, 0 | 3) => PixelType::Rgb32F,
        (true, 4) => PixelType::Rgba32F,
        (false, 0..=2) => PixelType::Luminance,
        (false, 3) => PixelType::Rgb,
        (false, 4) => PixelType::Rgba,
        _ => return None,
    };
    Some(layout.bytes_per_pixel())
}

fn check_output(
    limits: Option<&Limits>,
    width: u32,
    height: u32,
    pixel_type: PixelType,
) -> Result<(), LoadError> {
    match limits {
        Some(limits) => limits.check_output(width, height, pixel_type),
        None => Ok(()),
    }
}

fn decode_failed(reason: String) -> LoadError {
    let reason = if reason.is_empty() {
        String::from("backend gave no reason")
    } else {
        reason
    };
    log::error!("failed to load image: '{reason}'");
    LoadError::DecodeFailed(reason)
}

fn unsupported(channels: u8, linear: bool) -> LoadError {
    log::error!("unexpected number of components in image ({channels})");
    LoadError::UnsupportedChannelLayout { channels, linear }
}

/// One summary event per decode, and only when someone is listening.
fn trace_out_of_range(samples: &[f32]) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    let (count, max) = samples
        .iter()
        .filter(|&&s| s > 1.0)
        .fold((0usize, f32::MIN), |(n, max), &s| (n + 1, max.max(s)));
    if count > 0 {
        log::trace!("{count} linear samples above 1.0 (max {max})");
    }
}
