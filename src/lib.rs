//! # zenload
//!
//! Image decoding front end: turns encoded bytes into an owned pixel buffer
//! with a small, closed set of pixel layouts.
//!
//! The bit-level codecs live behind [`DecoderBackend`]. This crate owns the
//! policy on top of them:
//!
//! - **Format class**: linear (Radiance HDR) streams decode to `f32`, all
//!   others to 8-bit samples.
//! - **Channel negotiation**: a non-zero `desired_channels` asks the backend
//!   to convert and decides the resulting [`PixelType`].
//! - **Luminance + alpha** collapses to [`PixelType::Luminance`].
//! - **Premultiplication** of 8-bit RGBA with `(c * a + 255) >> 8`.
//!
//! A decode either returns a complete [`Image`] or a [`LoadError`]; backend
//! buffers are dropped on every failure path.
//!
//! ## Backends
//!
//! [`ImageRsBackend`] (features `png`, `jpeg`, `hdr` by default; `bmp`,
//! `gif`, `pnm` on request) wraps the `image` crate. Its runtime
//! [`Formats`] set narrows what it accepts. Any other codec can be plugged
//! in by implementing [`DecoderBackend`].
//!
//! ## Usage
//!
//! ```no_run
//! # #[cfg(feature = "png")]
//! # {
//! use zenload::{ImageRsBackend, LoadOptions, PixelType};
//!
//! let data: &[u8] = &[]; // your PNG/JPEG/HDR bytes
//! let backend = ImageRsBackend::new();
//!
//! let image = zenload::decode(data, LoadOptions::premultiplied(true), &backend)?;
//! if image.pixel_type() == PixelType::Rgba {
//!     // color channels are premultiplied
//! }
//! # }
//! # Ok::<(), zenload::LoadError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod alpha;
mod backend;
mod decode;
mod error;
mod format;
mod limits;
mod pixel;

#[cfg(any(
    feature = "png",
    feature = "jpeg",
    feature = "hdr",
    feature = "bmp",
    feature = "gif",
    feature = "pnm"
))]
mod image_rs;

// Re-exports
pub use alpha::premultiply;
pub use backend::{DecoderBackend, RawImage};
pub use decode::{DecodeRequest, Image, LoadOptions};
pub use enough::{Stop, Unstoppable};
pub use error::LoadError;
pub use format::{Formats, ImageFormat};
pub use limits::Limits;
pub use pixel::PixelType;

#[cfg(feature = "rgb")]
pub use pixel::LoadPixel;

#[cfg(any(
    feature = "png",
    feature = "jpeg",
    feature = "hdr",
    feature = "bmp",
    feature = "gif",
    feature = "pnm"
))]
pub use image_rs::ImageRsBackend;

/// Decode `data` with `backend`, without limits or cancellation.
pub fn decode<B: DecoderBackend + ?Sized>(
    data: &[u8],
    options: LoadOptions,
    backend: &B,
) -> Result<Image, LoadError> {
    DecodeRequest::new(data)
        .with_options(options)
        .decode(backend, Unstoppable)
}
