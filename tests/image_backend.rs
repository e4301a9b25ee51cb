//! End-to-end decodes through the image-rs backend.
#![cfg(all(feature = "png", feature = "hdr"))]

use image::ImageEncoder as _;
use image::codecs::png::PngEncoder;
use zenload::*;

fn encode_png(pixels: &[u8], w: u32, h: u32, color: image::ColorType) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(pixels, w, h, color)
        .unwrap();
    out
}

/// Flat (non-RLE) Radiance file; widths under 8 are always stored flat.
fn encode_flat_hdr(w: u32, h: u32, rgbe: [u8; 4]) -> Vec<u8> {
    let mut out = format!("#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y {h} +X {w}\n").into_bytes();
    for _ in 0..w * h {
        out.extend_from_slice(&rgbe);
    }
    out
}

#[test]
fn png_rgba_premultiplied() {
    let pixels = [200u8, 10, 255, 128].repeat(4);
    let png = encode_png(&pixels, 2, 2, image::ColorType::Rgba8);

    let image = decode(&png, LoadOptions::premultiplied(true), &ImageRsBackend::new()).unwrap();
    assert_eq!((image.width(), image.height()), (2, 2));
    assert_eq!(image.pixel_type(), PixelType::Rgba);
    for px in image.pixels().chunks_exact(4) {
        assert_eq!(px, [100, 5, 128, 128]);
    }
}

#[test]
fn png_rgb_native_and_forced_rgba() {
    let pixels: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 11) as u8).collect();
    let png = encode_png(&pixels, 4, 3, image::ColorType::Rgb8);
    let backend = ImageRsBackend::new();

    let native = decode(&png, LoadOptions::default(), &backend).unwrap();
    assert_eq!(native.pixel_type(), PixelType::Rgb);
    assert_eq!(native.pixels(), &pixels[..]);

    let forced = DecodeRequest::new(&png)
        .desired_channels(4)
        .decode(&backend, Unstoppable)
        .unwrap();
    assert_eq!(forced.pixel_type(), PixelType::Rgba);
    assert_eq!(forced.pixels().len(), 4 * 3 * 4);
}

#[test]
fn png_gray_alpha_collapses() {
    let pixels = [10u8, 255, 20, 0, 30, 128];
    let png = encode_png(&pixels, 3, 1, image::ColorType::La8);

    let image = decode(&png, LoadOptions::default(), &ImageRsBackend::new()).unwrap();
    assert_eq!(image.pixel_type(), PixelType::Luminance);
    assert_eq!(image.pixels(), &[10, 20, 30]);
}

#[test]
fn hdr_native_rgb() {
    let hdr = encode_flat_hdr(3, 2, [128, 64, 32, 129]);
    let backend = ImageRsBackend::new();
    assert!(backend.is_linear_format(&hdr));

    let image = decode(&hdr, LoadOptions::premultiplied(true), &backend).unwrap();
    assert_eq!((image.width(), image.height()), (3, 2));
    assert_eq!(image.pixel_type(), PixelType::Rgb32F);
    assert_eq!(image.pixels().len(), 3 * 2 * 12);
    let samples = image.linear_samples().unwrap();
    assert!(samples.chunks_exact(3).all(|px| px[0] > px[1] && px[1] > px[2]));
}

#[test]
fn hdr_forced_rgba() {
    let hdr = encode_flat_hdr(2, 2, [128, 128, 128, 129]);
    let image = DecodeRequest::new(&hdr)
        .desired_channels(4)
        .decode(&ImageRsBackend::new(), Unstoppable)
        .unwrap();
    assert_eq!(image.pixel_type(), PixelType::Rgba32F);
    let samples = image.linear_samples().unwrap();
    assert!(samples.chunks_exact(4).all(|px| px[3] == 1.0));
}

#[test]
fn hdr_forced_gray_is_unsupported() {
    let hdr = encode_flat_hdr(2, 2, [128, 128, 128, 129]);
    let err = DecodeRequest::new(&hdr)
        .desired_channels(1)
        .decode(&ImageRsBackend::new(), Unstoppable)
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::UnsupportedChannelLayout {
            channels: 1,
            linear: true
        }
    ));
}

#[test]
fn truncated_png_fails_with_reason() {
    let pixels = vec![0u8; 16 * 16 * 3];
    let png = encode_png(&pixels, 16, 16, image::ColorType::Rgb8);
    let truncated = &png[..png.len() / 2];

    match decode(truncated, LoadOptions::default(), &ImageRsBackend::new()) {
        Err(LoadError::DecodeFailed(reason)) => assert!(!reason.is_empty()),
        other => panic!("expected DecodeFailed, got {other:?}"),
    }
}

#[test]
fn garbage_fails_with_reason() {
    let err = decode(b"definitely not an image", LoadOptions::default(), &ImageRsBackend::new())
        .unwrap_err();
    assert!(matches!(err, LoadError::DecodeFailed(ref r) if r == "unknown image type"));
}

#[test]
fn disabled_hdr_is_not_linear_and_fails() {
    let hdr = encode_flat_hdr(2, 2, [128, 128, 128, 129]);
    let backend = ImageRsBackend::new().with_formats(Formats::PNG | Formats::JPEG);
    assert!(!backend.is_linear_format(&hdr));
    let err = decode(&hdr, LoadOptions::default(), &backend).unwrap_err();
    assert!(matches!(err, LoadError::DecodeFailed(ref r) if r == "Hdr support is disabled"));
}

#[test]
fn backend_limits_fail_inside_the_codec() {
    let pixels = vec![0u8; 16 * 16 * 3];
    let png = encode_png(&pixels, 16, 16, image::ColorType::Rgb8);
    let backend = ImageRsBackend::new().with_limits(Limits {
        max_width: Some(8),
        ..Default::default()
    });

    // No front-end limits: the rejection comes from image-rs.
    let err = decode(&png, LoadOptions::default(), &backend).unwrap_err();
    assert!(matches!(err, LoadError::DecodeFailed(_)), "{err:?}");

    let roomy = ImageRsBackend::new().with_limits(Limits {
        max_width: Some(16),
        max_height: Some(16),
        ..Default::default()
    });
    assert!(decode(&png, LoadOptions::default(), &roomy).is_ok());
}

#[test]
fn header_dimensions_without_decoding() {
    let png = encode_png(&[0u8; 5 * 3], 5, 3, image::ColorType::L8);
    let hdr = encode_flat_hdr(4, 2, [128, 128, 128, 129]);
    let backend = ImageRsBackend::new();
    assert_eq!(backend.dimensions(&png), Some((5, 3)));
    assert_eq!(backend.dimensions(&hdr), Some((4, 2)));
    assert_eq!(backend.dimensions(&png[..12]), None);
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn backend_is_send_and_sync() {
    assert_send_sync::<ImageRsBackend>();
}

#[test]
fn one_backend_decodes_on_many_threads() {
    let png = encode_png(&[200u8, 10, 255, 128].repeat(64), 8, 8, image::ColorType::Rgba8);
    let hdr = encode_flat_hdr(3, 3, [128, 64, 32, 129]);
    let backend = ImageRsBackend::new();

    let (rgba, linear) = std::thread::scope(|s| {
        let rgba = s.spawn(|| decode(&png, LoadOptions::premultiplied(true), &backend));
        let linear = s.spawn(|| decode(&hdr, LoadOptions::default(), &backend));
        (rgba.join().unwrap(), linear.join().unwrap())
    });

    let rgba = rgba.unwrap();
    assert_eq!(rgba.pixel_type(), PixelType::Rgba);
    assert!(rgba.pixels().chunks_exact(4).all(|px| px == [100, 5, 128, 128]));
    let linear = linear.unwrap();
    assert_eq!(linear.pixel_type(), PixelType::Rgb32F);
    assert_eq!(linear.pixels().len(), 3 * 3 * 12);
}
