#![no_main]
use libfuzzer_sys::fuzz_target;
use zenload::{DecodeRequest, ImageRsBackend, Limits};

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(256 << 20),
        ..Default::default()
    };
    let backend = ImageRsBackend::new().with_limits(limits.clone());

    // Every channel request and premultiply setting must either succeed with
    // a correctly sized buffer or fail cleanly.
    for desired in 0..=4u8 {
        for premultiply in [false, true] {
            if let Ok(image) = DecodeRequest::new(data)
                .desired_channels(desired)
                .premultiply_alpha(premultiply)
                .with_limits(&limits)
                .decode(&backend, enough::Unstoppable)
            {
                let expected = image.width() as usize
                    * image.height() as usize
                    * image.pixel_type().bytes_per_pixel();
                assert_eq!(image.pixels().len(), expected);
            }
        }
    }
});
