/// Premultiply an 8-bit RGBA buffer in place.
///
/// Each of R, G, B becomes `(c * a + 255) >> 8`; alpha is left as is. Only
/// the first `width * height` pixels are touched. The rounding is fixed so
/// output matches existing consumers of premultiplied data bit for bit.
pub fn premultiply(buffer: &mut [u8], width: u32, height: u32) {
    let pixel_count = width as usize * height as usize;
    for px in buffer.chunks_exact_mut(4).take(pixel_count) {
        let a = u32::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * a + 255) >> 8) as u8;
        }
    }
}

/// Drop the alpha sample of every luminance+alpha pair, in place.
pub(crate) fn collapse_luminance_alpha(samples: &mut alloc::vec::Vec<u8>, pixel_count: usize) {
    for i in 0..pixel_count {
        samples[i] = samples[2 * i];
    }
    samples.truncate(pixel_count);
    samples.shrink_to_fit();
}
