//! Container format detection and backend capability sets.

/// Container format detected from magic bytes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    /// Radiance RGBE (`.hdr`), the only linear format.
    Hdr,
    Bmp,
    Gif,
    /// Binary PNM: P5 (PGM), P6 (PPM), P7 (PAM).
    Pnm,
}

const RADIANCE_SIGNATURES: [&[u8]; 2] = [b"#?RADIANCE\n", b"#?RGBE\n"];

impl ImageFormat {
    /// Detect the container from its leading bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if RADIANCE_SIGNATURES.iter().any(|sig| data.starts_with(sig)) {
            return Some(Self::Hdr);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if data.starts_with(b"BM") {
            return Some(Self::Bmp);
        }
        match data {
            [b'P', b'5' | b'6' | b'7', ..] => Some(Self::Pnm),
            _ => None,
        }
    }

    /// Whether samples in this format are linear light.
    pub fn is_linear(self) -> bool {
        matches!(self, Self::Hdr)
    }

    /// The capability flag for this format.
    pub fn flag(self) -> Formats {
        match self {
            Self::Png => Formats::PNG,
            Self::Jpeg => Formats::JPEG,
            Self::Hdr => Formats::HDR,
            Self::Bmp => Formats::BMP,
            Self::Gif => Formats::GIF,
            Self::Pnm => Formats::PNM,
        }
    }
}

bitflags::bitflags! {
    /// Set of container formats a backend will accept.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Formats: u16 {
        const PNG = 1 << 0;
        const JPEG = 1 << 1;
        const HDR = 1 << 2;
        const BMP = 1 << 3;
        const GIF = 1 << 4;
        const PNM = 1 << 5;
    }
}

impl Formats {
    /// Formats whose codecs are linked into this build.
    pub fn compiled() -> Self {
        [
            (cfg!(feature = "png"), Self::PNG),
            (cfg!(feature = "jpeg"), Self::JPEG),
            (cfg!(feature = "hdr"), Self::HDR),
            (cfg!(feature = "bmp"), Self::BMP),
            (cfg!(feature = "gif"), Self::GIF),
            (cfg!(feature = "pnm"), Self::PNM),
        ]
        .into_iter()
        .filter(|&(linked, _)| linked)
        .fold(Self::empty(), |set, (_, flag)| set | flag)
    }

    pub fn supports(self, format: ImageFormat) -> bool {
        self.contains(format.flag())
    }
}
