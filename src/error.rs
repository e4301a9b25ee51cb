use alloc::string::String;
use enough::StopReason;

/// Errors from image loading.
///
/// None of these are retryable: the same bytes always produce the same outcome.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The backend could not parse or decompress the stream.
    #[error("failed to load image: {0}")]
    DecodeFailed(String),

    /// The resolved channel count has no matching [`crate::PixelType`].
    #[error("unsupported channel layout: {channels} channel(s) in {} image", branch_name(.linear))]
    UnsupportedChannelLayout { channels: u8, linear: bool },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for LoadError {
    fn from(r: StopReason) -> Self {
        LoadError::Cancelled(r)
    }
}

fn branch_name(linear: &bool) -> &'static str {
    if *linear { "linear" } else { "8-bit" }
}
