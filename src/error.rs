use thiserror::Error;

/// Result type alias for cloud generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the generation pipeline.
///
/// Running out of room mid-layout is not an error: unplaceable words are
/// skipped with a warning and the frequency table simply comes out shorter.
#[derive(Error, Debug)]
pub enum Error {
    /// Font size bounds must be positive with min <= max
    #[error("invalid font size bounds: min {min} must be positive and no greater than max {max}")]
    FontSizeRange { min: f32, max: f32 },

    /// The shrink step used when a word does not fit
    #[error("font step must be positive, got {0}")]
    FontStep(f32),

    /// The word cap must allow at least one word
    #[error("max words must be at least 1")]
    MaxWords,

    /// Output scale factor must be positive
    #[error("render scale must be positive, got {0}")]
    Scale(f32),

    /// Mask rasters must span at least one pixel in each direction
    #[error("mask must have non-zero dimensions, got {width}x{height}")]
    MaskDimensions { width: u32, height: u32 },

    /// No tokens survived normalization and stop-word filtering
    #[error("no words left after tokenization and stop-word filtering")]
    EmptyInput,

    /// Every word failed placement, e.g. the mask has no eligible region
    #[error("no placement found for any word within the canvas")]
    NothingPlaced,

    #[error("unknown color scheme: {0:?}")]
    UnknownColorScheme(String),

    #[error("text input is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("font data could not be parsed")]
    InvalidFont(#[from] ab_glyph::InvalidFont),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
