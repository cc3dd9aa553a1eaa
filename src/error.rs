use thiserror::Error;

/// Everything that can go wrong while building a placeholder.
///
/// Apart from `Blurhash` and `Image`, which wrap collaborator failures, every
/// variant is a caller contract violation: retrying with the same input
/// fails the same way.
#[derive(Error, Debug)]
pub enum PlaceholderError {
    #[error("pixel buffer is empty")]
    EmptyBuffer,

    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("invalid dimensions {width}x{height}, both sides must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("{0} is too large")]
    TooLarge(&'static str),

    #[error("invalid cluster count {0}")]
    InvalidClusterCount(usize),

    #[error("sample size must be at least 1")]
    InvalidSampleSize,

    #[error(transparent)]
    Blurhash(#[from] blurhash::Error),

    #[error("unable to decode image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PlaceholderError>;
