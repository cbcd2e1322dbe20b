use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidmagError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid frame dimensions: {width}x{height}x{channels}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("Frame shape {found:?} does not match configured shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("Invalid ROI {x},{y} {width}x{height}: {reason}")]
    InvalidRoi {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        reason: String,
    },

    #[error("Layer {scale} out of range (layers: {total})")]
    LayerOutOfRange { scale: usize, total: usize },

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("No frame has been pushed")]
    NoCurrentFrame,

    #[error("Empty frame sequence")]
    EmptySequence,
}

pub type Result<T> = std::result::Result<T, VidmagError>;
