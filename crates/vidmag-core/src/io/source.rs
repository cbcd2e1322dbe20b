use crate::error::Result;
use crate::frame::{Frame, SourceInfo};

/// Anything the worker can pull frames from: a recording, a directory of
/// images, a camera or a generator.
pub trait FrameSource: Send {
    /// Dimensions, channel count, frame rate and length of the source.
    fn info(&self) -> SourceInfo;

    /// The next frame, or `None` when a non-looping source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Rewind to the first frame.
    fn start_from_beginning(&mut self) -> Result<()>;

    /// Whether the source has not yet wrapped around since it was opened or
    /// rewound. Always true for live sources.
    fn is_first_playback(&self) -> bool;
}
