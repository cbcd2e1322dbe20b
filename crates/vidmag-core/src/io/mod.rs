pub mod image_io;
pub mod sequence;
pub mod source;
pub mod synthetic;
pub mod writer;

pub use sequence::ImageSequenceSource;
pub use source::FrameSource;
pub use synthetic::SyntheticPulseSource;
pub use writer::{FrameSink, ImageSequenceWriter};
