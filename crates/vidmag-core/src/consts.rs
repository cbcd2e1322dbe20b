/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Binomial 1D kernel used by the pyramid: [1, 4, 6, 4, 1] / 16.
pub const PYRAMID_KERNEL: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];

/// Smallest usable IIR low cutoff. A zero weight would pin the accumulator
/// at its seed value forever.
pub const IIR_CUTOFF_FLOOR: f32 = 0.001;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in a color frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Default number of pyramid layers.
pub const DEFAULT_LAYER_COUNT: usize = 3;

/// Default ring buffer length, in seconds of video.
pub const DEFAULT_BUFFER_SECONDS: usize = 5;

/// Default frame rate when the source does not report one.
pub const DEFAULT_FPS: u32 = 30;

/// Seconds per minute, for converting Hz to beats per minute.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// ROI highlight: ROI supplied by the detector (red).
pub const HIGHLIGHT_DETECTED: [u8; 3] = [255, 0, 0];

/// ROI highlight: ROI picked by a completed selection (green).
pub const HIGHLIGHT_SELECTED: [u8; 3] = [0, 255, 0];

/// ROI highlight: selection still being dragged (cyan).
pub const HIGHLIGHT_SELECTING: [u8; 3] = [0, 255, 255];
