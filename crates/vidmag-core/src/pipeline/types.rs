use crate::analysis::AnalysisResult;
use crate::frame::Frame;
use crate::roi::{Rect, RoiOverlay};

/// Everything the display and encoder need for one processed frame.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// The magnified frame, back in RGB.
    pub frame: Frame,
    /// Highlight to draw. `color` is the last highlight color picked, or
    /// `None` before any highlight was shown.
    pub overlay: RoiOverlay,
    /// ROI processed this frame.
    pub roi: Rect,
    /// Whether `roi` differs from the configured ROI and should be published
    /// back to the control surface.
    pub roi_adopted: bool,
    /// Whether the frame store discarded its history for this frame.
    pub reallocated: bool,
    pub analysis: Option<AnalysisResult>,
}
