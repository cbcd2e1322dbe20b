//! Region-of-interest geometry and selection handling.
//!
//! The pyramid halves the ROI `n_layers - 1` times, so every ROI handed to
//! the pipeline must have a width and height divisible by `2^(n_layers - 1)`.
//! [`align_rect`] enforces that by center-cropping.

use serde::{Deserialize, Serialize};

use crate::consts::{HIGHLIGHT_DETECTED, HIGHLIGHT_SELECTED, HIGHLIGHT_SELECTING};
use crate::frame::Frame;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies completely inside a `width` x `height` frame.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// Intersect with a `width` x `height` frame.
    pub fn clamp_to(&self, width: usize, height: usize) -> Rect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Rect::new(
            x,
            y,
            self.right().min(width) - x,
            self.bottom().min(height) - y,
        )
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Size `(width, height)` of pyramid layer `layer` for an ROI of the given size.
pub fn fit_to_layer(width: usize, height: usize, layer: usize) -> (usize, usize) {
    (width >> layer, height >> layer)
}

/// Pixel grid the ROI must be aligned to for `n_layers` pyramid layers.
pub fn alignment(n_layers: usize) -> usize {
    1usize << n_layers.saturating_sub(1)
}

/// Center-crop `rect` so its width and height are multiples of `2^(n_layers-1)`.
pub fn align_rect(rect: &Rect, n_layers: usize) -> Rect {
    let align = alignment(n_layers);
    let excess_w = rect.width % align;
    let excess_h = rect.height % align;
    Rect::new(
        rect.x + excess_w / 2,
        rect.y + excess_h / 2,
        rect.width - excess_w,
        rect.height - excess_h,
    )
}

/// Mouse-driven rectangle selection as reported by a control surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub selecting: bool,
    pub complete: bool,
    pub fresh: bool,
    pub point_from: (usize, usize),
    pub point_to: (usize, usize),
}

impl Selection {
    /// Rectangle spanned by the two drag endpoints, in either drag direction.
    pub fn rect(&self) -> Rect {
        let (x1, x2) = min_max(self.point_from.0, self.point_to.0);
        let (y1, y2) = min_max(self.point_from.1, self.point_to.1);
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn press(&mut self, x: usize, y: usize) {
        self.point_from = (x, y);
        self.point_to = (x, y);
        self.selecting = true;
        self.complete = false;
        self.fresh = true;
    }

    pub fn drag(&mut self, x: usize, y: usize) {
        if !self.selecting {
            return;
        }
        self.point_to = (x, y);
        self.fresh = true;
    }

    /// Finish the drag. Releasing on the press point cancels the selection.
    pub fn release(&mut self, x: usize, y: usize) {
        self.selecting = false;
        self.fresh = true;
        if self.point_from == (x, y) {
            self.complete = false;
        } else {
            self.point_to = (x, y);
            self.complete = true;
        }
    }

    /// Mark the selection as seen by the pipeline.
    pub fn consume(&mut self) {
        self.fresh = false;
    }

    /// A completed selection of `rect`, as if dragged corner to corner.
    pub fn completed(rect: Rect) -> Self {
        Self {
            selecting: false,
            complete: true,
            fresh: true,
            point_from: (rect.x, rect.y),
            point_to: (rect.right(), rect.bottom()),
        }
    }
}

fn min_max(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Supplies an initial ROI when the user has not selected one.
pub trait RoiDetector: Send {
    fn detect(&self, frame: &Frame) -> Option<Rect>;
}

/// Detector fallback: the whole frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullFrameDetector;

impl RoiDetector for FullFrameDetector {
    fn detect(&self, frame: &Frame) -> Option<Rect> {
        Some(frame.bounds())
    }
}

/// Rectangle and color to draw on the display output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiOverlay {
    pub rect: Rect,
    pub color: Option<[u8; 3]>,
}

/// Outcome of [`resolve_roi`] for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiDecision {
    /// ROI the pipeline processes this frame (aligned).
    pub roi: Rect,
    pub overlay: RoiOverlay,
    /// Whether `roi` replaces the configured ROI and should be published back.
    pub adopted: bool,
}

/// Decide this frame's ROI from the selection state.
///
/// - No selection and no spatial filtering: ask the detector (red highlight).
/// - Fresh, completed selection: adopt the selected rectangle (green).
/// - Fresh, in-progress drag: keep processing the configured ROI but show the
///   rectangle being dragged (cyan).
/// - Otherwise keep the configured ROI.
///
/// An empty or out-of-frame configured ROI falls back to the full frame. The
/// returned ROI is always aligned to `n_layers`.
pub fn resolve_roi(
    selection: &Selection,
    configured: Rect,
    spatial_filter_active: bool,
    n_layers: usize,
    frame: &Frame,
    detector: &dyn RoiDetector,
) -> RoiDecision {
    let (w, h) = (frame.width(), frame.height());
    let usable = |rect: Rect| -> Rect {
        let clamped = rect.clamp_to(w, h);
        let aligned = align_rect(&clamped, n_layers);
        if aligned.is_empty() {
            align_rect(&frame.bounds(), n_layers)
        } else {
            aligned
        }
    };

    if !selection.complete && !selection.selecting && !spatial_filter_active {
        let detected = detector.detect(frame).unwrap_or_else(|| frame.bounds());
        let roi = usable(detected);
        return RoiDecision {
            roi,
            overlay: RoiOverlay {
                rect: roi,
                color: Some(HIGHLIGHT_DETECTED),
            },
            adopted: roi != configured,
        };
    }

    if selection.fresh && selection.complete && !selection.selecting {
        let roi = usable(selection.rect());
        return RoiDecision {
            roi,
            overlay: RoiOverlay {
                rect: roi,
                color: Some(HIGHLIGHT_SELECTED),
            },
            adopted: roi != configured,
        };
    }

    let roi = usable(configured);
    let overlay = if selection.fresh && !selection.complete && selection.selecting {
        RoiOverlay {
            rect: selection.rect().clamp_to(w, h),
            color: Some(HIGHLIGHT_SELECTING),
        }
    } else {
        RoiOverlay {
            rect: roi,
            color: None,
        }
    };
    RoiDecision {
        roi,
        overlay,
        adopted: roi != configured,
    }
}
