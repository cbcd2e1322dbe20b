use tracing::debug;

use crate::analysis::HeartbeatAnalyzer;
use crate::container::DataContainer;
use crate::error::Result;
use crate::frame::Frame;
use crate::roi::{resolve_roi, FullFrameDetector, RoiDetector, Selection};
use crate::spatial::{spatial_comp, spatial_decomp};
use crate::temporal::{iir_filter, IdealFilter};

use super::config::{ParameterStore, TemporalFilterType};
use super::types::FrameOutput;

/// Per-frame magnification pipeline.
///
/// Owns the frame store and every transform plan; one instance lives on the
/// worker thread for the lifetime of a source.
pub struct Magnifier {
    container: Option<DataContainer>,
    ideal: IdealFilter,
    analyzer: HeartbeatAnalyzer,
    detector: Box<dyn RoiDetector>,
    last_color: Option<[u8; 3]>,
}

impl Default for Magnifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Magnifier {
    pub fn new() -> Self {
        Self::with_detector(Box::new(FullFrameDetector))
    }

    pub fn with_detector(detector: Box<dyn RoiDetector>) -> Self {
        Self {
            container: None,
            ideal: IdealFilter::new(),
            analyzer: HeartbeatAnalyzer::new(),
            detector,
            last_color: None,
        }
    }

    /// Run one frame through the pipeline under the configuration snapshot
    /// `params`.
    pub fn process(
        &mut self,
        mut frame: Frame,
        params: &ParameterStore,
        selection: &Selection,
    ) -> Result<FrameOutput> {
        let mut params = params.sanitized();

        let decision = resolve_roi(
            selection,
            params.roi,
            params.spatial_active(),
            params.n_layers,
            &frame,
            self.detector.as_ref(),
        );
        if decision.roi != params.roi {
            debug!(configured = %params.roi, roi = %decision.roi, layers = params.n_layers, "ROI changed");
        }
        params.roi = decision.roi;

        let mut overlay = decision.overlay;
        if overlay.color.is_some() {
            self.last_color = overlay.color;
        }
        overlay.color = self.last_color;

        params.color_space.forward(&mut frame.data);

        let (mut container, reallocated) = match self.container.take() {
            Some(container) => {
                let reallocated = container.params().requires_reallocation(&params);
                (container, reallocated)
            }
            None => (DataContainer::new(&params)?, true),
        };
        let pushed = container.push_frame(frame, &params);
        let container = self.container.insert(container);
        pushed?;

        if params.spatial_active() {
            spatial_decomp(container)?;
            match params.temporal_filter {
                TemporalFilterType::Ideal => self.ideal.apply(&params, container)?,
                TemporalFilterType::Iir => iir_filter(&params, container)?,
            }
            spatial_comp(container)?;
        }

        let mut out = container.pop_frame()?;
        let analysis = if params.analyze_heartbeat {
            self.analyzer.analyze(container)
        } else {
            None
        };

        params.color_space.backward(&mut out.data);

        Ok(FrameOutput {
            frame: out,
            overlay,
            roi: params.roi,
            roi_adopted: decision.adopted,
            reallocated,
            analysis,
        })
    }

    /// Drop all history, as when the source is rewound or replaced.
    pub fn reset(&mut self) {
        self.container = None;
    }

    pub fn container(&self) -> Option<&DataContainer> {
        self.container.as_ref()
    }

    pub fn ideal_filter(&self) -> &IdealFilter {
        &self.ideal
    }

    pub fn analyzer(&self) -> &HeartbeatAnalyzer {
        &self.analyzer
    }
}
