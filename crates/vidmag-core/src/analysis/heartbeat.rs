use std::sync::Arc;

use ndarray::Array2;
use realfft::{RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::SECONDS_PER_MINUTE;
use crate::container::DataContainer;

use super::{argmax, mean_std, normalize_min_max};

/// Output of one heartbeat analysis, ready for plotting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Seconds since the oldest sample.
    pub timedomain_keys: Vec<f64>,
    /// Best channel's ROI average, normalized to [0, 1].
    pub timedomain_values: Vec<f64>,
    /// Bin frequencies in Hz (DC excluded).
    pub frequencydomain_keys: Vec<f64>,
    /// Best channel's magnitude spectrum, normalized to [0, 1].
    pub frequencydomain_values: Vec<f64>,
    /// Dominant frequency in cycles per minute.
    pub heartbeat_rate: f64,
    /// Channel the result was computed from.
    pub best_channel: usize,
}

/// Estimates the dominant oscillation in the ROI average intensity.
///
/// The full configured ring is transformed even before it has filled; the
/// unfilled slots are zero and show up as a startup transient.
pub struct HeartbeatAnalyzer {
    planner: RealFftPlanner<f32>,
    plan: Option<(usize, Arc<dyn RealToComplex<f32>>)>,
    generation: usize,
}

impl Default for HeartbeatAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartbeatAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
            plan: None,
            generation: 0,
        }
    }

    /// Analyze the ROI averages recorded by `container`.
    pub fn analyze(&mut self, container: &DataContainer) -> Option<AnalysisResult> {
        let fps = container.params().fps;
        // After a pop the cursor points at the oldest sample.
        let oldest = container.ring_slot();
        self.analyze_samples(container.average_roi_pixels(), oldest, fps)
    }

    /// Analyze a `(channels, n)` ring of ROI averages whose oldest sample is
    /// in column `oldest`. Returns `None` if there is no non-DC bin.
    pub fn analyze_samples(
        &mut self,
        samples: &Array2<f32>,
        oldest: usize,
        fps: u32,
    ) -> Option<AnalysisResult> {
        let (n_channels, n) = samples.dim();
        if n_channels == 0 || n < 2 {
            return None;
        }
        let fps = fps.max(1) as f64;
        let fft = self.plan_for(n);

        let mut spectrum = fft.make_output_vec();
        let spectra: Vec<Vec<f64>> = samples
            .rows()
            .into_iter()
            .map(|row| {
                let mut input = row.to_vec();
                fft.process(&mut input, &mut spectrum).ok()?;
                Some(spectrum[1..=n / 2].iter().map(|c| c.norm() as f64).collect())
            })
            .collect::<Option<_>>()?;

        let mut best_channel = 0;
        let mut min_std = f64::INFINITY;
        for (channel, magnitudes) in spectra.iter().enumerate() {
            let (_, std) = mean_std(magnitudes);
            if std < min_std {
                min_std = std;
                best_channel = channel;
            }
        }

        let timeseries: Vec<f64> = (0..n)
            .map(|i| samples[[best_channel, (oldest + i) % n]] as f64)
            .collect();
        let magnitudes = &spectra[best_channel];
        let peak_bin = argmax(magnitudes)? + 1;

        debug!(best_channel, peak_bin, "Heartbeat analysis");

        Some(AnalysisResult {
            timedomain_keys: (0..n).map(|i| i as f64 / fps).collect(),
            timedomain_values: normalize_min_max(&timeseries),
            frequencydomain_keys: (1..=n / 2).map(|k| k as f64 * fps / n as f64).collect(),
            frequencydomain_values: normalize_min_max(magnitudes),
            heartbeat_rate: peak_bin as f64 * fps / n as f64 * SECONDS_PER_MINUTE,
            best_channel,
        })
    }

    fn plan_for(&mut self, n: usize) -> Arc<dyn RealToComplex<f32>> {
        match &self.plan {
            Some((len, plan)) if *len == n => Arc::clone(plan),
            _ => {
                let plan = self.planner.plan_fft_forward(n);
                self.generation += 1;
                debug!(n, generation = self.generation, "Regenerated analysis plan");
                self.plan = Some((n, Arc::clone(&plan)));
                plan
            }
        }
    }

    /// Number of times the transform plan has been (re)generated.
    pub fn generation(&self) -> usize {
        self.generation
    }
}
