use std::sync::Arc;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use tracing::debug;

/// How much effort went into a plan.
///
/// realfft picks its algorithm deterministically, so quality only decides
/// where a plan comes from: `Measured` plans are built by the long-lived
/// planner and stay in its cache, `Estimate` plans come from a throwaway
/// planner so the ever-growing window lengths of a filling ring buffer do not
/// pile up in that cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanQuality {
    Estimate,
    Measured,
}

/// Shape a set of plans was generated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub n_layers: usize,
    pub window: usize,
}

/// Forward and inverse real transforms of one window length.
#[derive(Clone)]
pub struct PlanHandle {
    pub key: PlanKey,
    pub quality: PlanQuality,
    pub forward: Arc<dyn RealToComplex<f32>>,
    pub inverse: Arc<dyn ComplexToReal<f32>>,
}

impl PlanHandle {
    pub fn window(&self) -> usize {
        self.key.window
    }

    /// Complex bins produced by the forward transform.
    pub fn bins(&self) -> usize {
        self.key.window / 2 + 1
    }
}

/// Transform plans for the ideal filter, regenerated whenever the layer
/// count or window length changes.
///
/// Every layer transforms series of the same length, so one forward/inverse
/// pair serves all of them.
pub struct TransformPlans {
    planner: RealFftPlanner<f32>,
    current: Option<PlanHandle>,
    generation: usize,
}

impl Default for TransformPlans {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformPlans {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
            current: None,
            generation: 0,
        }
    }

    /// Plans for `(n_layers, window)`, regenerating them if the key changed.
    pub fn ensure(&mut self, n_layers: usize, window: usize, quality: PlanQuality) -> PlanHandle {
        let key = PlanKey { n_layers, window };
        if let Some(handle) = &self.current {
            if handle.key == key {
                return handle.clone();
            }
        }

        let (forward, inverse) = match quality {
            PlanQuality::Measured => (
                self.planner.plan_fft_forward(window),
                self.planner.plan_fft_inverse(window),
            ),
            PlanQuality::Estimate => {
                let mut planner = RealFftPlanner::<f32>::new();
                (planner.plan_fft_forward(window), planner.plan_fft_inverse(window))
            }
        };

        self.generation += 1;
        debug!(n_layers, window, ?quality, generation = self.generation, "Regenerated transform plans");

        let handle = PlanHandle {
            key,
            quality,
            forward,
            inverse,
        };
        self.current = Some(handle.clone());
        handle
    }

    /// Key of the cached plans, if any.
    pub fn key(&self) -> Option<PlanKey> {
        self.current.as_ref().map(|h| h.key)
    }

    /// Number of times plans have been (re)generated.
    pub fn generation(&self) -> usize {
        self.generation
    }
}
