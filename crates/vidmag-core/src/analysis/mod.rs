pub mod heartbeat;

pub use heartbeat::{AnalysisResult, HeartbeatAnalyzer};

use num_traits::Float;

/// Scale `values` linearly onto [0, 1]. A flat series maps to all zeros.
pub fn normalize_min_max<T: Float>(values: &[T]) -> Vec<T> {
    let (min, max) = values
        .iter()
        .fold((T::infinity(), T::neg_infinity()), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !(range > T::zero()) {
        return vec![T::zero(); values.len()];
    }
    values.iter().map(|&v| (v - min) / range).collect()
}

/// Mean and population standard deviation.
pub fn mean_std<T: Float>(values: &[T]) -> (T, T) {
    if values.is_empty() {
        return (T::zero(), T::zero());
    }
    let n = T::from(values.len()).unwrap_or_else(T::one);
    let mean = values.iter().fold(T::zero(), |acc, &v| acc + v) / n;
    let var = values
        .iter()
        .fold(T::zero(), |acc, &v| acc + (v - mean) * (v - mean))
        / n;
    (mean, var.sqrt())
}

/// Index of the first maximum.
pub fn argmax<T: Float>(values: &[T]) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
