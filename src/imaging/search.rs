//! Bounded search drivers for the file-size mode.
//!
//! Both drivers are generic over a `probe` closure that performs one trial
//! (resize and/or encode) and reports whether it fit. They know nothing about
//! images, which keeps termination and candidate bookkeeping testable on
//! their own.
//!
//! - [`bisect_scale`] halves a scale interval in `[0, 1]`, moving up after a fit
//!   and down after an overshoot.
//! - [`step_quality`] walks a lossy quality down in fixed decrements.
//!
//! Each is bounded by an attempt count; bisection is additionally bounded by
//! the interval width, so both terminate for any probe.

use super::params::Quality;

/// Termination bounds for [`bisect_scale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBounds {
    /// Hard cap on probes.
    pub max_iterations: u32,
    /// Stop once `high - low` is at or below this width.
    pub min_interval: f64,
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            min_interval: 0.01,
        }
    }
}

/// A probe that fit the target, with the parameter that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<P, T> {
    pub param: P,
    pub candidate: T,
}

/// What a search ended with.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<P, T> {
    /// Best fitting probe (largest scale, or highest quality), if any.
    pub best: Option<Hit<P, T>>,
    /// Number of probes performed.
    pub attempts: u32,
}

/// Bisect a scale factor in `[0, 1]`.
///
/// `probe(scale)` returns `Ok(Some(candidate))` when the trial fits the
/// target and `Ok(None)` when it overshoots. The last recorded fit is always
/// the largest fitting scale seen, since fits only ever move the lower bound up.
pub fn bisect_scale<T, E>(
    bounds: &SearchBounds,
    mut probe: impl FnMut(f64) -> Result<Option<T>, E>,
) -> Result<SearchOutcome<f64, T>, E> {
    let (mut low, mut high) = (0.0_f64, 1.0_f64);
    let mut best = None;
    let mut attempts = 0;

    while attempts < bounds.max_iterations && high - low > bounds.min_interval {
        let mid = (low + high) / 2.0;
        attempts += 1;
        match probe(mid)? {
            Some(candidate) => {
                best = Some(Hit {
                    param: mid,
                    candidate,
                });
                low = mid;
            }
            None => high = mid,
        }
    }

    Ok(SearchOutcome { best, attempts })
}

/// Quality ladder for [`step_quality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitySteps {
    pub start: u32,
    pub step: u32,
    pub floor: u32,
}

impl Default for QualitySteps {
    fn default() -> Self {
        Self {
            start: 95,
            step: 5,
            floor: 10,
        }
    }
}

impl QualitySteps {
    /// The qualities tried, highest first. The floor itself is always tried.
    pub fn ladder(&self) -> Vec<Quality> {
        let floor = self.floor.clamp(1, 100);
        let start = self.start.clamp(floor, 100);
        let step = self.step.max(1);
        let mut ladder: Vec<Quality> = (floor..=start)
            .rev()
            .step_by(step as usize)
            .map(Quality::new)
            .collect();
        if ladder.last().is_none_or(|q| q.value() != floor) {
            ladder.push(Quality::new(floor));
        }
        ladder
    }
}

/// Try each quality on the ladder until one fits.
pub fn step_quality<T, E>(
    steps: &QualitySteps,
    mut probe: impl FnMut(Quality) -> Result<Option<T>, E>,
) -> Result<SearchOutcome<Quality, T>, E> {
    let mut attempts = 0;
    for quality in steps.ladder() {
        attempts += 1;
        if let Some(candidate) = probe(quality)? {
            return Ok(SearchOutcome {
                best: Some(Hit {
                    param: quality,
                    candidate,
                }),
                attempts,
            });
        }
    }
    Ok(SearchOutcome {
        best: None,
        attempts,
    })
}
