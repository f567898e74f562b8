//! Threshold step detection and the pedometer's running state.

use core::fmt;

use log::debug;

use crate::accel::AccelSample;
use crate::calibration::Baseline;

/// Margin above the resting magnitude that registers a step, in m/s².
pub const STEP_THRESHOLD_MS2: f32 = 1.2;

/// Steps taken since boot. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepCount(u32);

impl StepCount {
    pub const ZERO: Self = Self(0);

    pub const fn new(steps: u32) -> Self {
        Self(steps)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Count one more step. Saturates rather than wrapping.
    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }
}

impl fmt::Display for StepCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single-sample instantaneous threshold test.
///
/// A sample is a step when its magnitude is strictly greater than the
/// baseline magnitude plus the threshold. There is no filtering, hysteresis
/// or minimum spacing between steps.
#[derive(Debug, Clone, Copy)]
pub struct StepDetector {
    baseline_magnitude: f32,
    threshold: f32,
}

impl StepDetector {
    pub fn new(baseline: &Baseline, threshold: f32) -> Self {
        Self {
            baseline_magnitude: baseline.magnitude(),
            threshold,
        }
    }

    /// Magnitude a sample has to exceed to count as a step.
    pub fn limit(&self) -> f32 {
        self.baseline_magnitude + self.threshold
    }

    pub fn is_step(&self, sample: &AccelSample) -> bool {
        sample.magnitude() > self.limit()
    }
}

/// Everything the main loop mutates between iterations.
#[derive(Debug, Clone)]
pub struct PedometerState {
    baseline: Baseline,
    detector: StepDetector,
    steps: StepCount,
}

impl PedometerState {
    pub fn new(baseline: Baseline, threshold: f32) -> Self {
        Self {
            baseline,
            detector: StepDetector::new(&baseline, threshold),
            steps: StepCount::ZERO,
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn detector(&self) -> &StepDetector {
        &self.detector
    }

    pub fn steps(&self) -> StepCount {
        self.steps
    }

    /// Feed one sample. Returns `true` when it registered a step, in which
    /// case the counter has already been incremented.
    pub fn observe(&mut self, sample: &AccelSample) -> bool {
        let magnitude = sample.magnitude();
        debug!("|a|={:.3} limit={:.3}", magnitude, self.detector.limit());

        if self.detector.is_step(sample) {
            self.steps.increment();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resting() -> Baseline {
        Baseline::new(AccelSample::new(0.0, 0.0, 9.0))
    }

    #[test]
    fn limit_is_baseline_magnitude_plus_threshold() {
        let baseline = Baseline::new(AccelSample::new(3.0, 4.0, 0.0));
        let detector = StepDetector::new(&baseline, 1.5);
        assert_eq!(detector.limit(), 6.5);
    }

    #[test]
    fn comparison_is_strict() {
        let detector = StepDetector::new(&resting(), 1.0);
        assert!(!detector.is_step(&AccelSample::new(0.0, 0.0, 10.0)));
        assert!(detector.is_step(&AccelSample::new(0.0, 0.0, 10.5)));
    }

    #[test]
    fn direction_does_not_matter() {
        let detector = StepDetector::new(&resting(), 1.0);
        assert!(detector.is_step(&AccelSample::new(0.0, 0.0, -11.0)));
        assert!(detector.is_step(&AccelSample::new(11.0, 0.0, 0.0)));
    }

    #[test]
    fn counter_increments_once_per_qualifying_sample() {
        let mut state = PedometerState::new(resting(), 1.0);
        let samples = [
            AccelSample::new(0.0, 0.0, 9.0),
            AccelSample::new(0.0, 0.0, 12.0),
            AccelSample::new(0.0, 0.0, 12.0),
            AccelSample::new(0.0, 0.0, 8.0),
            AccelSample::new(0.0, 6.0, 9.0),
            AccelSample::new(0.0, 0.0, 10.0),
        ];

        let mut previous = state.steps();
        let mut expected = 0;
        for sample in &samples {
            let stepped = state.observe(sample);
            assert_eq!(stepped, state.detector().is_step(sample));
            if stepped {
                expected += 1;
            }
            assert!(state.steps() >= previous);
            assert_eq!(state.steps().get(), expected);
            previous = state.steps();
        }

        assert_eq!(state.steps(), StepCount::new(3));
    }

    #[test]
    fn sustained_vibration_counts_every_sample() {
        let mut state = PedometerState::new(resting(), 1.2);
        for _ in 0..25 {
            state.observe(&AccelSample::new(0.0, 0.0, 20.0));
        }
        assert_eq!(state.steps().get(), 25);
    }

    #[test]
    fn starts_at_zero() {
        let state = PedometerState::new(resting(), STEP_THRESHOLD_MS2);
        assert_eq!(state.steps(), StepCount::ZERO);
        assert_eq!(state.baseline(), &resting());
    }

    #[test]
    fn increment_saturates() {
        let mut steps = StepCount::new(u32::MAX);
        steps.increment();
        assert_eq!(steps.get(), u32::MAX);
    }

    #[test]
    fn display_is_decimal() {
        assert_eq!(StepCount::new(8500).to_string(), "8500");
    }
}
