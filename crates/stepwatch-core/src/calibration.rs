//! Resting baseline calibration.
//!
//! The baseline approximates the gravity vector in the device's resting
//! orientation. It is only ever used as a magnitude offset by the step
//! detector, never as a directional correction.

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use thiserror_no_std::Error;

use crate::accel::{AccelSample, Accelerometer};

/// Samples averaged into the baseline.
pub const CALIBRATION_SAMPLES: u32 = 100;

/// Pause after each calibration sample.
pub const CALIBRATION_INTERVAL_MS: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("no accelerometer samples could be read during calibration ({attempts} attempts)")]
    NoSamples { attempts: u32 },
}

/// Per-axis mean resting acceleration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Baseline(AccelSample);

impl Baseline {
    pub const fn new(mean: AccelSample) -> Self {
        Self(mean)
    }

    pub fn mean(&self) -> AccelSample {
        self.0
    }

    pub fn magnitude(&self) -> f32 {
        self.0.magnitude()
    }
}

/// Incremental per-axis mean. A constant input stream yields that constant
/// exactly, with no accumulated rounding.
#[derive(Debug, Default)]
struct RunningMean {
    mean: AccelSample,
    count: u32,
}

impl RunningMean {
    fn push(&mut self, sample: AccelSample) {
        self.count += 1;
        let n = self.count as f32;
        self.mean.x += (sample.x - self.mean.x) / n;
        self.mean.y += (sample.y - self.mean.y) / n;
        self.mean.z += (sample.z - self.mean.z) / n;
    }
}

/// Read `samples` readings, pausing `interval_ms` after each, and average
/// them into a [`Baseline`].
///
/// Failed reads are logged and left out of the mean. Calibration only fails
/// when not a single reading succeeded.
pub fn calibrate<A, D>(
    sensor: &mut A,
    delay: &mut D,
    samples: u32,
    interval_ms: u32,
) -> Result<Baseline, CalibrationError>
where
    A: Accelerometer + ?Sized,
    D: DelayNs + ?Sized,
{
    info!("Calibrating: {} samples every {} ms", samples, interval_ms);

    let mut mean = RunningMean::default();
    for attempt in 0..samples {
        match sensor.read() {
            Ok(sample) => mean.push(sample),
            Err(e) => warn!("Calibration sample {} failed: {:?}", attempt, e),
        }
        delay.delay_ms(interval_ms);
    }

    if mean.count == 0 {
        return Err(CalibrationError::NoSamples { attempts: samples });
    }

    let baseline = Baseline::new(mean.mean);
    info!(
        "Done calibrating ({}/{} samples): x={:.3} y={:.3} z={:.3} |g|={:.3}",
        mean.count,
        samples,
        baseline.0.x,
        baseline.0.y,
        baseline.0.z,
        baseline.magnitude()
    );
    Ok(baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedSensor {
        readings: VecDeque<Result<AccelSample, ()>>,
    }

    impl ScriptedSensor {
        fn new(readings: impl IntoIterator<Item = Result<AccelSample, ()>>) -> Self {
            Self {
                readings: readings.into_iter().collect(),
            }
        }
    }

    impl Accelerometer for ScriptedSensor {
        type Error = ();

        fn read(&mut self) -> Result<AccelSample, ()> {
            self.readings.pop_front().unwrap_or(Err(()))
        }
    }

    struct ConstantSensor(AccelSample);

    impl Accelerometer for ConstantSensor {
        type Error = ();

        fn read(&mut self) -> Result<AccelSample, ()> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        total_ms: u64,
        calls: u32,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += u64::from(ns) / 1_000_000;
            self.calls += 1;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += u64::from(ms);
            self.calls += 1;
        }
    }

    #[test]
    fn constant_input_gives_exact_baseline() {
        let resting = AccelSample::new(0.12, -0.37, 9.81);
        let mut sensor = ConstantSensor(resting);
        let mut delay = RecordingDelay::default();

        let baseline = calibrate(
            &mut sensor,
            &mut delay,
            CALIBRATION_SAMPLES,
            CALIBRATION_INTERVAL_MS,
        )
        .unwrap();

        assert_eq!(baseline.mean(), resting);
    }

    #[test]
    fn baseline_is_arithmetic_mean() {
        let mut sensor = ScriptedSensor::new([
            Ok(AccelSample::new(1.0, 0.0, 8.0)),
            Ok(AccelSample::new(2.0, -2.0, 10.0)),
            Ok(AccelSample::new(3.0, 2.0, 12.0)),
            Ok(AccelSample::new(6.0, 4.0, 10.0)),
        ]);
        let mut delay = RecordingDelay::default();

        let baseline = calibrate(&mut sensor, &mut delay, 4, 10).unwrap();

        let mean = baseline.mean();
        assert!((mean.x - 3.0).abs() < 1e-6);
        assert!((mean.y - 1.0).abs() < 1e-6);
        assert!((mean.z - 10.0).abs() < 1e-6);
    }

    #[test]
    fn waits_the_interval_after_every_sample() {
        let mut sensor = ConstantSensor(AccelSample::new(0.0, 0.0, 9.8));
        let mut delay = RecordingDelay::default();

        calibrate(&mut sensor, &mut delay, 100, 100).unwrap();

        assert_eq!(delay.calls, 100);
        assert_eq!(delay.total_ms, 10_000);
    }

    #[test]
    fn failed_reads_are_left_out_of_the_mean() {
        let mut sensor = ScriptedSensor::new([
            Ok(AccelSample::new(2.0, 2.0, 2.0)),
            Err(()),
            Ok(AccelSample::new(4.0, 4.0, 4.0)),
        ]);
        let mut delay = RecordingDelay::default();

        let baseline = calibrate(&mut sensor, &mut delay, 3, 1).unwrap();

        assert_eq!(baseline.mean(), AccelSample::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn all_reads_failing_is_an_error() {
        let mut sensor = ScriptedSensor::new([Err(()), Err(())]);
        let mut delay = RecordingDelay::default();

        let result = calibrate(&mut sensor, &mut delay, 2, 1);

        assert_eq!(result, Err(CalibrationError::NoSamples { attempts: 2 }));
    }

    #[test]
    fn zero_samples_is_an_error() {
        let mut sensor = ConstantSensor(AccelSample::default());
        let mut delay = RecordingDelay::default();

        assert!(calibrate(&mut sensor, &mut delay, 0, 100).is_err());
        assert_eq!(delay.calls, 0);
    }
}
