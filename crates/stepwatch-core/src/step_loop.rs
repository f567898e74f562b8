//! One iteration of the pedometer loop, over the sensor, screen and
//! reporter seams.
//!
//! Sample, run the threshold test, redraw on a new step, then report the
//! running total. Every failure inside an iteration is logged and the next
//! iteration runs as usual.

use core::fmt;

use log::{info, warn};

use crate::accel::Accelerometer;
use crate::step::{PedometerState, StepCount};

/// Something that shows the current count.
pub trait StepScreen {
    type Error: fmt::Debug;

    fn show_steps(&mut self, steps: StepCount) -> Result<(), Self::Error>;
}

/// Something that sends the current count upstream.
pub trait StatusReporter {
    type Error: fmt::Debug;

    fn report(&mut self, steps: StepCount) -> Result<(), Self::Error>;
}

/// What happened during one [`StepLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub stepped: bool,
    pub redrawn: bool,
    pub reported: bool,
}

pub struct StepLoop<A, S, R> {
    sensor: A,
    screen: S,
    reporter: R,
}

impl<A, S, R> StepLoop<A, S, R>
where
    A: Accelerometer,
    S: StepScreen,
    R: StatusReporter,
{
    pub fn new(sensor: A, screen: S, reporter: R) -> Self {
        Self {
            sensor,
            screen,
            reporter,
        }
    }

    pub fn tick(&mut self, state: &mut PedometerState) -> Tick {
        let mut stepped = false;
        let mut redrawn = false;

        match self.sensor.read() {
            Ok(sample) => {
                if state.observe(&sample) {
                    stepped = true;
                    info!("Step detected! Total steps: {}", state.steps());
                    match self.screen.show_steps(state.steps()) {
                        Ok(()) => redrawn = true,
                        Err(e) => warn!("Display error: {:?}", e),
                    }
                }
            }
            Err(e) => warn!("Accelerometer read error: {:?}", e),
        }

        // Reported every iteration, whether or not a step was seen.
        let reported = match self.reporter.report(state.steps()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Report failed: {:?}", e);
                false
            }
        };

        Tick {
            stepped,
            redrawn,
            reported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::AccelSample;
    use crate::calibration::Baseline;
    use std::collections::VecDeque;

    const STILL: AccelSample = AccelSample::new(0.0, 0.0, 9.0);
    const JOLT: AccelSample = AccelSample::new(0.0, 0.0, 14.0);

    struct ScriptedSensor(VecDeque<Result<AccelSample, ()>>);

    impl Accelerometer for ScriptedSensor {
        type Error = ();

        fn read(&mut self) -> Result<AccelSample, ()> {
            self.0.pop_front().unwrap_or(Ok(STILL))
        }
    }

    #[derive(Default)]
    struct RecordingScreen {
        shown: Vec<u32>,
        fail: bool,
    }

    impl StepScreen for RecordingScreen {
        type Error = &'static str;

        fn show_steps(&mut self, steps: StepCount) -> Result<(), &'static str> {
            if self.fail {
                return Err("bus error");
            }
            self.shown.push(steps.get());
            Ok(())
        }
    }

    /// Fails the calls whose index is listed, records every attempt.
    #[derive(Default)]
    struct RecordingReporter {
        attempts: Vec<u32>,
        fail_on: Vec<usize>,
    }

    impl StatusReporter for RecordingReporter {
        type Error = &'static str;

        fn report(&mut self, steps: StepCount) -> Result<(), &'static str> {
            let call = self.attempts.len();
            self.attempts.push(steps.get());
            if self.fail_on.contains(&call) {
                Err("connect failed")
            } else {
                Ok(())
            }
        }
    }

    fn step_loop(
        samples: impl IntoIterator<Item = Result<AccelSample, ()>>,
        reporter: RecordingReporter,
    ) -> StepLoop<ScriptedSensor, RecordingScreen, RecordingReporter> {
        StepLoop::new(
            ScriptedSensor(samples.into_iter().collect()),
            RecordingScreen::default(),
            reporter,
        )
    }

    fn state() -> PedometerState {
        PedometerState::new(Baseline::new(STILL), 1.2)
    }

    #[test]
    fn failed_report_does_not_stop_the_next_iteration() {
        let reporter = RecordingReporter {
            fail_on: vec![0],
            ..Default::default()
        };
        let mut lp = step_loop([Ok(JOLT), Ok(JOLT)], reporter);
        let mut state = state();

        let first = lp.tick(&mut state);
        let second = lp.tick(&mut state);

        assert!(!first.reported);
        assert!(second.reported);
        assert!(second.stepped);
        assert_eq!(lp.reporter.attempts, vec![1, 2]);
    }

    #[test]
    fn reports_even_without_a_step() {
        let mut lp = step_loop([Ok(STILL), Ok(STILL)], RecordingReporter::default());
        let mut state = state();

        let tick = lp.tick(&mut state);
        lp.tick(&mut state);

        assert_eq!(
            tick,
            Tick {
                stepped: false,
                redrawn: false,
                reported: true
            }
        );
        assert_eq!(lp.reporter.attempts, vec![0, 0]);
    }

    #[test]
    fn redraws_only_when_the_count_changes() {
        let mut lp = step_loop(
            [Ok(STILL), Ok(JOLT), Ok(STILL), Ok(JOLT), Ok(JOLT)],
            RecordingReporter::default(),
        );
        let mut state = state();

        for _ in 0..5 {
            lp.tick(&mut state);
        }

        assert_eq!(lp.screen.shown, vec![1, 2, 3]);
        assert_eq!(lp.reporter.attempts, vec![0, 1, 1, 2, 3]);
    }

    #[test]
    fn read_error_counts_no_step_but_still_reports() {
        let mut lp = step_loop([Err(()), Ok(JOLT)], RecordingReporter::default());
        let mut state = state();

        let failed = lp.tick(&mut state);

        assert!(!failed.stepped);
        assert!(failed.reported);
        assert_eq!(state.steps(), StepCount::ZERO);
        assert!(lp.screen.shown.is_empty());

        lp.tick(&mut state);
        assert_eq!(state.steps().get(), 1);
        assert_eq!(lp.reporter.attempts, vec![0, 1]);
    }

    #[test]
    fn display_failure_still_counts_and_reports() {
        let mut lp = step_loop([Ok(JOLT)], RecordingReporter::default());
        lp.screen.fail = true;
        let mut state = state();

        let tick = lp.tick(&mut state);

        assert!(tick.stepped);
        assert!(!tick.redrawn);
        assert!(tick.reported);
        assert_eq!(lp.reporter.attempts, vec![1]);
    }
}
