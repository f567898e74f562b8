//! Hardware-independent core of the StepWatch pedometer firmware.
//!
//! Everything the firmware decides for itself lives here: the resting
//! baseline calibration, the threshold step detector, the three-line screen
//! layout, the status report URL and the WiFi credential bootstrap. The
//! accelerometer, delay source, key-value store and draw target are reached
//! through traits so the crate builds for the ESP32 and for host tests.

#![cfg_attr(not(test), no_std)]

pub mod accel;
pub mod calibration;
pub mod credentials;
pub mod report;
pub mod screen;
pub mod step;
pub mod step_loop;

pub use accel::{AccelSample, Accelerometer};
pub use calibration::{calibrate, Baseline, CalibrationError};
pub use credentials::{Credentials, CredentialError, KeyValueStore, LoadOutcome};
pub use step::{PedometerState, StepCount, StepDetector};
pub use step_loop::{StatusReporter, StepLoop, StepScreen};
