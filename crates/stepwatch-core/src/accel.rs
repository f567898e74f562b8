//! Three-axis acceleration samples and the sensor seam.

/// One accelerometer reading in m/s².
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AccelSample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the three axes.
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}

/// A source of three-axis acceleration samples.
pub trait Accelerometer {
    type Error: core::fmt::Debug;

    /// Take a single reading.
    fn read(&mut self) -> Result<AccelSample, Self::Error>;
}
