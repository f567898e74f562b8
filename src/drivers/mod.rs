// StepWatch — Peripheral Drivers

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

pub mod adxl345;
pub mod display;

/// Handle to the I2C bus shared by the accelerometer and the OLED.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

/// Lock the shared bus, turning a poisoned lock into an error.
pub(crate) fn lock(
    bus: SharedBus,
) -> anyhow::Result<std::sync::MutexGuard<'static, I2cDriver<'static>>> {
    bus.lock()
        .map_err(|_| anyhow::anyhow!("I2C bus mutex poisoned"))
}
