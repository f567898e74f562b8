// StepWatch — ADXL345 Accelerometer Driver
//
// Register-level driver over the shared I2C bus.

use stepwatch_core::{AccelSample, Accelerometer};

use super::{lock, SharedBus};
use crate::config::*;

// ADXL345 register addresses
const REG_DEVID: u8 = 0x00;
const REG_BW_RATE: u8 = 0x2C;
const REG_POWER_CTL: u8 = 0x2D;
const REG_DATA_FORMAT: u8 = 0x31;
const REG_DATAX0: u8 = 0x32; // Start of 6-byte X/Y/Z burst (little-endian)
const DEVID_EXPECTED: u8 = 0xE5;

const BW_RATE_100HZ: u8 = 0x0A;
const POWER_CTL_MEASURE: u8 = 0x08;
const DATA_FORMAT_FULL_RES_16G: u8 = 0x0B;

pub struct Adxl345 {
    bus: SharedBus,
}

impl Adxl345 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device answers with the ADXL345 device id.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = lock(self.bus) else {
            return false;
        };
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_ADXL345, &[REG_DEVID], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == DEVID_EXPECTED,
            Err(_) => false,
        }
    }

    /// Check presence, then configure 100 Hz output, full resolution ±16 g and
    /// switch to measurement mode.
    pub fn init(&self) -> anyhow::Result<()> {
        if !self.is_connected() {
            anyhow::bail!("no ADXL345 at 0x{:02X}", I2C_ADDR_ADXL345);
        }

        let mut bus = lock(self.bus)?;
        bus.write(I2C_ADDR_ADXL345, &[REG_BW_RATE, BW_RATE_100HZ], I2C_TIMEOUT_TICKS)?;
        bus.write(
            I2C_ADDR_ADXL345,
            &[REG_DATA_FORMAT, DATA_FORMAT_FULL_RES_16G],
            I2C_TIMEOUT_TICKS,
        )?;
        bus.write(I2C_ADDR_ADXL345, &[REG_POWER_CTL, POWER_CTL_MEASURE], I2C_TIMEOUT_TICKS)?;

        log::info!("ADXL345 initialised (±16g full-res, 100Hz)");
        Ok(())
    }

    /// Burst-read the three axes and convert to m/s².
    pub fn read_acceleration(&self) -> anyhow::Result<AccelSample> {
        let mut bus = lock(self.bus)?;
        let mut raw = [0u8; 6];
        bus.write_read(I2C_ADDR_ADXL345, &[REG_DATAX0], &mut raw, I2C_TIMEOUT_TICKS)?;

        let scale = ADXL345_G_PER_LSB * STANDARD_GRAVITY;
        Ok(AccelSample::new(
            i16::from_le_bytes([raw[0], raw[1]]) as f32 * scale,
            i16::from_le_bytes([raw[2], raw[3]]) as f32 * scale,
            i16::from_le_bytes([raw[4], raw[5]]) as f32 * scale,
        ))
    }
}

impl Accelerometer for Adxl345 {
    type Error = anyhow::Error;

    fn read(&mut self) -> anyhow::Result<AccelSample> {
        self.read_acceleration()
    }
}
