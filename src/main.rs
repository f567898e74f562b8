// StepWatch — Firmware Entry Point
//
// Boot sequence:
//   1. Read WiFi credentials from NVS (missing or unreadable is not fatal).
//   2. Bring up the I2C bus and the ADXL345. No sensor → halt forever.
//   3. Calibrate the resting baseline.
//   4. Initialise the OLED and draw the zero count.
//   5. Associate with WiFi (blocks until connected).
//   6. Run the step loop: sample → detect → redraw → report → sleep.
//
// With the `provision` feature the firmware instead stores the build-time
// credentials in NVS and idles.

mod config;
mod drivers;
mod nvs;
mod provision;
mod report;
mod wifi;

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use stepwatch_core::calibration::{CALIBRATION_INTERVAL_MS, CALIBRATION_SAMPLES};
use stepwatch_core::step::STEP_THRESHOLD_MS2;
use stepwatch_core::{calibrate, PedometerState, StepLoop, StepScreen};

use crate::config::*;
use crate::drivers::adxl345::Adxl345;
use crate::drivers::display::OledDisplay;
use crate::drivers::SharedBus;
use crate::report::Reporter;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
fn main() -> anyhow::Result<()> {
    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("StepWatch firmware starting…");
    thread::sleep(Duration::from_millis(BOOT_SETTLE_MS));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    // Initialises NVS flash, erasing it first if the partition is stale.
    let nvs_partition = EspDefaultNvsPartition::take()?;

    if cfg!(feature = "provision") {
        return provision::run(nvs_partition);
    }

    // ---- Credentials (before anything else touches the network) ----------
    let credentials = nvs::load_boot_credentials(nvs_partition.clone());
    thread::sleep(Duration::from_millis(BOOT_SETTLE_MS));

    // ---- I2C bus (shared between ADXL345 and OLED) -------------------------
    let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    // Lives for the rest of the programme (firmware never exits).
    let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));

    // ---- Accelerometer: fail-stop if missing --------------------------------
    let mut imu = Adxl345::new(i2c_bus);
    if let Err(e) = imu.init() {
        log::error!("Could not find ADXL345, check wiring! ({:#})", e);
        halt();
    }

    let baseline = match calibrate(
        &mut imu,
        &mut FreeRtos,
        CALIBRATION_SAMPLES,
        CALIBRATION_INTERVAL_MS,
    ) {
        Ok(baseline) => baseline,
        Err(e) => {
            log::error!("Calibration failed: {}", e);
            halt();
        }
    };
    let mut state = PedometerState::new(baseline, STEP_THRESHOLD_MS2);

    // ---- Display --------------------------------------------------------------
    let mut display = OledDisplay::new(i2c_bus);
    if !display.is_connected() {
        log::error!("OLED not responding at 0x{:02X}", I2C_ADDR_OLED);
    }
    if let Err(e) = display.init().and_then(|()| display.show_steps(state.steps())) {
        // Not fatal: steps are still counted and reported.
        log::error!("Display error: {:#}", e);
    }

    // ---- Network --------------------------------------------------------------
    thread::sleep(Duration::from_millis(BOOT_SETTLE_MS));
    let _wifi = wifi::connect(peripherals.modem, sysloop, nvs_partition, &credentials)?;

    // ---- Step loop ------------------------------------------------------------
    let reporter = Reporter::new(REPORT_HOST, REPORT_PORT, REPORT_DRAIN_BODY);
    let mut step_loop = StepLoop::new(imu, display, reporter);
    log::info!(
        "Reporting to {}:{} every {} ms",
        REPORT_HOST,
        REPORT_PORT,
        LOOP_DELAY_MS
    );

    let delay = Duration::from_millis(LOOP_DELAY_MS);
    loop {
        step_loop.tick(&mut state);
        thread::sleep(delay);
    }
}

/// Park the main task forever. Used for the fail-stop paths: the display
/// keeps whatever it showed last.
pub fn halt() -> ! {
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
