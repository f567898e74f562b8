// StepWatch — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

use std::time::Duration;

// ---------------------------------------------------------------------------
// I2C Bus (SDA = GPIO6/D4, SCL = GPIO7/D5; shared by accelerometer and OLED)
// ---------------------------------------------------------------------------
pub const I2C_BAUDRATE_KHZ: u32 = 400;
pub const I2C_ADDR_ADXL345: u8 = 0x53; // SDO/ALT ADDRESS tied low
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024

// ---------------------------------------------------------------------------
// ADXL345 Scale Factor
// ---------------------------------------------------------------------------
pub const ADXL345_G_PER_LSB: f32 = 0.004; // 4 mg/LSB at full resolution, any range
pub const STANDARD_GRAVITY: f32 = 9.806_65; // m/s² per g

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const BOOT_SETTLE_MS: u64 = 1000; // Pause between boot stages
pub const LOOP_DELAY_MS: u64 = 2000; // One sample + one report per iteration
pub const WIFI_POLL_INTERVAL_MS: u64 = 500;
pub const WIFI_RECONNECT_POLLS: u32 = 20; // Re-issue connect every 10 s
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(30); // Body inactivity

// ---------------------------------------------------------------------------
// Status Report Endpoint
// ---------------------------------------------------------------------------
pub const REPORT_HOST: &str = match option_env!("STEPWATCH_REPORT_HOST") {
    Some(host) => host,
    None => "3.16.83.61",
};
pub const REPORT_PORT: u16 = match option_env!("STEPWATCH_REPORT_PORT") {
    Some(port) => parse_port(port),
    None => 5000,
};
/// Read and log the response body after the status line and headers.
pub const REPORT_DRAIN_BODY: bool = true;
pub const REPORT_BODY_CHUNK: usize = 256;

// ---------------------------------------------------------------------------
// Provisioning credentials (only used with the `provision` feature)
// ---------------------------------------------------------------------------
pub const PROVISION_SSID: Option<&str> = option_env!("WIFI_SSID");
pub const PROVISION_PASS: Option<&str> = option_env!("WIFI_PASS");

/// Compile-time decimal port parser; a bad value fails the build.
const fn parse_port(s: &str) -> u16 {
    let bytes = s.as_bytes();
    assert!(!bytes.is_empty(), "STEPWATCH_REPORT_PORT is empty");
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(digit.is_ascii_digit(), "STEPWATCH_REPORT_PORT is not a number");
        value = value * 10 + (digit - b'0') as u32;
        assert!(value <= u16::MAX as u32, "STEPWATCH_REPORT_PORT is out of range");
        i += 1;
    }
    value as u16
}
