// StepWatch — SSD1306 OLED Driver
//
// 128x64 monochrome panel on the shared I2C bus. Drawing goes into a RAM
// framebuffer through embedded-graphics; `flush` pushes the whole buffer to
// the panel in horizontal addressing mode.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use stepwatch_core::screen::draw_step_screen;
use stepwatch_core::{StepCount, StepScreen};

use super::{lock, SharedBus};
use crate::config::*;

// I2C control bytes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

const CMD_DISPLAY_OFF: u8 = 0xAE;
const CMD_NOP: u8 = 0xE3;
const CMD_COLUMN_ADDR: u8 = 0x21;
const CMD_PAGE_ADDR: u8 = 0x22;

/// Power-up sequence for a 128x64 panel with the internal charge pump.
const INIT_SEQUENCE: &[u8] = &[
    CMD_DISPLAY_OFF,
    0xD5, 0x80, // clock divide ratio / oscillator
    0xA8, 0x3F, // multiplex ratio: 64
    0xD3, 0x00, // display offset: 0
    0x40,       // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing mode
    0xA1,       // segment remap
    0xC8,       // COM scan descending
    0xDA, 0x12, // COM pins: alternative
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge period
    0xDB, 0x40, // VCOMH deselect level
    0xA4,       // display follows RAM
    0xA6,       // normal (not inverted)
    0xAF,       // display on
];

const DATA_CHUNK: usize = 16;

pub struct OledDisplay {
    bus: SharedBus,
    buffer: [u8; DISPLAY_BUFFER_SIZE],
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            buffer: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    /// Check that the panel acknowledges a no-op command.
    pub fn is_connected(&self) -> bool {
        self.command(&[CMD_NOP]).is_ok()
    }

    /// Run the power-up sequence and blank the panel.
    pub fn init(&mut self) -> anyhow::Result<()> {
        self.command(INIT_SEQUENCE)?;
        self.buffer.fill(0);
        self.flush()?;
        log::info!("SSD1306 initialised ({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(())
    }

    /// Send the whole framebuffer to the panel.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.command(&[
            CMD_COLUMN_ADDR,
            0,
            (SCREEN_WIDTH - 1) as u8,
            CMD_PAGE_ADDR,
            0,
            (SCREEN_HEIGHT / 8 - 1) as u8,
        ])?;

        let mut bus = lock(self.bus)?;
        let mut packet = [0u8; DATA_CHUNK + 1];
        packet[0] = CONTROL_DATA;
        for chunk in self.buffer.chunks(DATA_CHUNK) {
            packet[1..=chunk.len()].copy_from_slice(chunk);
            bus.write(I2C_ADDR_OLED, &packet[..=chunk.len()], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }

    fn command(&self, commands: &[u8]) -> anyhow::Result<()> {
        let mut packet = Vec::with_capacity(commands.len() + 1);
        packet.push(CONTROL_COMMAND);
        packet.extend_from_slice(commands);

        let mut bus = lock(self.bus)?;
        bus.write(I2C_ADDR_OLED, &packet, I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}

impl StepScreen for OledDisplay {
    type Error = anyhow::Error;

    /// Redraw the step counter screen and push it to the panel.
    fn show_steps(&mut self, steps: StepCount) -> anyhow::Result<()> {
        if let Err(never) = draw_step_screen(self, steps) {
            match never {}
        }
        self.flush()
    }
}

impl OriginDimensions for OledDisplay {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for OledDisplay {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
                continue;
            }

            // One byte covers 8 vertical pixels of a page.
            let index = (x + (y / 8) * SCREEN_WIDTH) as usize;
            let mask = 1u8 << (y % 8);
            match color {
                BinaryColor::On => self.buffer[index] |= mask,
                BinaryColor::Off => self.buffer[index] &= !mask,
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buffer.fill(match color {
            BinaryColor::On => 0xFF,
            BinaryColor::Off => 0x00,
        });
        Ok(())
    }
}
