//! Step counter screen: three fixed text lines, redrawn wholesale.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_5X8, FONT_6X10},
        MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Alignment, Text},
};

use crate::step::StepCount;

/// Daily step goal the remaining count is measured against.
pub const DAILY_GOAL: u32 = 10_000;

/// At or below this many remaining steps the screen switches to the
/// "almost there" message.
pub const ALMOST_THERE_REMAINING: i64 = 2_000;

pub const LABEL: &str = "Step Count:";

const LABEL_BASELINE_Y: i32 = 12;
const COUNT_BASELINE_Y: i32 = 38;
const MESSAGE_BASELINE_Y: i32 = 58;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encouragement {
    AlmostThere,
    KeepItUp,
    YouCanDoIt,
}

impl Encouragement {
    pub fn text(self) -> &'static str {
        match self {
            Self::AlmostThere => "Almost there!",
            Self::KeepItUp => "Keep it up!",
            Self::YouCanDoIt => "You can do it!",
        }
    }
}

/// Steps left until [`DAILY_GOAL`]. Negative once the goal is passed.
pub fn remaining_steps(steps: StepCount) -> i64 {
    i64::from(DAILY_GOAL) - i64::from(steps.get())
}

/// Pick the message line wording. The "almost there" rule wins over the
/// divisible-by-three rule.
pub fn select_encouragement(steps: StepCount) -> Encouragement {
    if remaining_steps(steps) <= ALMOST_THERE_REMAINING {
        Encouragement::AlmostThere
    } else if steps.get() % 3 == 0 {
        Encouragement::KeepItUp
    } else {
        Encouragement::YouCanDoIt
    }
}

/// Text content of the three screen lines for a given count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenText {
    pub label: &'static str,
    pub count: heapless::String<10>,
    pub message: heapless::String<32>,
}

impl ScreenText {
    pub fn for_steps(steps: StepCount) -> Self {
        let encouragement = select_encouragement(steps);
        let remaining = remaining_steps(steps).max(0);

        // u32::MAX is 10 digits; "10000 left, You can do it!" is 26 bytes.
        let mut count = heapless::String::new();
        let _ = write!(count, "{}", steps);
        let mut message = heapless::String::new();
        let _ = write!(message, "{} left, {}", remaining, encouragement.text());

        Self {
            label: LABEL,
            count,
            message,
        }
    }
}

/// Clear `display` and draw the label, count and message lines centred
/// horizontally.
pub fn draw_step_screen<D>(display: &mut D, steps: StepCount) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    let text = ScreenText::for_steps(steps);
    let centre_x = display.size().width as i32 / 2;

    display.clear(BinaryColor::Off)?;

    Text::with_alignment(
        text.label,
        Point::new(centre_x, LABEL_BASELINE_Y),
        MonoTextStyle::new(&FONT_6X10, BinaryColor::On),
        Alignment::Center,
    )
    .draw(display)?;

    Text::with_alignment(
        &text.count,
        Point::new(centre_x, COUNT_BASELINE_Y),
        MonoTextStyle::new(&FONT_10X20, BinaryColor::On),
        Alignment::Center,
    )
    .draw(display)?;

    Text::with_alignment(
        &text.message,
        Point::new(centre_x, MESSAGE_BASELINE_Y),
        MonoTextStyle::new(&FONT_5X8, BinaryColor::On),
        Alignment::Center,
    )
    .draw(display)?;

    Ok(())
}
