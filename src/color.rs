use image::Rgba;

use crate::error::{Error, Result};

pub const WHITE: Color = Color::Rgb([255, 255, 255]);
pub const BLACK: Color = Color::Rgb([0, 0, 0]);
pub const MY_YELLOW: Color = Color::Rgb([0xfd, 0xf5, 0x3a]);
pub const MY_RED: Color = Color::Rgb([0xfa, 0x1b, 0x09]);
pub const MY_CYAN: Color = Color::Rgb([0x39, 0x95, 0xba]);
pub const MY_BLUE: Color = Color::Rgb([0x16, 0x34, 0x8e]);

/// An RGB or RGBA color. Channel count is preserved by every adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Rgb([u8; 3]),
    Rgba([u8; 4]),
}

/// Per-channel adjustment step. Alpha is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Step {
    pub const fn uniform(step: u8) -> Self {
        Step { r: step, g: step, b: step }
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::uniform(10)
    }
}

impl Color {
    pub fn from_channels(channels: &[u8]) -> Result<Self> {
        match *channels {
            [r, g, b] => Ok(Color::Rgb([r, g, b])),
            [r, g, b, a] => Ok(Color::Rgba([r, g, b, a])),
            _ => Err(Error::Validation(format!(
                "color must have 3 or 4 channels, got {}",
                channels.len()
            ))),
        }
    }

    pub fn channels(&self) -> &[u8] {
        match self {
            Color::Rgb(c) => c,
            Color::Rgba(c) => c,
        }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        match self {
            Color::Rgb([r, g, b]) => Rgba([r, g, b, 255]),
            Color::Rgba(c) => Rgba(c),
        }
    }

    pub fn decrease(self, step: Step) -> Self {
        self.map_rgb(|c, s| c.saturating_sub(s), step)
    }

    pub fn increase(self, step: Step) -> Self {
        self.map_rgb(|c, s| c.saturating_add(s), step)
    }

    fn map_rgb(self, f: impl Fn(u8, u8) -> u8, step: Step) -> Self {
        let apply = |[r, g, b]: [u8; 3]| [f(r, step.r), f(g, step.g), f(b, step.b)];
        match self {
            Color::Rgb(rgb) => Color::Rgb(apply(rgb)),
            Color::Rgba([r, g, b, a]) => {
                let [r, g, b] = apply([r, g, b]);
                Color::Rgba([r, g, b, a])
            }
        }
    }
}

/// Darken each RGB channel by `step`, floored at 0.
pub fn decrease_color(channels: &[u8], step: Step) -> Result<Color> {
    Ok(Color::from_channels(channels)?.decrease(step))
}

/// Brighten each RGB channel by `step`, capped at 255.
pub fn increase_color(channels: &[u8], step: Step) -> Result<Color> {
    Ok(Color::from_channels(channels)?.increase(step))
}
