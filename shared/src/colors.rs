
use serde::{Deserialize, Serialize};

use crate::theme::ThemeMode;

/// Straight (non-premultiplied) RGBA color. Alpha is 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(...)` string understood by the render surface.
    pub fn css(&self) -> String {
        rgba_css(self.r, self.g, self.b, self.a)
    }
}

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r}, {g}, {b}, {a})")
}

/// Theme-dependent colors used by the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub cap_default: Rgba,
    pub cap_hovered: Rgba,
    pub side: Rgba,
    pub stroke: Rgba,
    pub overlay_line: Rgba,
    /// Hex color for the atmosphere glow.
    pub atmosphere: &'static str,
}

const LIGHT: Palette = Palette {
    cap_default: Rgba::new(150, 150, 200, 0.3),
    cap_hovered: Rgba::new(0, 0, 100, 0.6),
    side: Rgba::new(0, 0, 0, 0.1),
    stroke: Rgba::new(80, 80, 100, 0.7),
    overlay_line: Rgba::new(220, 38, 38, 0.9),
    atmosphere: "#93C5FD",
};

const DARK: Palette = Palette {
    cap_default: Rgba::new(100, 100, 180, 0.3),
    cap_hovered: Rgba::new(220, 220, 255, 0.7),
    side: Rgba::new(150, 150, 200, 0.05),
    stroke: Rgba::new(180, 180, 220, 0.6),
    overlay_line: Rgba::new(250, 170, 20, 0.9),
    atmosphere: "#3B82F6",
};

pub const fn palette(theme: ThemeMode) -> &'static Palette {
    match theme {
        ThemeMode::Light => &LIGHT,
        ThemeMode::Dark => &DARK,
    }
}
