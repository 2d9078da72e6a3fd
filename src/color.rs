use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Rgb – backend-neutral series colour
// ---------------------------------------------------------------------------

/// An sRGB colour shared by the egui plots and the SVG charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

// ---------------------------------------------------------------------------
// Dashboard palette
// ---------------------------------------------------------------------------

pub const PRIMARY: Rgb = Rgb::new(0x2E, 0x86, 0xAB);
pub const SECONDARY: Rgb = Rgb::new(0xE6, 0x39, 0x46);
pub const ACCENT: Rgb = Rgb::new(0xF1, 0xC4, 0x0F);
pub const NEUTRAL: Rgb = Rgb::new(0xA8, 0xDA, 0xDC);
pub const DARK: Rgb = Rgb::new(0x1D, 0x35, 0x57);

/// Fixed palette, in the order series pick from it.
pub const PALETTE: [Rgb; 5] = [PRIMARY, SECONDARY, ACCENT, NEUTRAL, DARK];

/// Palette colour for the `i`-th series, cycling.
pub fn palette_color(i: usize) -> Rgb {
    PALETTE[i % PALETTE.len()]
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgb::new(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}
