//! Percent <-> pixel conversion for the render surface

use serde::{Deserialize, Serialize};

use crate::constants::{canvas, font};
use crate::types::{Point, Rect, Size};

/// Convert a percentage of `dimension` to pixels
pub fn to_pixels(percent: f64, dimension: f64) -> f64 {
    percent * dimension / canvas::EXTENT
}

/// Convert pixels to a percentage of `dimension`
///
/// A non-positive dimension is a caller bug; it maps to 0 instead of
/// producing an infinity.
pub fn to_percent(pixels: f64, dimension: f64) -> f64 {
    if dimension <= 0.0 {
        return 0.0;
    }
    pixels * canvas::EXTENT / dimension
}

/// Rectangle in render pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps the authored canvas onto the current render surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportMapper {
    /// Resolution the layout is authored against
    pub reference: Size,
    /// Current size of the render surface (device pixels)
    pub render: Size,
}

impl ViewportMapper {
    pub fn new(reference: Size, render: Size) -> Self {
        Self { reference, render }
    }

    /// Mapper whose render surface equals the reference resolution
    pub fn at_reference(reference: Size) -> Self {
        Self::new(reference, reference)
    }

    pub fn set_render_size(&mut self, render: Size) {
        self.render = render;
    }

    /// Font size in render pixels for a style size given in percent of base.
    ///
    /// The base size is 5% of the reference height, scaled by how wide the
    /// render surface is relative to the reference width.
    pub fn effective_font_size(&self, font_size_percent: f64) -> f64 {
        if self.reference.width <= 0.0 {
            return 0.0;
        }
        let base = self.reference.height * font::BASE_HEIGHT_FRACTION;
        base * (font_size_percent / 100.0) * (self.render.width / self.reference.width)
    }

    pub fn project(&self, rect: Rect) -> PixelRect {
        PixelRect {
            x: to_pixels(rect.x, self.render.width),
            y: to_pixels(rect.y, self.render.height),
            width: to_pixels(rect.width, self.render.width),
            height: to_pixels(rect.height, self.render.height),
        }
    }

    /// Pointer delta in render pixels to a delta in canvas percent
    pub fn pointer_delta_to_percent(&self, from: Point, to: Point) -> (f64, f64) {
        (
            to_percent(to.x - from.x, self.render.width),
            to_percent(to.y - from.y, self.render.height),
        )
    }

    /// Measured content height in render pixels to canvas percent
    pub fn height_to_percent(&self, pixels: f64) -> f64 {
        to_percent(pixels, self.render.height)
    }
}

impl Default for ViewportMapper {
    fn default() -> Self {
        Self::at_reference(Size::new(canvas::REFERENCE_WIDTH, canvas::REFERENCE_HEIGHT))
    }
}
