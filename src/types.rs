//! Core geometry and element types shared by the layout, snap and
//! interaction modules.
//!
//! All stored geometry is in percent of the canvas (0..=100). Pixel values
//! only appear at the edges (pointer input and render projection).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::canvas;

/// Stable identifier for a canvas element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pointer position or delta in render pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle in canvas percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Force the rectangle inside the canvas with both sizes in `[min_size, 100]`.
    /// Non-finite components collapse to the nearest valid value.
    pub fn clamp_to_canvas(&self, min_size: f64) -> Self {
        let width = finite_or(self.width, min_size).clamp(min_size, canvas::EXTENT);
        let height = finite_or(self.height, min_size).clamp(min_size, canvas::EXTENT);
        let x = finite_or(self.x, 0.0).clamp(0.0, canvas::EXTENT - width);
        let y = finite_or(self.y, 0.0).clamp(0.0, canvas::EXTENT - height);
        Self::new(x, y, width, height)
    }

    /// True when the whole rectangle lies within the canvas (with float slack)
    pub fn within_canvas(&self) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= canvas::EXTENT + EPS
            && self.bottom() <= canvas::EXTENT + EPS
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Resize grip the pointer grabbed; decides which edges move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    /// Handle changes the element height (top, bottom and all corners)
    pub fn affects_height(self) -> bool {
        self.moves_top() || self.moves_bottom()
    }

    /// Apply a pointer delta (percent) to `start`, keeping the opposite
    /// edges fixed and never shrinking below `min_size`.
    pub fn apply_delta(self, start: Rect, dx: f64, dy: f64, min_size: f64) -> Rect {
        let mut left = start.left();
        let mut right = start.right();
        let mut top = start.top();
        let mut bottom = start.bottom();

        if self.moves_left() {
            left = (left + dx).min(right - min_size);
        } else if self.moves_right() {
            right = (right + dx).max(left + min_size);
        }
        if self.moves_top() {
            top = (top + dy).min(bottom - min_size);
        } else if self.moves_bottom() {
            bottom = (bottom + dy).max(top + min_size);
        }

        self.clamp_to_canvas(Rect::new(left, top, right - left, bottom - top), min_size)
    }

    /// Pull the edges this handle moves back inside the canvas, leaving the
    /// opposite edges where they are.
    ///
    /// Only a rect whose fixed edges already lie outside the canvas is
    /// translated, by the final [`Rect::clamp_to_canvas`].
    pub fn clamp_to_canvas(self, rect: Rect, min_size: f64) -> Rect {
        let mut left = rect.left();
        let mut right = rect.right();
        let mut top = rect.top();
        let mut bottom = rect.bottom();

        if self.moves_left() {
            left = left.max(0.0).min(right - min_size);
        } else if self.moves_right() {
            right = right.min(canvas::EXTENT).max(left + min_size);
        }
        if self.moves_top() {
            top = top.max(0.0).min(bottom - min_size);
        } else if self.moves_bottom() {
            bottom = bottom.min(canvas::EXTENT).max(top + min_size);
        }

        Rect::new(left, top, right - left, bottom - top).clamp_to_canvas(min_size)
    }
}

/// Resolved geometry of another element, used for alignment checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementBounds {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBounds {
    pub fn new(id: ElementId, rect: Rect) -> Self {
        Self {
            id,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignH {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignV {
    Top,
    #[default]
    Center,
    Bottom,
}

/// How an element's vertical position is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    /// Stored `y` is authoritative
    #[default]
    Absolute,
    /// `y` is derived from the anchor element (or used as a baseline when unanchored)
    Flow,
}

/// Which edge stays put when an auto-height element grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowDirection {
    Up,
    #[default]
    Down,
}

/// Stored placement of an element, in percent of the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSpec {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub padding_top: f64,
    #[serde(default)]
    pub padding_bottom: f64,
    #[serde(default)]
    pub align_h: AlignH,
    #[serde(default)]
    pub align_v: AlignV,
    #[serde(default)]
    pub position_mode: PositionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_anchor: Option<ElementId>,
    #[serde(default)]
    pub flow_beside: bool,
    #[serde(default)]
    pub flow_gap: f64,
    #[serde(default)]
    pub auto_height: bool,
    #[serde(default)]
    pub grow_direction: GrowDirection,
}

impl Default for PositionSpec {
    fn default() -> Self {
        Self {
            x: 10.0,
            y: 10.0,
            width: 80.0,
            height: 10.0,
            padding_top: 0.0,
            padding_bottom: 0.0,
            align_h: AlignH::default(),
            align_v: AlignV::default(),
            position_mode: PositionMode::default(),
            flow_anchor: None,
            flow_beside: false,
            flow_gap: 0.0,
            auto_height: false,
            grow_direction: GrowDirection::default(),
        }
    }
}

impl PositionSpec {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_flow(&self) -> bool {
        self.position_mode == PositionMode::Flow
    }

    /// Height is derived (flow chain or measured content) rather than user-set
    pub fn height_locked(&self) -> bool {
        self.is_flow() || self.auto_height
    }

    /// Write a committed geometry back, clamped into the canvas
    pub fn apply_rect(&mut self, rect: Rect, min_size: f64) {
        let clamped = rect.clamp_to_canvas(min_size);
        self.x = clamped.x;
        self.y = clamped.y;
        self.width = clamped.width;
        self.height = clamped.height;
    }
}

/// Semantic role of a text line; each role has its own sample text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Title,
    Main,
    Secondary,
    Reference,
    Footer,
}

impl LineKind {
    pub const ALL: [LineKind; 5] = [
        LineKind::Title,
        LineKind::Main,
        LineKind::Secondary,
        LineKind::Reference,
        LineKind::Footer,
    ];

    /// Built-in sample text shown in the editor when no override is set
    pub fn default_sample_text(self) -> &'static str {
        match self {
            LineKind::Title => "Amazing Grace",
            LineKind::Main => "Amazing grace, how sweet the sound\nThat saved a wretch like me",
            LineKind::Secondary => "Sublime gracia del Señor",
            LineKind::Reference => "John 3:16",
            LineKind::Footer => "CCLI 22025",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Font size relative to the base size (100 = base)
    pub font_size_percent: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            font_size_percent: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub kind: LineKind,
    #[serde(default)]
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackgroundBox {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    TextLine(TextLine),
    BackgroundBox(BackgroundBox),
}

/// One placeable element on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub spec: PositionSpec,
}

impl Element {
    pub fn text_line(id: ElementId, kind: LineKind, spec: PositionSpec) -> Self {
        Self {
            id,
            kind: ElementKind::TextLine(TextLine {
                kind,
                style: LineStyle::default(),
            }),
            spec,
        }
    }

    pub fn background_box(id: ElementId, label: impl Into<String>, spec: PositionSpec) -> Self {
        Self {
            id,
            kind: ElementKind::BackgroundBox(BackgroundBox {
                label: label.into(),
            }),
            spec,
        }
    }

    pub fn line_kind(&self) -> Option<LineKind> {
        match &self.kind {
            ElementKind::TextLine(line) => Some(line.kind),
            ElementKind::BackgroundBox(_) => None,
        }
    }
}
