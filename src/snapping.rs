//! Snap-assist for dragging and resizing canvas elements
//!
//! Every function here is a pure function of its inputs so it can be called
//! once per frame during a gesture without accumulating error.
//!
//! Candidates are ranked by `distance + priority * PRIORITY_BIAS`; the lowest
//! score per axis wins and the two axes never influence each other.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::{canvas, snap};
use crate::constants::snap::priority;
use crate::types::{ElementBounds, ElementId, Rect, ResizeHandle};

const EPS: f64 = 1e-9;

/// Orientation of a guide line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// Vertical line at an X position
    Vertical,
    /// Horizontal line at a Y position
    Horizontal,
}

/// What a guide line snapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideLabel {
    Center,
    Edge,
    Align,
    Width,
    Height,
}

/// Transient alignment indicator shown while a gesture is in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapGuide {
    pub axis: GuideAxis,
    pub position: f64,
    pub label: GuideLabel,
}

impl SnapGuide {
    pub fn new(axis: GuideAxis, position: f64, label: GuideLabel) -> Self {
        Self { axis, position, label }
    }
}

/// Snapped geometry plus the guides that explain it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    pub rect: Rect,
    pub guides: Vec<SnapGuide>,
}

impl SnapResult {
    fn unsnapped(rect: Rect) -> Self {
        Self {
            rect: rect.clamp_to_canvas(snap::MIN_SIZE),
            guides: Vec::new(),
        }
    }
}

/// Everything a snap computation looks at besides the candidate itself
#[derive(Debug, Clone, Copy)]
pub struct SnapContext<'a> {
    /// Element being moved; never compared against itself
    pub moving: ElementId,
    /// Threshold in percent; 0 disables snapping
    pub threshold: f64,
    /// Resolved bounds of the other elements on the canvas
    pub others: &'a [ElementBounds],
}

impl<'a> SnapContext<'a> {
    pub fn new(moving: ElementId, threshold: f64, others: &'a [ElementBounds]) -> Self {
        Self {
            moving,
            threshold,
            others,
        }
    }

    fn threshold(&self) -> f64 {
        if self.threshold.is_finite() {
            self.threshold.max(0.0)
        } else {
            0.0
        }
    }

    /// Other elements worth aligning to (the moving one and zero-area ones are skipped)
    fn targets(&self) -> Vec<Rect> {
        self.others
            .iter()
            .filter(|b| b.id != self.moving)
            .map(ElementBounds::rect)
            .filter(Rect::has_area)
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct SnapCandidate {
    /// New position of the snapped edge (drag: new start position)
    value: f64,
    distance: f64,
    priority: u8,
    guide: SnapGuide,
}

impl SnapCandidate {
    fn score(&self) -> f64 {
        self.distance + f64::from(self.priority) * snap::PRIORITY_BIAS
    }
}

fn check_snap(best: &mut Option<SnapCandidate>, candidate: SnapCandidate, threshold: f64) {
    if candidate.distance > threshold {
        return;
    }
    // Keep this candidate if it scores better than the current best
    if best.as_ref().is_none_or(|b| candidate.score() < b.score()) {
        *best = Some(candidate);
    }
}

fn span_fits(start: f64, size: f64) -> bool {
    start >= -EPS && start + size <= canvas::EXTENT + EPS
}

/// One axis of a rectangle, so X and Y share the same candidate logic
#[derive(Debug, Clone, Copy)]
struct Span {
    start: f64,
    size: f64,
}

impl Span {
    fn horizontal(rect: &Rect) -> Self {
        Self { start: rect.x, size: rect.width }
    }

    fn vertical(rect: &Rect) -> Self {
        Self { start: rect.y, size: rect.height }
    }

    fn end(&self) -> f64 {
        self.start + self.size
    }

    fn center(&self) -> f64 {
        self.start + self.size / 2.0
    }
}

/// Best new start position for a span of fixed size
fn best_drag_snap(
    span: Span,
    targets: &[Span],
    threshold: f64,
    axis: GuideAxis,
) -> Option<SnapCandidate> {
    let mut best = None;
    let size = span.size;
    let candidate = |value: f64, distance: f64, priority: u8, guide_at: f64, label: GuideLabel| {
        SnapCandidate {
            value,
            distance,
            priority,
            guide: SnapGuide::new(axis, guide_at, label),
        }
    };

    // Canvas center
    let centered = canvas::CENTER - size / 2.0;
    if span_fits(centered, size) {
        check_snap(
            &mut best,
            candidate(
                centered,
                (span.center() - canvas::CENTER).abs(),
                priority::CANVAS_CENTER,
                canvas::CENTER,
                GuideLabel::Center,
            ),
            threshold,
        );
    }

    // Canvas edges
    check_snap(
        &mut best,
        candidate(0.0, span.start.abs(), priority::CANVAS_EDGE, 0.0, GuideLabel::Edge),
        threshold,
    );
    check_snap(
        &mut best,
        candidate(
            canvas::EXTENT - size,
            (span.end() - canvas::EXTENT).abs(),
            priority::CANVAS_EDGE,
            canvas::EXTENT,
            GuideLabel::Edge,
        ),
        threshold,
    );

    for other in targets {
        let pairs = [
            // start to start
            (other.start, (span.start - other.start).abs(), other.start),
            // end to end
            (other.end() - size, (span.end() - other.end()).abs(), other.end()),
            // start to end of other
            (other.end(), (span.start - other.end()).abs(), other.end()),
            // end to start of other
            (other.start - size, (span.end() - other.start).abs(), other.start),
            // center to center
            (other.center() - size / 2.0, (span.center() - other.center()).abs(), other.center()),
        ];
        for (value, distance, guide_at) in pairs {
            if span_fits(value, size) {
                check_snap(
                    &mut best,
                    candidate(value, distance, priority::ELEMENT_ALIGN, guide_at, GuideLabel::Align),
                    threshold,
                );
            }
        }
    }

    best
}

/// Snap a drag candidate (position changes, size fixed).
///
/// `y_locked` disables vertical snapping for elements whose Y is computed.
pub fn snap_drag(candidate: Rect, ctx: &SnapContext<'_>, y_locked: bool) -> SnapResult {
    let threshold = ctx.threshold();
    if !candidate.has_area() || threshold == 0.0 {
        return SnapResult::unsnapped(candidate);
    }

    let targets = ctx.targets();
    let x_targets: Vec<Span> = targets.iter().map(Span::horizontal).collect();
    let best_x = best_drag_snap(
        Span::horizontal(&candidate),
        &x_targets,
        threshold,
        GuideAxis::Vertical,
    );
    let best_y = if y_locked {
        None
    } else {
        let y_targets: Vec<Span> = targets.iter().map(Span::vertical).collect();
        best_drag_snap(
            Span::vertical(&candidate),
            &y_targets,
            threshold,
            GuideAxis::Horizontal,
        )
    };

    let mut rect = candidate;
    let mut guides = Vec::with_capacity(2);
    if let Some(best) = best_x {
        rect.x = best.value;
        guides.push(best.guide);
    }
    if let Some(best) = best_y {
        rect.y = best.value;
        guides.push(best.guide);
    }
    trace!(moving = %ctx.moving, x = rect.x, y = rect.y, guides = guides.len(), "drag snap");

    SnapResult {
        rect: rect.clamp_to_canvas(snap::MIN_SIZE),
        guides,
    }
}

/// Which end of a span the resize handle moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MovingEdge {
    Start,
    End,
}

/// Best new position for the moving edge of a span.
///
/// `size_label` names the dimension this axis controls (width or height).
fn best_resize_snap(
    span: Span,
    edge: MovingEdge,
    targets: &[Span],
    threshold: f64,
    axis: GuideAxis,
    size_label: GuideLabel,
) -> Option<SnapCandidate> {
    let mut best = None;
    let (fixed, moving) = match edge {
        MovingEdge::Start => (span.end(), span.start),
        MovingEdge::End => (span.start, span.end()),
    };
    // Span produced by putting the moving edge at `value`, if it is allowed
    let valid = |value: f64| {
        let (start, end) = match edge {
            MovingEdge::Start => (value, fixed),
            MovingEdge::End => (fixed, value),
        };
        end - start >= snap::MIN_SIZE - EPS && span_fits(start, end - start)
    };
    let mut offer = |value: f64, distance: f64, priority: u8, guide_at: f64, label: GuideLabel| {
        if valid(value) {
            let candidate = SnapCandidate {
                value,
                distance,
                priority,
                guide: SnapGuide::new(axis, guide_at, label),
            };
            check_snap(&mut best, candidate, threshold);
        }
    };

    // Center: mirror the fixed edge around the canvas center
    let mirrored = canvas::EXTENT - fixed;
    offer(
        mirrored,
        (span.center() - canvas::CENTER).abs(),
        priority::CANVAS_CENTER,
        canvas::CENTER,
        GuideLabel::Center,
    );

    // Canvas edge on the side that is moving
    let canvas_edge = match edge {
        MovingEdge::Start => 0.0,
        MovingEdge::End => canvas::EXTENT,
    };
    offer(
        canvas_edge,
        (moving - canvas_edge).abs(),
        priority::CANVAS_EDGE,
        canvas_edge,
        GuideLabel::Edge,
    );

    for other in targets {
        // Match the other element's size
        let matched = match edge {
            MovingEdge::Start => fixed - other.size,
            MovingEdge::End => fixed + other.size,
        };
        offer(
            matched,
            (span.size - other.size).abs(),
            priority::DIMENSION_MATCH,
            matched,
            size_label,
        );

        // Align the moving edge with either edge of the other element
        for target in [other.start, other.end()] {
            offer(
                target,
                (moving - target).abs(),
                priority::RESIZE_EDGE_ALIGN,
                target,
                GuideLabel::Align,
            );
        }
    }

    best
}

fn apply_resize_snap(span: Span, edge: MovingEdge, value: f64) -> Span {
    match edge {
        MovingEdge::Start => Span {
            start: value,
            size: span.end() - value,
        },
        MovingEdge::End => Span {
            start: span.start,
            size: value - span.start,
        },
    }
}

/// Snap a resize candidate.
///
/// Only the edges moved by `handle` are evaluated. `height_locked`
/// suppresses vertical snapping for flow and auto-height elements.
pub fn snap_resize(
    candidate: Rect,
    handle: ResizeHandle,
    ctx: &SnapContext<'_>,
    height_locked: bool,
) -> SnapResult {
    let threshold = ctx.threshold();
    if !candidate.has_area() || threshold == 0.0 {
        return SnapResult {
            rect: handle.clamp_to_canvas(candidate, snap::MIN_SIZE),
            guides: Vec::new(),
        };
    }

    let targets = ctx.targets();
    let mut rect = candidate;
    let mut guides = Vec::with_capacity(2);

    let horizontal_edge = if handle.moves_left() {
        Some(MovingEdge::Start)
    } else if handle.moves_right() {
        Some(MovingEdge::End)
    } else {
        None
    };
    if let Some(edge) = horizontal_edge {
        let x_targets: Vec<Span> = targets.iter().map(Span::horizontal).collect();
        let span = Span::horizontal(&candidate);
        if let Some(best) = best_resize_snap(
            span,
            edge,
            &x_targets,
            threshold,
            GuideAxis::Vertical,
            GuideLabel::Width,
        ) {
            let snapped = apply_resize_snap(span, edge, best.value);
            rect.x = snapped.start;
            rect.width = snapped.size;
            guides.push(best.guide);
        }
    }

    let vertical_edge = if height_locked {
        None
    } else if handle.moves_top() {
        Some(MovingEdge::Start)
    } else if handle.moves_bottom() {
        Some(MovingEdge::End)
    } else {
        None
    };
    if let Some(edge) = vertical_edge {
        let y_targets: Vec<Span> = targets.iter().map(Span::vertical).collect();
        let span = Span::vertical(&candidate);
        if let Some(best) = best_resize_snap(
            span,
            edge,
            &y_targets,
            threshold,
            GuideAxis::Horizontal,
            GuideLabel::Height,
        ) {
            let snapped = apply_resize_snap(span, edge, best.value);
            rect.y = snapped.start;
            rect.height = snapped.size;
            guides.push(best.guide);
        }
    }
    trace!(moving = %ctx.moving, ?handle, width = rect.width, height = rect.height, guides = guides.len(), "resize snap");

    SnapResult {
        rect: handle.clamp_to_canvas(rect, snap::MIN_SIZE),
        guides,
    }
}
