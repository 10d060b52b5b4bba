//! Canvas editor: owns the element list and drives layout, snapping and events

use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::events::{EditorEvent, EventSink, NullSink};
use crate::interaction::{EditKey, InteractionController, InteractionState, Outcome, PointerTarget, SnapEnv};
use crate::layout::{self, LayoutError, MeasuredHeights, ResolvedElement, ResolvedLayout};
use crate::types::{
    Element, ElementId, ElementKind, GrowDirection, LineKind, Point, PositionMode, PositionSpec,
    Rect, Size,
};
use crate::constants::snap;
use crate::viewport::{PixelRect, ViewportMapper};

/// Arrow-key nudge direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl NudgeDirection {
    fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    fn delta(self, step: f64) -> (f64, f64) {
        match self {
            Self::Left => (-step, 0.0),
            Self::Right => (step, 0.0),
            Self::Up => (0.0, -step),
            Self::Down => (0.0, step),
        }
    }
}

/// One theme canvas being edited.
///
/// Stored specs change only through explicit actions and committed gestures;
/// everything drawn comes from the resolved layout.
pub struct CanvasEditor<S: EventSink = NullSink> {
    elements: Vec<Element>,
    measured: MeasuredHeights,
    layout: ResolvedLayout,
    /// Editor-local preview text per line (never part of the theme)
    overrides: HashMap<ElementId, String>,
    controller: InteractionController,
    viewport: ViewportMapper,
    config: EditorConfig,
    selected: Option<ElementId>,
    next_id: u32,
    sink: S,
}

impl<S: EventSink> CanvasEditor<S> {
    pub fn new(elements: Vec<Element>, config: EditorConfig, sink: S) -> Self {
        for issue in layout::anchor_issues(&elements) {
            warn!(element = %issue.id, anchor = %issue.anchor, kind = ?issue.kind, "Flow anchor will be ignored");
        }
        let measured = MeasuredHeights::new();
        let layout = layout::resolve(&elements, &measured);
        let next_id = elements.iter().map(|e| e.id.0 + 1).max().unwrap_or(1);
        info!(elements = elements.len(), "Canvas editor ready");

        Self {
            elements,
            measured,
            layout,
            overrides: HashMap::new(),
            controller: InteractionController::new(config.throttle()),
            viewport: config.viewport(),
            config,
            selected: None,
            next_id,
            sink,
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn layout(&self) -> &ResolvedLayout {
        &self.layout
    }

    pub fn resolved(&self, id: ElementId) -> Option<&ResolvedElement> {
        self.layout.get(id)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportMapper {
        &self.viewport
    }

    pub fn interaction(&self) -> &InteractionState {
        self.controller.state()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<ElementId>) -> Result<(), LayoutError> {
        if let Some(id) = id {
            self.require(id)?;
        }
        self.selected = id;
        Ok(())
    }

    /// Render surface resized; only projection changes
    pub fn set_render_size(&mut self, render: Size) {
        debug!(width = render.width, height = render.height, "Render size changed");
        self.viewport.set_render_size(render);
    }

    // ---- element lifecycle ----

    pub fn add_text_line(&mut self, kind: LineKind, spec: PositionSpec) -> ElementId {
        let id = self.allocate_id();
        self.insert(Element::text_line(id, kind, spec))
    }

    pub fn add_box(&mut self, label: impl Into<String>, spec: PositionSpec) -> ElementId {
        let id = self.allocate_id();
        self.insert(Element::background_box(id, label, spec))
    }

    /// Show the line of `kind` if it is hidden, hide it if shown.
    ///
    /// Returns the new element id when the line became visible.
    pub fn toggle_line(&mut self, kind: LineKind) -> Option<ElementId> {
        let existing = self
            .elements
            .iter()
            .find(|e| e.line_kind() == Some(kind))
            .map(|e| e.id);
        match existing {
            Some(id) => {
                if let Err(e) = self.remove_element(id) {
                    warn!(error = %e, "Failed to hide line");
                }
                None
            }
            None => Some(self.add_text_line(kind, PositionSpec::default())),
        }
    }

    fn insert(&mut self, mut element: Element) -> ElementId {
        let rect = element.spec.rect();
        element.spec.apply_rect(rect, snap::MIN_SIZE);
        // anchors may only point backwards, and a new element is last
        if let Some(anchor) = element.spec.flow_anchor
            && self.element(anchor).is_none()
        {
            debug!(element = %element.id, anchor = %anchor, "Dropping unknown anchor on new element");
            element.spec.flow_anchor = None;
        }
        let id = element.id;
        info!(element = %id, line = ?element.line_kind(), "Element added");
        self.elements.push(element);
        self.sink.emit(EditorEvent::ElementAdded(id));
        self.relayout(vec![id]);
        id
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Delete an element; flow elements anchored to it become unanchored
    pub fn remove_element(&mut self, id: ElementId) -> Result<(), LayoutError> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(LayoutError::UnknownElement(id))?;

        if self.controller.active_element() == Some(id) {
            let editing = matches!(self.controller.state(), InteractionState::EditingText(_));
            let outcome = if editing {
                self.controller.key(EditKey::Escape)
            } else {
                self.controller.cancel()
            };
            self.handle_outcome(outcome);
        }

        self.elements.remove(index);
        self.measured.remove(&id);
        self.overrides.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }

        let mut detached = Vec::new();
        for element in &mut self.elements {
            if element.spec.flow_anchor == Some(id) {
                element.spec.flow_anchor = None;
                detached.push(element.id);
            }
        }
        info!(element = %id, detached = detached.len(), "Element removed");
        self.sink.emit(EditorEvent::ElementRemoved(id));

        let mut changed = detached.clone();
        for dependent in &detached {
            changed.extend(layout::dependents_of(&self.elements, *dependent));
        }
        changed.sort();
        changed.dedup();
        self.relayout(changed);
        Ok(())
    }

    // ---- positioning edits ----

    /// Anchor a flow element below (or beside) an earlier element
    pub fn set_flow_anchor(
        &mut self,
        id: ElementId,
        anchor: Option<ElementId>,
    ) -> Result<(), LayoutError> {
        if let Some(anchor) = anchor {
            layout::validate_anchor(&self.elements, id, anchor)?;
        }
        let spec = self.spec_mut(id)?;
        spec.flow_anchor = anchor;
        debug!(element = %id, anchor = ?anchor, "Flow anchor set");
        self.commit_spec_change(id);
        Ok(())
    }

    pub fn set_position_mode(&mut self, id: ElementId, mode: PositionMode) -> Result<(), LayoutError> {
        let spec = self.spec_mut(id)?;
        spec.position_mode = mode;
        debug!(element = %id, ?mode, "Position mode set");
        self.commit_spec_change(id);
        Ok(())
    }

    pub fn set_auto_height(
        &mut self,
        id: ElementId,
        auto_height: bool,
        grow_direction: GrowDirection,
    ) -> Result<(), LayoutError> {
        let spec = self.spec_mut(id)?;
        spec.auto_height = auto_height;
        spec.grow_direction = grow_direction;
        if !auto_height {
            self.measured.remove(&id);
        }
        debug!(element = %id, auto_height, ?grow_direction, "Auto height set");
        self.commit_spec_change(id);
        Ok(())
    }

    fn spec_mut(&mut self, id: ElementId) -> Result<&mut PositionSpec, LayoutError> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.spec)
            .ok_or(LayoutError::UnknownElement(id))
    }

    fn require(&self, id: ElementId) -> Result<&Element, LayoutError> {
        self.element(id).ok_or(LayoutError::UnknownElement(id))
    }

    /// Publish a changed stored spec and re-resolve everything depending on it
    fn commit_spec_change(&mut self, id: ElementId) {
        if let Some(element) = self.element(id) {
            self.sink.emit(EditorEvent::PositionChanged {
                id,
                spec: element.spec.clone(),
            });
        }
        self.relayout(self.affected_by(id));
    }

    fn affected_by(&self, id: ElementId) -> Vec<ElementId> {
        std::iter::once(id)
            .chain(layout::dependents_of(&self.elements, id))
            .collect()
    }

    fn relayout(&mut self, ids: Vec<ElementId>) {
        self.layout = layout::resolve(&self.elements, &self.measured);
        if !ids.is_empty() {
            self.sink.emit(EditorEvent::LayoutChanged { ids });
        }
    }

    // ---- measurement ----

    /// Content height reported by the renderer, in percent of the canvas.
    ///
    /// Returns true when the report changed the layout. Repeating a value is a no-op.
    pub fn on_height_measured(&mut self, id: ElementId, height: f64) -> bool {
        if !height.is_finite() || height < 0.0 {
            debug!(element = %id, height, "Ignoring invalid height report");
            return false;
        }
        match self.element(id) {
            Some(element) if element.spec.auto_height => {}
            Some(_) => {
                debug!(element = %id, "Ignoring height report for fixed-height element");
                return false;
            }
            None => {
                debug!(element = %id, "Ignoring height report for unknown element");
                return false;
            }
        }
        if self.measured.get(&id) == Some(&height) {
            return false;
        }

        self.measured.insert(id, height);
        let ids = self.affected_by(id);
        debug!(element = %id, height, affected = ids.len(), "Measured height changed");
        self.relayout(ids);
        true
    }

    /// Same as [`Self::on_height_measured`] with the height in render pixels
    pub fn on_height_measured_px(&mut self, id: ElementId, pixels: f64) -> bool {
        let height = self.viewport.height_to_percent(pixels);
        self.on_height_measured(id, height)
    }

    // ---- rendering helpers ----

    /// Where the element is drawn right now, in render pixels.
    ///
    /// During a drag or resize this is the live snapped preview.
    pub fn render_rect(&self, id: ElementId) -> Option<PixelRect> {
        let rect = self.live_rect(id)?;
        Some(self.viewport.project(rect))
    }

    fn live_rect(&self, id: ElementId) -> Option<Rect> {
        match self.controller.state() {
            InteractionState::Dragging(gesture) | InteractionState::Resizing { gesture, .. }
                if gesture.id == id =>
            {
                Some(gesture.preview)
            }
            _ => self.layout.get(id).map(ResolvedElement::visual_bounds),
        }
    }

    /// Font size in render pixels for a text line
    pub fn font_size_px(&self, id: ElementId) -> Option<f64> {
        match &self.element(id)?.kind {
            ElementKind::TextLine(line) => {
                Some(self.viewport.effective_font_size(line.style.font_size_percent))
            }
            ElementKind::BackgroundBox(_) => None,
        }
    }

    /// Text shown for a line: the preview override, else the sample text
    pub fn preview_text(&self, id: ElementId) -> Option<&str> {
        let kind = self.element(id)?.line_kind()?;
        Some(
            self.overrides
                .get(&id)
                .map(String::as_str)
                .unwrap_or_else(|| self.config.sample_text(kind)),
        )
    }

    // ---- pointer gestures ----

    pub fn pointer_down(
        &mut self,
        id: ElementId,
        target: PointerTarget,
        pointer: Point,
    ) -> Result<(), LayoutError> {
        let element = self
            .elements
            .iter()
            .find(|e| e.id == id)
            .ok_or(LayoutError::UnknownElement(id))?;
        let rect = self
            .layout
            .get(id)
            .map(ResolvedElement::visual_bounds)
            .unwrap_or_else(|| element.spec.rect());
        let outcomes = self.controller.pointer_down(element, rect, target, pointer);
        for outcome in outcomes {
            if matches!(outcome, Outcome::GestureStarted { .. }) {
                self.selected = Some(id);
            }
            self.handle_outcome(outcome);
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, pointer: Point, now: Instant) {
        let Some(id) = self.controller.active_element() else {
            return;
        };
        let others = self.layout.bounds_except(id);
        let env = SnapEnv {
            others: &others,
            viewport: &self.viewport,
            threshold: self.config.snap_threshold,
        };
        let outcome = self.controller.pointer_move(pointer, now, &env);
        self.handle_outcome(outcome);
    }

    pub fn pointer_up(&mut self, pointer: Point) {
        let Some(id) = self.controller.active_element() else {
            return;
        };
        let others = self.layout.bounds_except(id);
        let env = SnapEnv {
            others: &others,
            viewport: &self.viewport,
            threshold: self.config.snap_threshold,
        };
        let outcome = self.controller.pointer_up(pointer, &env);
        self.handle_outcome(outcome);
    }

    /// Pointer capture lost: abandon the gesture
    pub fn cancel_gesture(&mut self) {
        let outcome = self.controller.cancel();
        self.handle_outcome(outcome);
    }

    // ---- text editing ----

    /// Double-click / double-tap on a line
    pub fn double_activate(&mut self, id: ElementId) -> Result<(), LayoutError> {
        let default_text = self
            .require(id)?
            .line_kind()
            .map(|kind| self.config.sample_text(kind).to_string())
            .unwrap_or_default();
        let displayed = self.preview_text(id).unwrap_or_default().to_string();
        let Some(element) = self.elements.iter().find(|e| e.id == id) else {
            return Err(LayoutError::UnknownElement(id));
        };
        let outcomes = self.controller.begin_text_edit(element, &displayed, &default_text);
        for outcome in outcomes {
            self.handle_outcome(outcome);
        }
        Ok(())
    }

    pub fn update_text(&mut self, text: impl Into<String>) {
        let outcome = self.controller.update_text(text.into());
        self.handle_outcome(outcome);
    }

    pub fn key(&mut self, key: EditKey) {
        let outcome = self.controller.key(key);
        self.handle_outcome(outcome);
    }

    pub fn blur(&mut self) {
        let outcome = self.controller.blur();
        self.handle_outcome(outcome);
    }

    // ---- keyboard nudge ----

    /// Move the selected element by one nudge step.
    ///
    /// Returns true if the stored spec changed.
    pub fn nudge(&mut self, direction: NudgeDirection, large: bool) -> bool {
        if !self.controller.is_idle() {
            debug!(?direction, "Nudge ignored during interaction");
            return false;
        }
        let Some(id) = self.selected else {
            return false;
        };
        let step = self.config.nudge_distance(large);
        let Ok(spec) = self.spec_mut(id) else {
            return false;
        };
        if direction.is_vertical() && spec.is_flow() {
            debug!(element = %id, "Vertical nudge ignored for flow element");
            return false;
        }

        let (dx, dy) = direction.delta(step);
        let before = spec.rect();
        spec.apply_rect(before.translated(dx, dy), snap::MIN_SIZE);
        if spec.rect() == before {
            return false;
        }
        info!(element = %id, ?direction, x = spec.x, y = spec.y, "Element nudged");
        self.commit_spec_change(id);
        true
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Preview { guides, .. } => {
                self.sink.emit(EditorEvent::SnapGuidesChanged(guides));
            }
            Outcome::Committed { id, spec } => {
                self.sink.emit(EditorEvent::SnapGuidesChanged(Vec::new()));
                match self.spec_mut(id) {
                    Ok(stored) => {
                        // only geometry; mode and anchor edits made mid-gesture stand
                        stored.apply_rect(spec.rect(), snap::MIN_SIZE);
                        self.commit_spec_change(id);
                    }
                    Err(e) => warn!(error = %e, "Dropping commit for missing element"),
                }
            }
            Outcome::Clicked { .. } | Outcome::Cancelled { .. } => {
                self.sink.emit(EditorEvent::SnapGuidesChanged(Vec::new()));
            }
            Outcome::TextCommitted { id, preview } => {
                let previous = match &preview {
                    Some(text) => self.overrides.insert(id, text.clone()),
                    None => self.overrides.remove(&id),
                };
                if previous != preview {
                    self.sink.emit(EditorEvent::PreviewTextChanged { id, text: preview });
                }
            }
            Outcome::Ignored(reason) => {
                debug!(?reason, "Input ignored");
            }
            Outcome::GestureStarted { .. }
            | Outcome::Throttled
            | Outcome::TextEditStarted { .. }
            | Outcome::TextBufferChanged { .. }
            | Outcome::TextReverted { .. } => {}
        }
    }
}
