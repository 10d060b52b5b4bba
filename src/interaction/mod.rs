//! Gesture state machine for the canvas
//!
//! ```text
//! Idle -> Dragging | Resizing -> Idle      (pointer down / move / up)
//! Idle -> EditingText -> Idle              (double-activate / Enter / Escape / blur)
//! ```
//!
//! Only one element is ever in a non-idle state. The controller never
//! touches stored specs: it returns [`Outcome`]s and the owner applies the
//! `Committed` ones.

mod text_edit;

pub use text_edit::{EditKey, TextEditSession};

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::constants::snap;
use crate::snapping::{self, SnapContext, SnapGuide, SnapResult};
use crate::throttle::FrameThrottle;
use crate::types::{Element, ElementBounds, ElementId, Point, PositionSpec, Rect, ResizeHandle};
use crate::viewport::ViewportMapper;

/// What the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    Body,
    Handle(ResizeHandle),
}

/// Snapshot taken when a drag or resize starts
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub id: ElementId,
    /// Spec at gesture start; the commit is derived from it
    pub start_spec: PositionSpec,
    /// Drawn geometry at gesture start
    pub start_rect: Rect,
    pub origin: Point,
    pub latest: Point,
    /// Snapped geometry currently shown as live feedback
    pub preview: Rect,
    /// Y is computed (flow), so it never moves
    pub y_locked: bool,
    /// Height is computed (flow or auto-height)
    pub height_locked: bool,
    moved: bool,
}

impl Gesture {
    fn new(element: &Element, start_rect: Rect, origin: Point) -> Self {
        Self {
            id: element.id,
            start_spec: element.spec.clone(),
            start_rect,
            origin,
            latest: origin,
            preview: start_rect,
            y_locked: element.spec.is_flow(),
            height_locked: element.spec.height_locked(),
            moved: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(Gesture),
    Resizing {
        gesture: Gesture,
        handle: ResizeHandle,
    },
    EditingText(TextEditSession),
}

impl InteractionState {
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging(gesture) | Self::Resizing { gesture, .. } => Some(gesture.id),
            Self::EditingText(session) => Some(session.id),
        }
    }
}

/// Why an input was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NoActiveGesture,
    GestureInProgress,
    /// Vertical handle on a flow or auto-height element
    HandleDisabled,
    EditingSameElement,
    NotATextLine,
    NotEditing,
}

/// Result of feeding one input to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    GestureStarted { id: ElementId },
    /// Live feedback: render `rect`, draw `guides`, commit nothing
    Preview {
        id: ElementId,
        rect: Rect,
        guides: Vec<SnapGuide>,
    },
    /// Move arrived inside the frame interval; the pointer was recorded
    Throttled,
    /// Gesture finished; the owner writes `spec`'s geometry back
    Committed { id: ElementId, spec: PositionSpec },
    /// Pointer released without moving
    Clicked { id: ElementId },
    Cancelled { id: ElementId },
    TextEditStarted { id: ElementId },
    TextBufferChanged { id: ElementId },
    /// Preview override to store; `None` clears it
    TextCommitted {
        id: ElementId,
        preview: Option<String>,
    },
    TextReverted { id: ElementId },
}

/// Inputs shared by every snap evaluation within a gesture
#[derive(Debug, Clone, Copy)]
pub struct SnapEnv<'a> {
    /// Resolved bounds of the other elements
    pub others: &'a [ElementBounds],
    pub viewport: &'a ViewportMapper,
    pub threshold: f64,
}

/// Per-canvas interaction state machine
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    throttle: FrameThrottle,
}

impl InteractionController {
    pub fn new(throttle: FrameThrottle) -> Self {
        Self {
            state: InteractionState::Idle,
            throttle,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.state.element()
    }

    /// Start a drag (body) or resize (handle) on `element`.
    ///
    /// `rect` is the geometry currently drawn for the element. A pending text edit on a
    /// different element is committed first.
    pub fn pointer_down(
        &mut self,
        element: &Element,
        rect: Rect,
        target: PointerTarget,
        pointer: Point,
    ) -> Vec<Outcome> {
        let mut outcomes = match self.settle_for(element.id) {
            Ok(outcomes) => outcomes,
            Err(reason) => return vec![Outcome::Ignored(reason)],
        };

        let gesture = Gesture::new(element, rect, pointer);
        match target {
            PointerTarget::Body => {
                debug!(element = %element.id, y_locked = gesture.y_locked, "Drag started");
                self.state = InteractionState::Dragging(gesture);
            }
            PointerTarget::Handle(handle) => {
                if handle.affects_height() && gesture.height_locked {
                    debug!(element = %element.id, ?handle, "Vertical resize disabled for computed height");
                    outcomes.push(Outcome::Ignored(IgnoreReason::HandleDisabled));
                    return outcomes;
                }
                debug!(element = %element.id, ?handle, "Resize started");
                self.state = InteractionState::Resizing { gesture, handle };
            }
        }
        self.throttle.reset();
        outcomes.push(Outcome::GestureStarted { id: element.id });
        outcomes
    }

    /// Track the pointer; evaluates snapping at most once per frame interval
    pub fn pointer_move(&mut self, pointer: Point, now: Instant, env: &SnapEnv<'_>) -> Outcome {
        let (gesture, handle) = match &mut self.state {
            InteractionState::Dragging(gesture) => (gesture, None),
            InteractionState::Resizing { gesture, handle } => (gesture, Some(*handle)),
            InteractionState::Idle | InteractionState::EditingText(_) => {
                return Outcome::Ignored(IgnoreReason::NoActiveGesture);
            }
        };
        gesture.latest = pointer;
        gesture.moved = true;
        if !self.throttle.ready(now) {
            return Outcome::Throttled;
        }

        let result = evaluate(gesture, handle, pointer, env);
        gesture.preview = result.rect;
        Outcome::Preview {
            id: gesture.id,
            rect: result.rect,
            guides: result.guides,
        }
    }

    /// Finish the gesture: one final snap with the release position, then commit
    pub fn pointer_up(&mut self, pointer: Point, env: &SnapEnv<'_>) -> Outcome {
        let (gesture, handle) = match std::mem::take(&mut self.state) {
            InteractionState::Dragging(gesture) => (gesture, None),
            InteractionState::Resizing { gesture, handle } => (gesture, Some(handle)),
            other => {
                self.state = other;
                return Outcome::Ignored(IgnoreReason::NoActiveGesture);
            }
        };
        self.throttle.reset();
        let id = gesture.id;
        if !gesture.moved && gesture.origin == pointer {
            debug!(element = %id, "Released without moving");
            return Outcome::Clicked { id };
        }

        let rect = evaluate(&gesture, handle, pointer, env).rect;
        let spec = match handle {
            None => commit_drag(&gesture, rect),
            Some(handle) => commit_resize(&gesture, handle, rect),
        };
        info!(element = %id, x = spec.x, y = spec.y, width = spec.width, height = spec.height, "Gesture committed");
        Outcome::Committed { id, spec }
    }

    /// Abort the gesture without committing (pointer capture lost)
    pub fn cancel(&mut self) -> Outcome {
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging(gesture) | InteractionState::Resizing { gesture, .. } => {
                debug!(element = %gesture.id, "Gesture cancelled");
                self.throttle.reset();
                Outcome::Cancelled { id: gesture.id }
            }
            other => {
                self.state = other;
                Outcome::Ignored(IgnoreReason::NoActiveGesture)
            }
        }
    }

    /// Make room for a new interaction on `id`, committing an edit on another element
    fn settle_for(&mut self, id: ElementId) -> Result<Vec<Outcome>, IgnoreReason> {
        let editing_other = match &self.state {
            InteractionState::Idle => false,
            InteractionState::Dragging(_) | InteractionState::Resizing { .. } => {
                return Err(IgnoreReason::GestureInProgress);
            }
            InteractionState::EditingText(session) if session.id == id => {
                return Err(IgnoreReason::EditingSameElement);
            }
            InteractionState::EditingText(_) => true,
        };
        Ok(if editing_other { vec![self.commit_text()] } else { Vec::new() })
    }

    /// Enter the text-edit sub-state for a text line
    pub fn begin_text_edit(
        &mut self,
        element: &Element,
        displayed: &str,
        default_text: &str,
    ) -> Vec<Outcome> {
        if element.line_kind().is_none() {
            return vec![Outcome::Ignored(IgnoreReason::NotATextLine)];
        }
        let mut outcomes = match self.settle_for(element.id) {
            Ok(outcomes) => outcomes,
            Err(reason) => return vec![Outcome::Ignored(reason)],
        };
        self.state = InteractionState::EditingText(TextEditSession::new(
            element.id,
            displayed,
            default_text,
        ));
        debug!(element = %element.id, "Text edit started");
        outcomes.push(Outcome::TextEditStarted { id: element.id });
        outcomes
    }

    /// Replace the edit buffer with what the text field now holds
    pub fn update_text(&mut self, text: String) -> Outcome {
        match &mut self.state {
            InteractionState::EditingText(session) => {
                session.set_buffer(text);
                Outcome::TextBufferChanged { id: session.id }
            }
            _ => Outcome::Ignored(IgnoreReason::NotEditing),
        }
    }

    pub fn key(&mut self, key: EditKey) -> Outcome {
        let InteractionState::EditingText(session) = &mut self.state else {
            return Outcome::Ignored(IgnoreReason::NotEditing);
        };
        match key {
            EditKey::Enter { line_break: true } => {
                session.insert_line_break();
                Outcome::TextBufferChanged { id: session.id }
            }
            EditKey::Enter { line_break: false } => self.commit_text(),
            EditKey::Escape => {
                let id = session.id;
                self.state = InteractionState::Idle;
                debug!(element = %id, "Text edit reverted");
                Outcome::TextReverted { id }
            }
        }
    }

    /// Focus left the text field: commit like Enter
    pub fn blur(&mut self) -> Outcome {
        if matches!(self.state, InteractionState::EditingText(_)) {
            self.commit_text()
        } else {
            Outcome::Ignored(IgnoreReason::NotEditing)
        }
    }

    fn commit_text(&mut self) -> Outcome {
        match std::mem::take(&mut self.state) {
            InteractionState::EditingText(session) => {
                let id = session.id;
                let preview = session.into_override();
                debug!(element = %id, has_override = preview.is_some(), "Text edit committed");
                Outcome::TextCommitted { id, preview }
            }
            other => {
                self.state = other;
                Outcome::Ignored(IgnoreReason::NotEditing)
            }
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(FrameThrottle::from_millis(crate::constants::timing::FRAME_INTERVAL_MS))
    }
}

/// Snap the geometry the gesture would have with the pointer at `pointer`
fn evaluate(
    gesture: &Gesture,
    handle: Option<ResizeHandle>,
    pointer: Point,
    env: &SnapEnv<'_>,
) -> SnapResult {
    let (dx, dy) = env.viewport.pointer_delta_to_percent(gesture.origin, pointer);
    let ctx = SnapContext::new(gesture.id, env.threshold, env.others);

    match handle {
        None => {
            // no vertical pointer movement leaves Y alone, snapping included
            let lock_y = gesture.y_locked || dy == 0.0;
            let dy = if lock_y { 0.0 } else { dy };
            let candidate = gesture.start_rect.translated(dx, dy);
            let mut result = snapping::snap_drag(candidate, &ctx, lock_y);
            if lock_y {
                result.rect.y = gesture.start_rect.y;
            }
            result
        }
        Some(handle) => {
            let candidate = handle.apply_delta(gesture.start_rect, dx, dy, snap::MIN_SIZE);
            snapping::snap_resize(candidate, handle, &ctx, gesture.height_locked)
        }
    }
}

/// Stored geometry after a drag. The drawn rect may sit above the stored one
/// (grow-up auto-height), so Y moves by the same offset the drawn rect did.
fn commit_drag(gesture: &Gesture, rect: Rect) -> PositionSpec {
    let mut spec = gesture.start_spec.clone();
    spec.x = rect.x;
    if rect.y != gesture.start_rect.y {
        spec.y = gesture.start_spec.y + (rect.y - gesture.start_rect.y);
    }
    let rect = spec.rect();
    spec.apply_rect(rect, snap::MIN_SIZE);
    spec
}

fn commit_resize(gesture: &Gesture, handle: ResizeHandle, rect: Rect) -> PositionSpec {
    let mut spec = gesture.start_spec.clone();
    spec.x = rect.x;
    spec.width = rect.width;
    if handle.affects_height() && !gesture.height_locked {
        spec.y = rect.y;
        spec.height = rect.height;
    }
    let rect = handle.clamp_to_canvas(spec.rect(), snap::MIN_SIZE);
    spec.apply_rect(rect, snap::MIN_SIZE);
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GrowDirection, LineKind, PositionMode, Size};
    use std::time::Duration;

    fn viewport() -> ViewportMapper {
        // 1 pixel == 1 percent keeps the arithmetic readable
        ViewportMapper::new(Size::new(1920.0, 1080.0), Size::new(100.0, 100.0))
    }

    fn line(id: u32, spec: PositionSpec) -> Element {
        Element::text_line(ElementId(id), LineKind::Main, spec)
    }

    fn env<'a>(others: &'a [ElementBounds], viewport: &'a ViewportMapper) -> SnapEnv<'a> {
        SnapEnv {
            others,
            viewport,
            threshold: 1.0,
        }
    }

    fn unthrottled() -> InteractionController {
        InteractionController::new(FrameThrottle::from_millis(0))
    }

    #[test]
    fn test_drag_commits_once_with_snapped_position() {
        let vp = viewport();
        let element = line(1, PositionSpec::new(10.0, 10.0, 20.0, 10.0));
        let mut controller = unthrottled();
        let started = controller.pointer_down(&element, element.spec.rect(), PointerTarget::Body, Point::new(0.0, 0.0));
        assert_eq!(started, vec![Outcome::GestureStarted { id: ElementId(1) }]);

        let env = env(&[], &vp);
        let outcome = controller.pointer_move(Point::new(29.6, 0.0), Instant::now(), &env);
        match outcome {
            Outcome::Preview { rect, guides, .. } => {
                assert!((rect.x - 40.0).abs() < 1e-9);
                assert_eq!(guides.len(), 1);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        // nothing committed during the gesture
        assert!(matches!(controller.state(), InteractionState::Dragging(_)));

        match controller.pointer_up(Point::new(29.6, 0.0), &env) {
            Outcome::Committed { id, spec } => {
                assert_eq!(id, ElementId(1));
                assert!((spec.x - 40.0).abs() < 1e-9);
                assert_eq!(spec.y, 10.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(controller.is_idle());
    }

    #[test]
    fn test_flow_element_drags_on_x_only() {
        let vp = viewport();
        let mut spec = PositionSpec::new(10.0, 30.0, 20.0, 10.0);
        spec.position_mode = PositionMode::Flow;
        let element = line(1, spec);
        let mut controller = unthrottled();
        controller.pointer_down(&element, element.spec.rect(), PointerTarget::Body, Point::new(0.0, 0.0));
        let env = env(&[], &vp);

        match controller.pointer_up(Point::new(5.0, 20.0), &env) {
            Outcome::Committed { spec, .. } => {
                assert_eq!(spec.x, 15.0);
                assert_eq!(spec.y, 30.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_vertical_handles_disabled_for_computed_height() {
        let mut spec = PositionSpec::new(10.0, 30.0, 20.0, 10.0);
        spec.auto_height = true;
        let element = line(1, spec);
        let mut controller = unthrottled();
        for handle in [ResizeHandle::Top, ResizeHandle::Bottom, ResizeHandle::TopLeft, ResizeHandle::BottomRight] {
            let outcome = controller.pointer_down(&element, element.spec.rect(), PointerTarget::Handle(handle), Point::default());
            assert_eq!(outcome, vec![Outcome::Ignored(IgnoreReason::HandleDisabled)]);
            assert!(controller.is_idle());
        }
        let outcome = controller.pointer_down(&element, element.spec.rect(), PointerTarget::Handle(ResizeHandle::Right), Point::default());
        assert_eq!(outcome, vec![Outcome::GestureStarted { id: ElementId(1) }]);
    }

    #[test]
    fn test_resize_right_commit() {
        let vp = viewport();
        let element = line(1, PositionSpec::new(0.0, 10.0, 30.0, 10.0));
        let mut controller = unthrottled();
        controller.pointer_down(&element, element.spec.rect(), PointerTarget::Handle(ResizeHandle::Right), Point::new(30.0, 15.0));
        let env = env(&[], &vp);
        match controller.pointer_up(Point::new(99.7, 15.0), &env) {
            Outcome::Committed { spec, .. } => {
                assert_eq!(spec.x, 0.0);
                assert!((spec.width - 100.0).abs() < 1e-9);
                assert_eq!(spec.height, 10.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let vp = viewport();
        let element = line(1, PositionSpec::new(10.0, 10.0, 30.0, 10.0));
        let mut controller = unthrottled();
        controller.pointer_down(&element, element.spec.rect(), PointerTarget::Handle(ResizeHandle::Left), Point::new(10.0, 15.0));
        let env = env(&[], &vp);
        match controller.pointer_up(Point::new(80.0, 15.0), &env) {
            Outcome::Committed { spec, .. } => {
                assert_eq!(spec.width, snap::MIN_SIZE);
                assert_eq!(spec.x + spec.width, 40.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_resize_past_canvas_keeps_fixed_edge() {
        let vp = viewport();
        let element = line(1, PositionSpec::new(30.0, 10.0, 40.0, 10.0));
        let env = env(&[], &vp);

        let mut controller = unthrottled();
        controller.pointer_down(&element, element.spec.rect(), PointerTarget::Handle(ResizeHandle::Right), Point::new(70.0, 15.0));
        controller.pointer_move(Point::new(120.0, 15.0), Instant::now(), &env);
        match controller.pointer_up(Point::new(120.0, 15.0), &env) {
            Outcome::Committed { spec, .. } => {
                assert_eq!(spec.x, 30.0);
                assert_eq!(spec.width, 70.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        let mut controller = unthrottled();
        controller.pointer_down(&element, element.spec.rect(), PointerTarget::Handle(ResizeHandle::Left), Point::new(30.0, 15.0));
        match controller.pointer_up(Point::new(-20.0, 15.0), &env) {
            Outcome::Committed { spec, .. } => {
                assert_eq!(spec.x, 0.0);
                assert_eq!(spec.width, 70.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_horizontal_drag_keeps_stored_y_of_auto_height() {
        let vp = viewport();
        let mut spec = PositionSpec::new(10.0, 80.0, 30.0, 10.0);
        spec.auto_height = true;
        let element = line(1, spec);
        // measured 30 tall, so the drawn rect overhangs the canvas bottom
        let drawn = Rect::new(10.0, 80.0, 30.0, 30.0);
        let env = env(&[], &vp);

        let mut controller = unthrottled();
        controller.pointer_down(&element, drawn, PointerTarget::Body, Point::new(20.0, 90.0));
        match controller.pointer_move(Point::new(23.0, 90.0), Instant::now(), &env) {
            Outcome::Preview { rect, .. } => assert_eq!(rect.y, 80.0),
            other => panic!("unexpected outcome {other:?}"),
        }
        match controller.pointer_up(Point::new(23.0, 90.0), &env) {
            Outcome::Committed { spec, .. } => {
                assert!((spec.x - 13.0).abs() < 1e-9);
                assert_eq!(spec.y, 80.0);
                assert_eq!(spec.height, 10.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_vertical_drag_of_grow_up_maps_back_to_stored_y() {
        let vp = viewport();
        let mut spec = PositionSpec::new(10.0, 60.0, 30.0, 20.0);
        spec.auto_height = true;
        spec.grow_direction = GrowDirection::Up;
        let element = line(1, spec);
        // measured 40, bottom stays at 80
        let drawn = Rect::new(10.0, 40.0, 30.0, 40.0);
        let env = env(&[], &vp);

        let mut controller = unthrottled();
        controller.pointer_down(&element, drawn, PointerTarget::Body, Point::new(20.0, 50.0));
        match controller.pointer_up(Point::new(20.0, 60.0), &env) {
            Outcome::Committed { spec, .. } => {
                assert!((spec.y - 70.0).abs() < 1e-9);
                assert_eq!(spec.height, 20.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_throttled_move_still_commits_latest_pointer() {
        let vp = viewport();
        let element = line(1, PositionSpec::new(10.0, 10.0, 20.0, 10.0));
        let mut controller = InteractionController::new(FrameThrottle::from_millis(16));
        controller.pointer_down(&element, element.spec.rect(), PointerTarget::Body, Point::new(0.0, 0.0));
        let env = env(&[], &vp);
        let start = Instant::now();

        assert!(matches!(controller.pointer_move(Point::new(1.0, 0.0), start, &env), Outcome::Preview { .. }));
        assert_eq!(
            controller.pointer_move(Point::new(7.0, 3.0), start + Duration::from_millis(4), &env),
            Outcome::Throttled
        );
        match controller.pointer_up(Point::new(7.0, 3.0), &env) {
            Outcome::Committed { spec, .. } => {
                assert_eq!(spec.x, 17.0);
                assert_eq!(spec.y, 13.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_click_without_move_does_not_commit() {
        let vp = viewport();
        let element = line(1, PositionSpec::new(10.0, 10.0, 20.0, 10.0));
        let mut controller = unthrottled();
        controller.pointer_down(&element, element.spec.rect(), PointerTarget::Body, Point::new(3.0, 3.0));
        let outcome = controller.pointer_up(Point::new(3.0, 3.0), &env(&[], &vp));
        assert_eq!(outcome, Outcome::Clicked { id: ElementId(1) });
        assert!(controller.is_idle());
    }

    #[test]
    fn test_second_pointer_down_ignored_during_gesture() {
        let a = line(1, PositionSpec::new(10.0, 10.0, 20.0, 10.0));
        let b = line(2, PositionSpec::new(50.0, 50.0, 20.0, 10.0));
        let mut controller = unthrottled();
        controller.pointer_down(&a, a.spec.rect(), PointerTarget::Body, Point::default());
        let outcome = controller.pointer_down(&b, b.spec.rect(), PointerTarget::Body, Point::default());
        assert_eq!(outcome, vec![Outcome::Ignored(IgnoreReason::GestureInProgress)]);
        assert_eq!(controller.active_element(), Some(ElementId(1)));
    }

    #[test]
    fn test_cancel_discards_gesture() {
        let element = line(1, PositionSpec::new(10.0, 10.0, 20.0, 10.0));
        let mut controller = unthrottled();
        controller.pointer_down(&element, element.spec.rect(), PointerTarget::Body, Point::default());
        assert_eq!(controller.cancel(), Outcome::Cancelled { id: ElementId(1) });
        assert!(controller.is_idle());
        assert_eq!(controller.cancel(), Outcome::Ignored(IgnoreReason::NoActiveGesture));
    }

    #[test]
    fn test_move_without_gesture_ignored() {
        let vp = viewport();
        let mut controller = unthrottled();
        let outcome = controller.pointer_move(Point::new(1.0, 1.0), Instant::now(), &env(&[], &vp));
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NoActiveGesture));
    }

    #[test]
    fn test_text_edit_enter_commits_override() {
        let element = line(1, PositionSpec::default());
        let mut controller = unthrottled();
        controller.begin_text_edit(&element, "sample", "sample");
        controller.update_text("Verse 1".to_string());
        assert_eq!(
            controller.key(EditKey::Enter { line_break: false }),
            Outcome::TextCommitted { id: ElementId(1), preview: Some("Verse 1".to_string()) }
        );
        assert!(controller.is_idle());
    }

    #[test]
    fn test_text_edit_shift_enter_inserts_line_break() {
        let element = line(1, PositionSpec::default());
        let mut controller = unthrottled();
        controller.begin_text_edit(&element, "a", "sample");
        controller.key(EditKey::Enter { line_break: true });
        assert_eq!(
            controller.blur(),
            Outcome::TextCommitted { id: ElementId(1), preview: Some("a\n".to_string()) }
        );
    }

    #[test]
    fn test_text_edit_escape_reverts() {
        let element = line(1, PositionSpec::default());
        let mut controller = unthrottled();
        controller.begin_text_edit(&element, "sample", "sample");
        controller.update_text("changed".to_string());
        assert_eq!(controller.key(EditKey::Escape), Outcome::TextReverted { id: ElementId(1) });
        assert!(controller.is_idle());
        assert_eq!(controller.blur(), Outcome::Ignored(IgnoreReason::NotEditing));
    }

    #[test]
    fn test_text_edit_rejected_for_boxes() {
        let element = Element::background_box(ElementId(1), "band", PositionSpec::default());
        let mut controller = unthrottled();
        assert_eq!(
            controller.begin_text_edit(&element, "", ""),
            vec![Outcome::Ignored(IgnoreReason::NotATextLine)]
        );
    }

    #[test]
    fn test_pointer_down_elsewhere_commits_pending_edit() {
        let a = line(1, PositionSpec::new(10.0, 10.0, 20.0, 10.0));
        let b = line(2, PositionSpec::new(50.0, 50.0, 20.0, 10.0));
        let mut controller = unthrottled();
        controller.begin_text_edit(&a, "sample", "sample");
        controller.update_text("edited".to_string());

        let outcomes = controller.pointer_down(&b, b.spec.rect(), PointerTarget::Body, Point::default());
        assert_eq!(
            outcomes,
            vec![
                Outcome::TextCommitted { id: ElementId(1), preview: Some("edited".to_string()) },
                Outcome::GestureStarted { id: ElementId(2) },
            ]
        );
        assert_eq!(controller.active_element(), Some(ElementId(2)));
    }

    #[test]
    fn test_pointer_down_on_edited_element_ignored() {
        let a = line(1, PositionSpec::new(10.0, 10.0, 20.0, 10.0));
        let mut controller = unthrottled();
        controller.begin_text_edit(&a, "sample", "sample");
        let outcomes = controller.pointer_down(&a, a.spec.rect(), PointerTarget::Body, Point::default());
        assert_eq!(outcomes, vec![Outcome::Ignored(IgnoreReason::EditingSameElement)]);
        assert!(matches!(controller.state(), InteractionState::EditingText(_)));
    }
}
