//! Effective geometry resolution for flow and auto-height elements
//!
//! Resolution is a single forward pass over the canonical element order.
//! Flow anchors may only point backwards in that order, so every anchor is
//! already resolved by the time an element that depends on it is reached.
//! Stored specs are never touched; the result is a derived view.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{Element, ElementBounds, ElementId, GrowDirection, Rect};

/// Measured content heights (percent of canvas) reported by the host
pub type MeasuredHeights = HashMap<ElementId, f64>;

/// Rejected anchor edits and unknown element references
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("element {0} does not exist")]
    UnknownElement(ElementId),

    #[error("element {0} cannot anchor to itself")]
    SelfAnchor(ElementId),

    #[error("element {id} cannot anchor to {anchor}: anchors must be declared earlier")]
    ForwardAnchor { id: ElementId, anchor: ElementId },
}

/// Why an anchor was ignored during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorIssueKind {
    Dangling,
    SelfReference,
    ForwardReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorIssue {
    pub id: ElementId,
    pub anchor: ElementId,
    pub kind: AnchorIssueKind,
}

/// Effective geometry of one element for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Height stored in the spec, before measurement
    pub stored_height: f64,
    pub grow_direction: GrowDirection,
    pub auto_height: bool,
}

impl ResolvedElement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Box actually painted on the canvas.
    ///
    /// An up-growing auto-height element keeps its bottom edge where the
    /// stored height puts it and extends upwards instead.
    pub fn visual_bounds(&self) -> Rect {
        if self.auto_height && self.grow_direction == GrowDirection::Up {
            let bottom = self.y + self.stored_height;
            Rect::new(self.x, bottom - self.height, self.width, self.height)
        } else {
            self.rect()
        }
    }
}

/// Resolved geometry for every element, in canonical order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedLayout {
    elements: Vec<ResolvedElement>,
}

impl ResolvedLayout {
    pub fn get(&self, id: ElementId) -> Option<&ResolvedElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Visual bounds of every element except `excluded`, for snap checks
    pub fn bounds_except(&self, excluded: ElementId) -> Vec<ElementBounds> {
        self.elements
            .iter()
            .filter(|e| e.id != excluded)
            .map(|e| ElementBounds::new(e.id, e.visual_bounds()))
            .collect()
    }
}

/// Resolve effective Y and height for every element
pub fn resolve(elements: &[Element], measured: &MeasuredHeights) -> ResolvedLayout {
    let mut resolved: Vec<ResolvedElement> = Vec::with_capacity(elements.len());
    let mut index: HashMap<ElementId, usize> = HashMap::with_capacity(elements.len());

    for (own_index, element) in elements.iter().enumerate() {
        let spec = &element.spec;
        let mut y = spec.y;

        if spec.is_flow() {
            if let Some(anchor_id) = spec.flow_anchor {
                match index.get(&anchor_id).map(|&i| &resolved[i]) {
                    Some(anchor) if spec.flow_beside => {
                        y = anchor.y;
                    }
                    Some(anchor) => {
                        y = anchor.y + anchor_height(anchor, measured) + spec.flow_gap;
                    }
                    None => match classify_anchor(elements, own_index, element.id, anchor_id) {
                        Some(AnchorIssueKind::SelfReference) => {
                            warn!(element = %element.id, "Element is anchored to itself, using stored y");
                        }
                        Some(AnchorIssueKind::ForwardReference) => {
                            warn!(
                                element = %element.id,
                                anchor = %anchor_id,
                                "Anchor is not declared before element, using stored y"
                            );
                        }
                        Some(AnchorIssueKind::Dangling) | None => {
                            debug!(
                                element = %element.id,
                                anchor = %anchor_id,
                                "Dangling flow anchor, using stored y"
                            );
                        }
                    },
                }
            }
        }

        let height = effective_height(element, measured);
        index.insert(element.id, resolved.len());
        resolved.push(ResolvedElement {
            id: element.id,
            x: spec.x,
            y,
            width: spec.width,
            height,
            stored_height: spec.height,
            grow_direction: spec.grow_direction,
            auto_height: spec.auto_height,
        });
    }

    ResolvedLayout { elements: resolved }
}

fn effective_height(element: &Element, measured: &MeasuredHeights) -> f64 {
    if element.spec.auto_height {
        if let Some(&height) = measured.get(&element.id) {
            return height;
        }
    }
    element.spec.height
}

/// Height an anchor contributes to the element flowing below it
fn anchor_height(anchor: &ResolvedElement, measured: &MeasuredHeights) -> f64 {
    if anchor.auto_height {
        // unmeasured auto-height content has no extent yet
        measured.get(&anchor.id).copied().unwrap_or(0.0)
    } else {
        anchor.stored_height
    }
}

/// Check an anchor edit before it is applied
pub fn validate_anchor(
    elements: &[Element],
    id: ElementId,
    anchor: ElementId,
) -> Result<(), LayoutError> {
    let own_index = position_of(elements, id).ok_or(LayoutError::UnknownElement(id))?;
    if id == anchor {
        return Err(LayoutError::SelfAnchor(id));
    }
    let anchor_index = position_of(elements, anchor).ok_or(LayoutError::UnknownElement(anchor))?;
    if anchor_index > own_index {
        return Err(LayoutError::ForwardAnchor { id, anchor });
    }
    Ok(())
}

/// Every flow anchor that resolution would ignore
pub fn anchor_issues(elements: &[Element]) -> Vec<AnchorIssue> {
    let mut issues = Vec::new();
    for (own_index, element) in elements.iter().enumerate() {
        if !element.spec.is_flow() {
            continue;
        }
        let Some(anchor) = element.spec.flow_anchor else {
            continue;
        };
        if let Some(kind) = classify_anchor(elements, own_index, element.id, anchor) {
            issues.push(AnchorIssue {
                id: element.id,
                anchor,
                kind,
            });
        }
    }
    issues
}

/// Elements whose resolved position depends on `id`, directly or through a chain
pub fn dependents_of(elements: &[Element], id: ElementId) -> BTreeSet<ElementId> {
    let mut dependents = BTreeSet::new();
    let mut frontier = vec![id];
    while let Some(current) = frontier.pop() {
        for element in elements {
            if element.spec.is_flow()
                && element.spec.flow_anchor == Some(current)
                && element.id != id
                && dependents.insert(element.id)
            {
                frontier.push(element.id);
            }
        }
    }
    dependents
}

/// Why resolution would ignore `anchor` for the element at `own_index`, if it would
fn classify_anchor(
    elements: &[Element],
    own_index: usize,
    id: ElementId,
    anchor: ElementId,
) -> Option<AnchorIssueKind> {
    if anchor == id {
        return Some(AnchorIssueKind::SelfReference);
    }
    match position_of(elements, anchor) {
        None => Some(AnchorIssueKind::Dangling),
        Some(i) if i > own_index => Some(AnchorIssueKind::ForwardReference),
        Some(_) => None,
    }
}

fn position_of(elements: &[Element], id: ElementId) -> Option<usize> {
    elements.iter().position(|e| e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineKind, PositionMode, PositionSpec};

    fn absolute(id: u32, y: f64, height: f64) -> Element {
        Element::text_line(ElementId(id), LineKind::Main, PositionSpec::new(10.0, y, 80.0, height))
    }

    fn flow(id: u32, anchor: Option<u32>, beside: bool, gap: f64, y: f64, height: f64) -> Element {
        let mut spec = PositionSpec::new(10.0, y, 80.0, height);
        spec.position_mode = PositionMode::Flow;
        spec.flow_anchor = anchor.map(ElementId);
        spec.flow_beside = beside;
        spec.flow_gap = gap;
        Element::text_line(ElementId(id), LineKind::Secondary, spec)
    }

    #[test]
    fn test_flow_chain() {
        let elements = vec![
            absolute(1, 10.0, 20.0),
            flow(2, Some(1), false, 2.0, 0.0, 15.0),
            flow(3, Some(2), false, 1.0, 0.0, 5.0),
        ];
        let layout = resolve(&elements, &MeasuredHeights::new());
        let b = layout.get(ElementId(2)).unwrap();
        assert_eq!(b.y, 32.0);
        assert_eq!(layout.get(ElementId(3)).unwrap().y, b.y + b.height + 1.0);
    }

    #[test]
    fn test_unmeasured_auto_height_anchor_contributes_zero() {
        let mut a = absolute(1, 10.0, 20.0);
        a.spec.auto_height = true;
        let elements = vec![a, flow(2, Some(1), false, 2.0, 0.0, 10.0)];
        let layout = resolve(&elements, &MeasuredHeights::new());
        assert_eq!(layout.get(ElementId(2)).unwrap().y, 12.0);
    }

    #[test]
    fn test_measured_auto_height_anchor() {
        let mut a = absolute(1, 10.0, 20.0);
        a.spec.auto_height = true;
        let elements = vec![a, flow(2, Some(1), false, 2.0, 0.0, 10.0)];
        let measured = MeasuredHeights::from([(ElementId(1), 7.5)]);
        let layout = resolve(&elements, &measured);
        assert_eq!(layout.get(ElementId(1)).unwrap().height, 7.5);
        assert_eq!(layout.get(ElementId(2)).unwrap().y, 19.5);
    }

    #[test]
    fn test_measurement_ignored_without_auto_height() {
        let elements = vec![absolute(1, 10.0, 20.0), flow(2, Some(1), false, 0.0, 0.0, 10.0)];
        let measured = MeasuredHeights::from([(ElementId(1), 3.0)]);
        let layout = resolve(&elements, &measured);
        assert_eq!(layout.get(ElementId(1)).unwrap().height, 20.0);
        assert_eq!(layout.get(ElementId(2)).unwrap().y, 30.0);
    }

    #[test]
    fn test_flow_beside_uses_anchor_y() {
        let elements = vec![
            absolute(1, 40.0, 20.0),
            flow(2, Some(1), true, 9.0, 0.0, 10.0),
        ];
        let layout = resolve(&elements, &MeasuredHeights::new());
        assert_eq!(layout.get(ElementId(2)).unwrap().y, 40.0);
    }

    #[test]
    fn test_unanchored_flow_uses_stored_y() {
        let elements = vec![flow(1, None, false, 5.0, 33.0, 10.0)];
        let layout = resolve(&elements, &MeasuredHeights::new());
        assert_eq!(layout.get(ElementId(1)).unwrap().y, 33.0);
    }

    #[test]
    fn test_dangling_anchor_falls_back() {
        let elements = vec![flow(1, Some(99), false, 5.0, 44.0, 10.0)];
        let layout = resolve(&elements, &MeasuredHeights::new());
        assert_eq!(layout.get(ElementId(1)).unwrap().y, 44.0);
    }

    #[test]
    fn test_forward_anchor_falls_back() {
        let elements = vec![
            flow(1, Some(2), false, 5.0, 44.0, 10.0),
            absolute(2, 10.0, 10.0),
        ];
        let layout = resolve(&elements, &MeasuredHeights::new());
        assert_eq!(layout.get(ElementId(1)).unwrap().y, 44.0);
    }

    #[test]
    fn test_self_anchor_falls_back() {
        let elements = vec![absolute(1, 10.0, 10.0), flow(2, Some(2), false, 5.0, 55.0, 10.0)];
        assert_eq!(
            classify_anchor(&elements, 1, ElementId(2), ElementId(2)),
            Some(AnchorIssueKind::SelfReference)
        );
        assert_eq!(classify_anchor(&elements, 1, ElementId(2), ElementId(1)), None);
        let layout = resolve(&elements, &MeasuredHeights::new());
        assert_eq!(layout.get(ElementId(2)).unwrap().y, 55.0);
    }

    #[test]
    fn test_absolute_ignores_anchor_fields() {
        let mut element = absolute(2, 70.0, 10.0);
        element.spec.flow_anchor = Some(ElementId(1));
        let elements = vec![absolute(1, 10.0, 10.0), element];
        let layout = resolve(&elements, &MeasuredHeights::new());
        assert_eq!(layout.get(ElementId(2)).unwrap().y, 70.0);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let elements = vec![
            absolute(1, 10.0, 20.0),
            flow(2, Some(1), false, 2.0, 0.0, 15.0),
        ];
        let measured = MeasuredHeights::new();
        assert_eq!(resolve(&elements, &measured), resolve(&elements, &measured));
    }

    #[test]
    fn test_visual_bounds_grow_up() {
        let mut a = absolute(1, 60.0, 20.0);
        a.spec.auto_height = true;
        a.spec.grow_direction = GrowDirection::Up;
        let layout = resolve(&[a], &MeasuredHeights::from([(ElementId(1), 30.0)]));
        let resolved = layout.get(ElementId(1)).unwrap();
        assert_eq!(resolved.y, 60.0);
        assert_eq!(resolved.visual_bounds(), Rect::new(10.0, 50.0, 80.0, 30.0));
    }

    #[test]
    fn test_validate_anchor() {
        let elements = vec![absolute(1, 0.0, 10.0), absolute(2, 0.0, 10.0)];
        assert_eq!(validate_anchor(&elements, ElementId(2), ElementId(1)), Ok(()));
        assert_eq!(
            validate_anchor(&elements, ElementId(1), ElementId(2)),
            Err(LayoutError::ForwardAnchor { id: ElementId(1), anchor: ElementId(2) })
        );
        assert_eq!(
            validate_anchor(&elements, ElementId(1), ElementId(1)),
            Err(LayoutError::SelfAnchor(ElementId(1)))
        );
        assert_eq!(
            validate_anchor(&elements, ElementId(1), ElementId(7)),
            Err(LayoutError::UnknownElement(ElementId(7)))
        );
    }

    #[test]
    fn test_anchor_issues() {
        let elements = vec![
            flow(1, Some(2), false, 0.0, 0.0, 10.0),
            flow(2, Some(2), false, 0.0, 0.0, 10.0),
            flow(3, Some(42), false, 0.0, 0.0, 10.0),
            flow(4, Some(1), false, 0.0, 0.0, 10.0),
        ];
        let kinds: Vec<_> = anchor_issues(&elements).into_iter().map(|i| (i.id.0, i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (1, AnchorIssueKind::ForwardReference),
                (2, AnchorIssueKind::SelfReference),
                (3, AnchorIssueKind::Dangling),
            ]
        );
    }

    #[test]
    fn test_dependents_of_is_transitive() {
        let elements = vec![
            absolute(1, 0.0, 10.0),
            flow(2, Some(1), false, 0.0, 0.0, 10.0),
            flow(3, Some(2), true, 0.0, 0.0, 10.0),
            absolute(4, 0.0, 10.0),
        ];
        let deps = dependents_of(&elements, ElementId(1));
        assert_eq!(deps, BTreeSet::from([ElementId(2), ElementId(3)]));
        assert!(dependents_of(&elements, ElementId(4)).is_empty());
    }
}
