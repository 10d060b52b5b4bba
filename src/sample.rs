//! Built-in sample theme used by the CLI and tests

use crate::types::{Element, ElementId, GrowDirection, LineKind, PositionMode, PositionSpec};

/// Lower-third song slide: band, title, verse text flowing into a
/// translation line and a reference, plus a footer.
pub fn sample_theme() -> Vec<Element> {
    let verse = PositionSpec {
        auto_height: true,
        grow_direction: GrowDirection::Down,
        ..PositionSpec::new(10.0, 30.0, 80.0, 20.0)
    };
    let translation = PositionSpec {
        position_mode: PositionMode::Flow,
        flow_anchor: Some(ElementId(3)),
        flow_gap: 2.0,
        ..PositionSpec::new(10.0, 60.0, 80.0, 10.0)
    };
    let reference = PositionSpec {
        position_mode: PositionMode::Flow,
        flow_anchor: Some(ElementId(4)),
        flow_gap: 1.0,
        ..PositionSpec::new(65.0, 75.0, 25.0, 5.0)
    };

    vec![
        Element::background_box(ElementId(1), "lower third", PositionSpec::new(0.0, 70.0, 100.0, 30.0)),
        Element::text_line(ElementId(2), LineKind::Title, PositionSpec::new(5.0, 5.0, 90.0, 10.0)),
        Element::text_line(ElementId(3), LineKind::Main, verse),
        Element::text_line(ElementId(4), LineKind::Secondary, translation),
        Element::text_line(ElementId(5), LineKind::Reference, reference),
        Element::text_line(ElementId(6), LineKind::Footer, PositionSpec::new(5.0, 92.0, 50.0, 5.0)),
    ]
}
