//! Layout and snap-assist engine for a worship presentation theme editor.
//!
//! Elements are placed on a canvas in percent coordinates, either freely
//! (absolute) or stacked below earlier elements (flow). [`editor::CanvasEditor`]
//! ties the pieces together: it resolves layout, runs drag/resize gestures
//! through the snap engine and reports changes as [`events::EditorEvent`]s.

#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod editor;
pub mod events;
pub mod interaction;
pub mod layout;
pub mod sample;
pub mod snapping;
pub mod throttle;
pub mod types;
pub mod viewport;

pub use config::EditorConfig;
pub use editor::{CanvasEditor, NudgeDirection};
pub use events::{EditorEvent, EventSink, NullSink};
pub use interaction::{EditKey, PointerTarget};
pub use layout::{LayoutError, ResolvedLayout};
pub use snapping::{SnapContext, SnapGuide, SnapResult};
pub use types::{Element, ElementId, LineKind, Point, PositionSpec, Rect, ResizeHandle, Size};
