//! Application-wide constants
//!
//! This module contains the magic numbers used by the layout and snap engine,
//! providing a single source of truth for constant values.

/// Canvas coordinate space constants
pub mod canvas {
    /// Full extent of the percentage coordinate space
    pub const EXTENT: f64 = 100.0;

    /// Canvas center on either axis
    pub const CENTER: f64 = 50.0;

    /// Default authoring resolution (width in pixels)
    pub const REFERENCE_WIDTH: f64 = 1920.0;

    /// Default authoring resolution (height in pixels)
    pub const REFERENCE_HEIGHT: f64 = 1080.0;
}

/// Snap engine tuning
pub mod snap {
    /// Default snap threshold in percent of the canvas
    pub const DEFAULT_THRESHOLD: f64 = 1.0;

    /// Smallest width or height (percent) any snapped geometry may have
    pub const MIN_SIZE: f64 = 5.0;

    /// Bias added per priority level when ranking candidates
    pub const PRIORITY_BIAS: f64 = 0.001;

    /// Candidate priorities (lower wins ties)
    pub mod priority {
        pub const CANVAS_CENTER: u8 = 0;
        pub const CANVAS_EDGE: u8 = 1;
        pub const ELEMENT_ALIGN: u8 = 2;
        pub const DIMENSION_MATCH: u8 = 2;
        pub const RESIZE_EDGE_ALIGN: u8 = 3;
    }
}

/// Font projection constants
pub mod font {
    /// Base font size as a fraction of the reference height (100% style size)
    pub const BASE_HEIGHT_FRACTION: f64 = 0.05;
}

/// Gesture timing
pub mod timing {
    /// One evaluation per rendered frame (~60Hz)
    pub const FRAME_INTERVAL_MS: u64 = 16;
}

/// Keyboard nudge defaults (percent)
pub mod nudge {
    pub const STEP: f64 = 0.5;
    pub const STEP_LARGE: f64 = 5.0;
}

/// Config file location
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "theme-layout";

    /// Editor settings file name
    pub const FILENAME: &str = "editor.json";
}

/// Config validation bounds
pub mod validation {
    pub const MAX_SNAP_THRESHOLD: f64 = 10.0;
    pub const MAX_FRAME_INTERVAL_MS: u64 = 1000;
    pub const MIN_REFERENCE_DIMENSION: f64 = 1.0;
    pub const MAX_REFERENCE_DIMENSION: f64 = 16384.0;
    pub const MIN_NUDGE_STEP: f64 = 0.01;
    pub const MAX_NUDGE_STEP: f64 = 50.0;
}
