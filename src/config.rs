use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::constants::{canvas, nudge, snap, timing};
use crate::throttle::FrameThrottle;
use crate::types::{LineKind, Size};
use crate::viewport::ViewportMapper;

/// Editor settings persisted as JSON in the user config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Snap threshold in percent of the canvas (0 = disabled)
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,

    /// Minimum spacing between snap evaluations during a gesture
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Authoring resolution the layout is designed against
    #[serde(default = "default_reference_width")]
    pub reference_width: f64,
    #[serde(default = "default_reference_height")]
    pub reference_height: f64,

    /// Arrow-key nudge distance in percent
    #[serde(default = "default_nudge_step")]
    pub nudge_step: f64,

    /// Nudge distance with the modifier held
    #[serde(default = "default_nudge_step_large")]
    pub nudge_step_large: f64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-kind sample text replacing the built-in one
    #[serde(default)]
    pub sample_text: BTreeMap<LineKind, String>,
}

fn default_snap_threshold() -> f64 {
    snap::DEFAULT_THRESHOLD
}

fn default_frame_interval_ms() -> u64 {
    timing::FRAME_INTERVAL_MS
}

fn default_reference_width() -> f64 {
    canvas::REFERENCE_WIDTH
}

fn default_reference_height() -> f64 {
    canvas::REFERENCE_HEIGHT
}

fn default_nudge_step() -> f64 {
    nudge::STEP
}

fn default_nudge_step_large() -> f64 {
    nudge::STEP_LARGE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: default_snap_threshold(),
            frame_interval_ms: default_frame_interval_ms(),
            reference_width: default_reference_width(),
            reference_height: default_reference_height(),
            nudge_step: default_nudge_step(),
            nudge_step_large: default_nudge_step_large(),
            log_level: default_log_level(),
            sample_text: BTreeMap::new(),
        }
    }
}

impl EditorConfig {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load from the default location, creating it with defaults if missing.
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::path())?;
        config.apply_env_overrides();
        config.validate_and_clamp();
        Ok(config)
    }

    /// Load from `path`; a missing file is created with defaults.
    ///
    /// A file that exists but fails to parse is an error and is left untouched.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, creating default config");
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let mut config: EditorConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        config.validate_and_clamp();
        info!(path = %path.display(), snap_threshold = config.snap_threshold, "Loaded editor config");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        info!(path = %path.display(), "Saved editor config");
        Ok(())
    }

    /// Clamp every value into its accepted range
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if !self.snap_threshold.is_finite() || self.snap_threshold < 0.0 {
            warn!(snap_threshold = self.snap_threshold, using = default_snap_threshold(), "snap_threshold invalid, using default");
            self.snap_threshold = default_snap_threshold();
        } else if self.snap_threshold > MAX_SNAP_THRESHOLD {
            warn!(snap_threshold = self.snap_threshold, max = MAX_SNAP_THRESHOLD, "snap_threshold exceeds maximum, clamping");
            self.snap_threshold = MAX_SNAP_THRESHOLD;
        }

        if self.frame_interval_ms > MAX_FRAME_INTERVAL_MS {
            warn!(frame_interval_ms = self.frame_interval_ms, max = MAX_FRAME_INTERVAL_MS, "frame_interval_ms exceeds maximum, clamping");
            self.frame_interval_ms = MAX_FRAME_INTERVAL_MS;
        }

        self.reference_width = clamp_field(
            "reference_width",
            self.reference_width,
            MIN_REFERENCE_DIMENSION,
            MAX_REFERENCE_DIMENSION,
            default_reference_width(),
        );
        self.reference_height = clamp_field(
            "reference_height",
            self.reference_height,
            MIN_REFERENCE_DIMENSION,
            MAX_REFERENCE_DIMENSION,
            default_reference_height(),
        );
        self.nudge_step = clamp_field(
            "nudge_step",
            self.nudge_step,
            MIN_NUDGE_STEP,
            MAX_NUDGE_STEP,
            default_nudge_step(),
        );
        self.nudge_step_large = clamp_field(
            "nudge_step_large",
            self.nudge_step_large,
            MIN_NUDGE_STEP,
            MAX_NUDGE_STEP,
            default_nudge_step_large(),
        );
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|var| env::var(var).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("SNAP_THRESHOLD") {
            match raw.trim().parse::<f64>() {
                Ok(threshold) => self.snap_threshold = threshold,
                Err(e) => error!(var = "SNAP_THRESHOLD", value = %raw, error = %e, "failed to parse env var"),
            }
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level.trim().to_lowercase();
        }
    }

    /// Sample text shown for a line kind without a preview override
    pub fn sample_text(&self, kind: LineKind) -> &str {
        self.sample_text
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_sample_text())
    }

    pub fn reference_size(&self) -> Size {
        Size::new(self.reference_width, self.reference_height)
    }

    /// Mapper for a render surface at the reference resolution
    pub fn viewport(&self) -> ViewportMapper {
        ViewportMapper::at_reference(self.reference_size())
    }

    pub fn throttle(&self) -> FrameThrottle {
        FrameThrottle::from_millis(self.frame_interval_ms)
    }

    pub fn nudge_distance(&self, large: bool) -> f64 {
        if large { self.nudge_step_large } else { self.nudge_step }
    }
}

fn clamp_field(name: &str, value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        warn!(field = name, using = fallback, "value is not a finite number, using default");
        fallback
    } else if value < min {
        warn!(field = name, value, min, "value below minimum, clamping");
        min
    } else if value > max {
        warn!(field = name, value, max, "value exceeds maximum, clamping");
        max
    } else {
        value
    }
}
