//! In-place text editing of a line's preview text

use serde::{Deserialize, Serialize};

use crate::types::ElementId;

/// Keys the text-edit sub-state reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKey {
    /// Enter; with `line_break` (shift) it inserts a newline instead of committing
    Enter { line_break: bool },
    Escape,
}

/// Editable buffer captured on double-activation
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditSession {
    pub id: ElementId,
    /// Text displayed when editing began
    original: String,
    buffer: String,
    /// Sample text for the line kind; committing it clears the override
    default_text: String,
}

impl TextEditSession {
    pub fn new(id: ElementId, displayed: &str, default_text: &str) -> Self {
        Self {
            id,
            original: displayed.to_string(),
            buffer: displayed.to_string(),
            default_text: default_text.to_string(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn set_buffer(&mut self, text: String) {
        self.buffer = text;
    }

    pub fn insert_line_break(&mut self) {
        self.buffer.push('\n');
    }

    /// Preview override to store for this buffer (`None` = use the sample text)
    pub fn into_override(self) -> Option<String> {
        if self.buffer == self.default_text {
            None
        } else {
            Some(self.buffer)
        }
    }
}
