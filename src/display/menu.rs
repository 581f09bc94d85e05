//! Context menu entries of the image display.

use std::fmt;

/// What a context menu entry does when chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Activate the creation tool for the kind with this tag
    StartTool(String),
    Cancel,
    DeleteSelected,
    ClearAnnotations,
}

/// One context menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub action: MenuAction,
    pub enabled: bool,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
            enabled: true,
        }
    }

    pub fn enabled_if(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl fmt::Display for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(f, "{}", self.label)
        } else {
            write!(f, "({})", self.label)
        }
    }
}
