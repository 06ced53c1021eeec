//! Timing, geometry and keyboard settings for the preview overlay.
//!
//! Every delay and size the controller uses is a named constant here.
//! `PreviewConfig::default()` is built from them; hosts may override
//! individual fields before calling `PreviewController::initialize`.

use std::time::Duration;

/// Pointer must rest on a link this long before the hint appears.
pub const HOVER_DELAY: Duration = Duration::from_millis(500);
/// A fetch slower than this reveals the loading spinner.
pub const SPINNER_DELAY: Duration = Duration::from_millis(500);
/// Panel fade-out before it is hidden and its content released.
pub const FADE_DURATION: Duration = Duration::from_millis(300);
/// The copy button shows its confirmation label this long.
pub const COPY_LABEL_REVERT: Duration = Duration::from_millis(2000);

/// Minimum distance between the panel and any viewport edge.
pub const CLAMP_MARGIN: f32 = 20.0;
/// Panel width and height as a fraction of the viewport.
pub const PANEL_FRACTION: f32 = 0.72;
/// Height of the draggable header strip.
pub const HEADER_HEIGHT: f32 = 32.0;
/// Gap between a link's bottom edge and the hint.
pub const HINT_OFFSET: f32 = 6.0;
/// Estimated hint box size, used for clamping only.
pub const HINT_SIZE: (f32, f32) = (180.0, 28.0);

pub const COPY_LABEL: &str = "Copy Link";
pub const COPIED_LABEL: &str = "Copied!";
pub const OPEN_LABEL: &str = "Open in New Tab";
pub const CLOSE_LABEL: &str = "\u{00D7}";
pub const FAILURE_MESSAGE: &str =
    "Failed to load content. Please try opening the link in a new tab.";

/// A key as seen by the controller. Hosts map their native key events
/// onto this before dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Other,
}

impl Key {
    /// Case-insensitive comparison for character keys.
    pub fn matches(self, other: Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }
}

/// Single-key shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    /// Opens a preview for the hovered link.
    pub preview: Key,
    /// Copies the previewed URL. Only while a preview is visible.
    pub copy: Key,
    /// Opens the previewed URL in a new tab. Only while a preview is visible.
    pub open: Key,
    /// Always dismisses.
    pub dismiss: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            preview: Key::Char('p'),
            copy: Key::Char('c'),
            open: Key::Char('o'),
            dismiss: Key::Escape,
        }
    }
}

impl KeyBindings {
    /// Text shown in the hint advertising the preview shortcut.
    pub fn hint_text(&self) -> String {
        match self.preview {
            Key::Char(c) => format!("Press {} to preview", c.to_ascii_uppercase()),
            Key::Escape => "Press Esc to preview".to_string(),
            Key::Other => "Right-click to preview".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    pub hover_delay: Duration,
    pub spinner_delay: Duration,
    pub fade_duration: Duration,
    pub copy_label_revert: Duration,
    pub clamp_margin: f32,
    pub panel_fraction: f32,
    pub header_height: f32,
    pub hint_offset: f32,
    pub keys: KeyBindings,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            hover_delay: HOVER_DELAY,
            spinner_delay: SPINNER_DELAY,
            fade_duration: FADE_DURATION,
            copy_label_revert: COPY_LABEL_REVERT,
            clamp_margin: CLAMP_MARGIN,
            panel_fraction: PANEL_FRACTION,
            header_height: HEADER_HEIGHT,
            hint_offset: HINT_OFFSET,
            keys: KeyBindings::default(),
        }
    }
}
