//! The page-injected elements: panel (header, buttons, content pane),
//! spinner and hint. They are built once by `Overlay::new` and only ever
//! mutated in place afterwards.

use crate::config::{self, KeyBindings};
use crate::geometry::{Point, Rect};
use crate::sanitize::SanitizedPage;

pub const PANEL_ID: &str = "link-preview-container";
pub const HEADER_ID: &str = "link-preview-header";
pub const TITLE_ID: &str = "link-preview-title";
pub const BUTTONS_ID: &str = "link-preview-buttons";
pub const COPY_BUTTON_ID: &str = "link-preview-copy";
pub const OPEN_BUTTON_ID: &str = "link-preview-open";
pub const CLOSE_BUTTON_ID: &str = "link-preview-close";
pub const CONTENT_ID: &str = "link-preview-content";
pub const SPINNER_ID: &str = "link-preview-spinner";
pub const HINT_ID: &str = "link-preview-notification";

/// What the content pane currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaneContent {
    #[default]
    Empty,
    Page(SanitizedPage),
    Failed,
}

#[derive(Debug)]
pub struct Panel {
    /// `display` other than `none`.
    pub display: bool,
    pub opacity: f32,
    pub geometry: Rect,
    pub title: String,
    pub content: PaneContent,
    pub copy_label: &'static str,
    pub open_label: &'static str,
    pub close_label: &'static str,
}

impl Panel {
    pub fn header(&self, height: f32) -> Rect {
        Rect::new(self.geometry.x, self.geometry.y, self.geometry.width, height)
    }
}

#[derive(Debug)]
pub struct Spinner {
    pub visible: bool,
    pub opacity: f32,
    pub center: Point,
}

#[derive(Debug)]
pub struct Hint {
    pub visible: bool,
    pub position: Point,
    pub text: String,
}

#[derive(Debug)]
pub struct Overlay {
    pub panel: Panel,
    pub spinner: Spinner,
    pub hint: Hint,
}

impl Overlay {
    pub(crate) fn new(keys: &KeyBindings) -> Self {
        Self {
            panel: Panel {
                display: false,
                opacity: 0.0,
                geometry: Rect::default(),
                title: String::new(),
                content: PaneContent::Empty,
                copy_label: config::COPY_LABEL,
                open_label: config::OPEN_LABEL,
                close_label: config::CLOSE_LABEL,
            },
            spinner: Spinner {
                visible: false,
                opacity: 0.0,
                center: Point::default(),
            },
            hint: Hint {
                visible: false,
                position: Point::default(),
                text: keys.hint_text(),
            },
        }
    }

    pub(crate) fn hide_spinner(&mut self) {
        self.spinner.visible = false;
        self.spinner.opacity = 0.0;
    }

    pub(crate) fn hide_hint(&mut self) {
        self.hint.visible = false;
    }
}
