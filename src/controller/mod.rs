//! `PreviewController` — the preview lifecycle state machine.
//!
//! One controller exists per page context. `initialize` builds the overlay
//! once; every host event is fed through one dispatcher method per event
//! type, split across the sibling sub-modules:
//!
//! - `hover`   — hover intent, hint
//! - `panel`   — preview trigger, fetch resolution, fade, close, drag
//! - `actions` — keyboard, context menu, header buttons, copy/open
//!
//! The controller performs no I/O. Fetches, clipboard writes and new-tab
//! requests are queued as [`Effect`]s for the host to carry out. Time is
//! passed in explicitly and pending timers fire from [`PreviewController::tick`].
//!
//! Only the fetch stamped with the current generation may render; any
//! other reply is dropped on arrival.

pub mod actions;
pub mod hover;
pub mod overlay;
pub mod panel;

use std::time::Instant;

use crate::config::PreviewConfig;
use crate::geometry::{Point, Rect, Size};
use crate::relay::FetchTicket;
use crate::timer::{TimerKind, Timers};

pub use overlay::{Overlay, PaneContent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    /// Hover-intent timer pending, nothing visible.
    Armed,
    /// Hint visible, no panel.
    Notifying,
    /// Panel placed, request in flight.
    Loading,
    Showing,
    /// Showing, with the panel following the pointer.
    Dragging,
    /// Fade-out in progress.
    Closing,
}

impl PreviewState {
    /// Panel is on screen and not on its way out.
    pub fn panel_open(self) -> bool {
        matches!(
            self,
            PreviewState::Loading | PreviewState::Showing | PreviewState::Dragging
        )
    }
}

/// A link on the host page.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTarget {
    /// Absolute URL.
    pub url: String,
    /// Bounding box in viewport coordinates.
    pub rect: Rect,
}

impl LinkTarget {
    pub fn new(url: impl Into<String>, rect: Rect) -> Self {
        Self {
            url: url.into(),
            rect,
        }
    }
}

/// The link currently under the pointer. `armed` is cleared once the
/// hover-intent timer fires; the candidate itself lives until pointer-leave.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverIntent {
    pub candidate: LinkTarget,
    pub armed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSession {
    pub target_url: Option<String>,
    pub title: String,
    pub geometry: Rect,
    pub state: PreviewState,
    /// Pointer minus panel origin, only while dragging.
    pub drag_offset: Option<Point>,
}

/// Work the host must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchTicket),
    WriteClipboard(String),
    OpenInNewTab(String),
}

pub struct PreviewController {
    config: PreviewConfig,
    viewport: Size,
    overlay: Overlay,
    session: PreviewSession,
    hover: Option<HoverIntent>,
    timers: Timers,
    generation: u64,
    effects: Vec<Effect>,
}

impl PreviewController {
    /// Build the controller and its overlay for one page context.
    pub fn initialize(config: PreviewConfig, viewport: Size) -> Self {
        let overlay = Overlay::new(&config.keys);
        log::debug!("preview overlay initialized for {}x{}", viewport.width, viewport.height);
        Self {
            config,
            viewport,
            overlay,
            session: PreviewSession {
                target_url: None,
                title: String::new(),
                geometry: Rect::default(),
                state: PreviewState::Idle,
                drag_offset: None,
            },
            hover: None,
            timers: Timers::new(),
            generation: 0,
            effects: Vec::new(),
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn session(&self) -> &PreviewSession {
        &self.session
    }

    pub fn state(&self) -> PreviewState {
        self.session.state
    }

    pub fn hover(&self) -> Option<&HoverIntent> {
        self.hover.as_ref()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Generation of the most recently issued fetch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Earliest pending timer, for hosts scheduling their next wake-up.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Hand queued effects to the host.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Viewport changed. Affects placement of the next panel and hint.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Fire every timer due at `now`.
    pub fn tick(&mut self, now: Instant) {
        for kind in self.timers.take_due(now) {
            match kind {
                TimerKind::HoverIntent => self.hover_intent_fired(now),
                TimerKind::SpinnerReveal => self.reveal_spinner(),
                TimerKind::FadeIn => self.fade_in(),
                TimerKind::FadeOut => self.finish_close(),
                TimerKind::CopyRevert => self.revert_copy_label(),
            }
        }
    }

    fn set_state(&mut self, next: PreviewState) {
        if self.session.state != next {
            log::debug!("preview {:?} -> {:?}", self.session.state, next);
            self.session.state = next;
        }
    }

    fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}
