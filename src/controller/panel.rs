//! Preview panel lifecycle: trigger, fetch resolution, fades, close, drag.

use std::time::{Duration, Instant};

use crate::geometry::{place_panel, Point};
use crate::relay::protocol::{FetchResponse, RelayRequest};
use crate::relay::FetchTicket;
use crate::sanitize::sanitize_document;
use crate::timer::TimerKind;

use super::{Effect, LinkTarget, PaneContent, PreviewController, PreviewState};

impl PreviewController {
    /// Explicit trigger: place the panel over `link` and request its page.
    ///
    /// Accepted from every state. Whatever the panel showed before is
    /// discarded and any in-flight fetch is superseded.
    pub fn open_preview(&mut self, link: LinkTarget, now: Instant) {
        self.timers.cancel(TimerKind::HoverIntent);
        self.timers.cancel(TimerKind::FadeIn);
        self.timers.cancel(TimerKind::FadeOut);
        if let Some(hover) = self.hover.as_mut() {
            hover.armed = false;
        }
        self.overlay.hide_hint();

        let geometry = place_panel(
            link.rect,
            self.viewport,
            self.config.panel_fraction,
            self.config.clamp_margin,
        );

        self.generation += 1;
        self.session.target_url = Some(link.url.clone());
        self.session.title = link.url.clone();
        self.session.geometry = geometry;
        self.session.drag_offset = None;

        let panel = &mut self.overlay.panel;
        panel.geometry = geometry;
        panel.title = link.url.clone();
        panel.content = PaneContent::Empty;
        panel.display = true;
        panel.opacity = 0.0;

        self.overlay.hide_spinner();
        self.overlay.spinner.center = geometry.center();
        self.timers
            .schedule(TimerKind::SpinnerReveal, now, self.config.spinner_delay);

        self.set_state(PreviewState::Loading);
        log::debug!("preview #{} requested for {}", self.generation, link.url);
        self.emit(Effect::Fetch(FetchTicket {
            generation: self.generation,
            request: RelayRequest::fetch(link.url),
        }));
    }

    /// The relay answered. Returns whether the reply was rendered; replies
    /// for a superseded generation, or arriving after close, are dropped.
    pub fn fetch_resolved(
        &mut self,
        generation: u64,
        response: FetchResponse,
        now: Instant,
    ) -> bool {
        if generation != self.generation || self.session.state != PreviewState::Loading {
            log::debug!(
                "discarding fetch #{} (current #{}, {:?})",
                generation,
                self.generation,
                self.session.state
            );
            return false;
        }
        let Some(url) = self.session.target_url.clone() else {
            return false;
        };

        self.timers.cancel(TimerKind::SpinnerReveal);
        self.overlay.hide_spinner();

        let content = match response.content.filter(|c| !c.is_empty()) {
            Some(raw) => {
                let page = sanitize_document(&raw, &url);
                self.session.title = page.title.clone();
                PaneContent::Page(page)
            }
            None => {
                log::debug!("no content for {}", url);
                PaneContent::Failed
            }
        };

        let panel = &mut self.overlay.panel;
        panel.title = self.session.title.clone();
        panel.content = content;
        panel.display = true;
        panel.opacity = 0.0;
        self.timers.schedule(TimerKind::FadeIn, now, Duration::ZERO);

        self.set_state(PreviewState::Showing);
        true
    }

    pub(super) fn reveal_spinner(&mut self) {
        if self.session.state == PreviewState::Loading {
            self.overlay.spinner.visible = true;
            self.overlay.spinner.opacity = 1.0;
        }
    }

    pub(super) fn fade_in(&mut self) {
        if matches!(
            self.session.state,
            PreviewState::Showing | PreviewState::Dragging
        ) {
            self.overlay.panel.opacity = 1.0;
        }
    }

    /// Start the fade-out. A no-op unless the panel is open, so repeated
    /// calls never stack timers.
    pub fn close(&mut self, now: Instant) -> bool {
        if !self.session.state.panel_open() {
            return false;
        }
        self.timers.cancel(TimerKind::SpinnerReveal);
        self.timers.cancel(TimerKind::FadeIn);
        self.overlay.hide_spinner();
        self.overlay.panel.opacity = 0.0;
        self.session.drag_offset = None;
        self.timers
            .schedule(TimerKind::FadeOut, now, self.config.fade_duration);
        self.set_state(PreviewState::Closing);
        true
    }

    pub(super) fn finish_close(&mut self) {
        let panel = &mut self.overlay.panel;
        panel.display = false;
        panel.content = PaneContent::Empty;
        self.session.target_url = None;
        if self.session.state == PreviewState::Closing {
            self.set_state(PreviewState::Idle);
        }
    }

    /// Primary button pressed. Starts a drag on the header.
    pub fn pointer_down(&mut self, pos: Point) -> bool {
        if self.session.state != PreviewState::Showing {
            return false;
        }
        let header = self.overlay.panel.header(self.config.header_height);
        if !header.contains(pos) {
            return false;
        }
        let origin = self.overlay.panel.geometry.origin();
        self.session.drag_offset = Some(Point::new(pos.x - origin.x, pos.y - origin.y));
        self.set_state(PreviewState::Dragging);
        true
    }

    pub fn pointer_move(&mut self, pos: Point) {
        if self.session.state != PreviewState::Dragging {
            return;
        }
        let Some(offset) = self.session.drag_offset else {
            return;
        };
        let moved = self
            .overlay
            .panel
            .geometry
            .moved_to(Point::new(pos.x - offset.x, pos.y - offset.y));
        self.overlay.panel.geometry = moved;
        self.overlay.spinner.center = moved.center();
        self.session.geometry = moved;
    }

    pub fn pointer_up(&mut self) {
        if self.session.state == PreviewState::Dragging {
            self.session.drag_offset = None;
            self.set_state(PreviewState::Showing);
        }
    }

    /// A click anywhere on the page. Outside the open panel it dismisses.
    pub fn click(&mut self, pos: Point, now: Instant) -> bool {
        if self.session.state.panel_open() && !self.overlay.panel.geometry.contains(pos) {
            return self.close(now);
        }
        false
    }
}
