//! Hover intent and the shortcut hint.

use std::time::Instant;

use crate::config::HINT_SIZE;
use crate::geometry::{place_hint, Size};
use crate::timer::TimerKind;

use super::{HoverIntent, LinkTarget, PreviewController, PreviewState};

impl PreviewController {
    /// Pointer entered a link. Arms the hover-intent timer.
    pub fn pointer_enter_link(&mut self, link: LinkTarget, now: Instant) {
        if let Some(hover) = self.hover.as_mut() {
            if hover.candidate.url == link.url {
                hover.candidate.rect = link.rect;
                return;
            }
        }

        self.timers
            .schedule(TimerKind::HoverIntent, now, self.config.hover_delay);
        self.hover = Some(HoverIntent {
            candidate: link,
            armed: true,
        });

        if matches!(
            self.session.state,
            PreviewState::Idle | PreviewState::Armed | PreviewState::Notifying
        ) {
            self.overlay.hide_hint();
            self.set_state(PreviewState::Armed);
        }
    }

    /// Pointer left the hovered link. A pending hover never fires.
    pub fn pointer_leave_link(&mut self) {
        self.timers.cancel(TimerKind::HoverIntent);
        self.hover = None;
        if matches!(
            self.session.state,
            PreviewState::Armed | PreviewState::Notifying
        ) {
            self.overlay.hide_hint();
            self.set_state(PreviewState::Idle);
        }
    }

    pub(super) fn hover_intent_fired(&mut self, now: Instant) {
        let Some(hover) = self.hover.as_mut() else {
            return;
        };
        hover.armed = false;
        let candidate = hover.candidate.clone();

        match self.session.state {
            PreviewState::Armed | PreviewState::Idle | PreviewState::Closing => {
                self.show_hint(&candidate);
                self.set_state(PreviewState::Notifying);
            }
            PreviewState::Loading | PreviewState::Showing => {
                if self.session.target_url.as_deref() != Some(candidate.url.as_str()) {
                    self.open_preview(candidate, now);
                }
            }
            PreviewState::Notifying | PreviewState::Dragging => {}
        }
    }

    fn show_hint(&mut self, link: &LinkTarget) {
        let (w, h) = HINT_SIZE;
        self.overlay.hint.position = place_hint(
            link.rect,
            Size::new(w, h),
            self.viewport,
            self.config.hint_offset,
            self.config.clamp_margin,
        );
        self.overlay.hint.visible = true;
    }
}
