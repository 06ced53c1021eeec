//! Keyboard shortcuts, context menu and the header buttons.

use std::time::Instant;

use crate::config::{self, Key};
use crate::timer::TimerKind;

use super::{Effect, LinkTarget, PreviewController, PreviewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelButton {
    Copy,
    Open,
    Close,
}

impl PreviewController {
    /// Right-click on a link previews it. Hosts never show their native
    /// menu for a link right-click.
    pub fn context_menu(&mut self, link: LinkTarget, now: Instant) {
        self.open_preview(link, now);
    }

    /// Returns whether the key was consumed.
    pub fn key_down(&mut self, key: Key, now: Instant) -> bool {
        let keys = self.config.keys;
        if key.matches(keys.dismiss) {
            return self.dismiss(now);
        }
        if key.matches(keys.preview) {
            let Some(candidate) = self.hover.as_ref().map(|h| h.candidate.clone()) else {
                return false;
            };
            self.open_preview(candidate, now);
            return true;
        }
        if !self.session.state.panel_open() {
            return false;
        }
        if key.matches(keys.copy) {
            self.copy_link();
            return true;
        }
        if key.matches(keys.open) {
            self.open_in_new_tab();
            return true;
        }
        false
    }

    /// Hide whatever is showing: the panel, or failing that the hint.
    pub fn dismiss(&mut self, now: Instant) -> bool {
        match self.session.state {
            PreviewState::Armed | PreviewState::Notifying => {
                self.timers.cancel(TimerKind::HoverIntent);
                if let Some(hover) = self.hover.as_mut() {
                    hover.armed = false;
                }
                self.overlay.hide_hint();
                self.set_state(PreviewState::Idle);
                true
            }
            _ => self.close(now),
        }
    }

    pub fn press_button(&mut self, button: PanelButton, now: Instant) {
        match button {
            PanelButton::Copy => self.copy_link(),
            PanelButton::Open => self.open_in_new_tab(),
            PanelButton::Close => {
                self.close(now);
            }
        }
    }

    /// Queue a clipboard write of the previewed URL. Without a target
    /// nothing is queued.
    pub fn copy_link(&mut self) {
        if let Some(url) = self.session.target_url.clone() {
            self.emit(Effect::WriteClipboard(url));
        }
    }

    pub fn open_in_new_tab(&mut self) {
        if let Some(url) = self.session.target_url.clone() {
            self.emit(Effect::OpenInNewTab(url));
        }
    }

    /// Host reports the outcome of a clipboard write. Only success
    /// relabels the button.
    pub fn clipboard_written(&mut self, ok: bool, now: Instant) {
        if !ok {
            log::debug!("clipboard write failed");
            return;
        }
        self.overlay.panel.copy_label = config::COPIED_LABEL;
        self.timers
            .schedule(TimerKind::CopyRevert, now, self.config.copy_label_revert);
    }

    pub(super) fn revert_copy_label(&mut self) {
        self.overlay.panel.copy_label = config::COPY_LABEL;
    }

    /// A link inside the rendered preview was activated. It opens in a new
    /// browsing context; the preview itself never navigates.
    pub fn content_link_activated(&mut self, href: &str) {
        if self.session.state.panel_open() {
            self.emit(Effect::OpenInNewTab(href.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::*;
    use super::*;

    fn showing(c: &mut PreviewController, url: &str, now: Instant) {
        c.open_preview(link(url), now);
        let (g, _) = fetches(&c.take_effects()).remove(0);
        c.fetch_resolved(g, page("P"), now);
    }

    #[test]
    fn copy_without_target_is_noop() {
        let mut c = controller();
        c.copy_link();
        c.press_button(PanelButton::Copy, Instant::now());
        assert!(c.take_effects().is_empty());
    }

    #[test]
    fn copy_writes_url_and_relabels_temporarily() {
        let t0 = Instant::now();
        let mut c = controller();
        showing(&mut c, "https://a.test/", t0);
        c.press_button(PanelButton::Copy, t0);
        assert_eq!(
            c.take_effects(),
            vec![Effect::WriteClipboard("https://a.test/".into())]
        );
        c.clipboard_written(true, t0);
        assert_eq!(c.overlay().panel.copy_label, config::COPIED_LABEL);
        assert_eq!(c.state(), PreviewState::Showing);
        c.tick(t0 + ms(2000));
        assert_eq!(c.overlay().panel.copy_label, config::COPY_LABEL);
    }

    #[test]
    fn failed_copy_keeps_label() {
        let t0 = Instant::now();
        let mut c = controller();
        showing(&mut c, "https://a.test/", t0);
        c.copy_link();
        c.clipboard_written(false, t0);
        assert_eq!(c.overlay().panel.copy_label, config::COPY_LABEL);
        assert_eq!(c.state(), PreviewState::Showing);
    }

    #[test]
    fn open_key_only_while_visible() {
        let t0 = Instant::now();
        let mut c = controller();
        assert!(!c.key_down(Key::Char('o'), t0));
        assert!(c.take_effects().is_empty());

        showing(&mut c, "https://a.test/", t0);
        assert!(c.key_down(Key::Char('O'), t0));
        assert_eq!(
            c.take_effects(),
            vec![Effect::OpenInNewTab("https://a.test/".into())]
        );
        assert_eq!(c.state(), PreviewState::Showing);
    }

    #[test]
    fn copy_key_ignored_when_hidden() {
        let t0 = Instant::now();
        let mut c = controller();
        assert!(!c.key_down(Key::Char('c'), t0));
        assert!(c.take_effects().is_empty());
    }

    #[test]
    fn preview_key_needs_hovered_link() {
        let t0 = Instant::now();
        let mut c = controller();
        assert!(!c.key_down(Key::Char('p'), t0));
        c.pointer_enter_link(link("https://a.test/"), t0);
        assert!(c.key_down(Key::Char('p'), t0 + ms(100)));
        assert_eq!(c.state(), PreviewState::Loading);
        // The pending hover-intent was superseded by the explicit trigger.
        c.tick(t0 + ms(1000));
        assert!(!c.overlay().hint.visible);
    }

    #[test]
    fn right_click_loads_preview() {
        let t0 = Instant::now();
        let mut c = controller();
        c.context_menu(link("https://a.test/"), t0);
        assert_eq!(c.state(), PreviewState::Loading);
        assert_eq!(fetches(&c.take_effects()), vec![(1, "https://a.test/".into())]);
    }

    #[test]
    fn escape_dismisses_hint() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_enter_link(link("https://a.test/"), t0);
        c.tick(t0 + ms(500));
        assert!(c.key_down(Key::Escape, t0 + ms(600)));
        assert_eq!(c.state(), PreviewState::Idle);
        assert!(!c.overlay().hint.visible);
        assert!(!c.key_down(Key::Escape, t0 + ms(700)));
    }

    #[test]
    fn escape_cancels_armed_hover() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_enter_link(link("https://a.test/"), t0);
        c.key_down(Key::Escape, t0 + ms(100));
        c.tick(t0 + ms(1000));
        assert_eq!(c.state(), PreviewState::Idle);
        assert!(!c.overlay().hint.visible);
    }

    #[test]
    fn content_links_open_in_new_tab() {
        let t0 = Instant::now();
        let mut c = controller();
        c.content_link_activated("https://elsewhere.test/");
        assert!(c.take_effects().is_empty());
        showing(&mut c, "https://a.test/", t0);
        c.content_link_activated("https://a.test/y");
        assert_eq!(
            c.take_effects(),
            vec![Effect::OpenInNewTab("https://a.test/y".into())]
        );
        assert_eq!(c.session().target_url.as_deref(), Some("https://a.test/"));
    }

    #[test]
    fn close_button_closes() {
        let t0 = Instant::now();
        let mut c = controller();
        showing(&mut c, "https://a.test/", t0);
        c.press_button(PanelButton::Close, t0);
        assert_eq!(c.state(), PreviewState::Closing);
    }
}
