//! Host page rendering, overlay painting and event routing for `PreviewApp`.
//!
//! egui stands in for the page DOM: every frame the host page's links are
//! laid out, pointer and keyboard input is translated into controller
//! events, and the controller's overlay is painted on top.

use std::time::Instant;

use eframe::egui;

use linkpeek::config::{self, Key};
use linkpeek::controller::actions::PanelButton;
use linkpeek::controller::overlay::{
    BUTTONS_ID, CLOSE_BUTTON_ID, CONTENT_ID, COPY_BUTTON_ID, HEADER_ID, HINT_ID, OPEN_BUTTON_ID,
    PANEL_ID, SPINNER_ID, TITLE_ID,
};
use linkpeek::controller::overlay::Spinner;
use linkpeek::controller::PaneContent;
use linkpeek::geometry::{Point, Rect};
use linkpeek::sanitize::Block;
use linkpeek::{Effect, LinkTarget};

use super::PreviewApp;

const SPINNER_SIZE: f32 = 24.0;

fn to_rect(r: egui::Rect) -> Rect {
    Rect::new(r.min.x, r.min.y, r.width(), r.height())
}

fn map_key(key: egui::Key) -> Key {
    match key {
        egui::Key::Escape => Key::Escape,
        _ => Key::Other,
    }
}

impl PreviewApp {
    // ── Host page ────────────────────────────────────────────────────────────

    /// Render the host page and report link hover/right-click to the controller.
    pub fn draw_page(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, now: Instant) {
        let Some(ref page) = self.page else {
            ui.centered_and_justified(|ui| {
                ui.label("Enter a URL and press Enter");
            });
            return;
        };

        ui.heading(&page.title);
        ui.label(egui::RichText::new(&page.url).weak());
        ui.separator();

        let mut hovered_now: Option<LinkTarget> = None;
        let mut clicked_link: Option<String> = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            for block in &page.outline {
                match block {
                    Block::Heading { level, text } => {
                        if *level <= 2 {
                            ui.heading(text);
                        } else {
                            ui.label(egui::RichText::new(text).strong());
                        }
                    }
                    Block::Paragraph(text) => {
                        ui.label(text);
                    }
                    Block::Link { text, href } => {
                        let response = ui.link(text);
                        let target = LinkTarget::new(href.clone(), to_rect(response.rect));
                        if response.secondary_clicked() {
                            self.controller.context_menu(target.clone(), now);
                        }
                        if response.clicked() {
                            clicked_link = Some(href.clone());
                        }
                        if response.hovered() {
                            hovered_now = Some(target);
                        }
                    }
                }
            }
        });

        let previous = self.hovered.clone();
        match (previous, hovered_now) {
            (Some(_), None) => {
                self.controller.pointer_leave_link();
                self.hovered = None;
            }
            (prev, Some(target)) => {
                if prev.as_deref() != Some(target.url.as_str()) {
                    self.controller.pointer_leave_link();
                }
                self.hovered = Some(target.url.clone());
                self.controller.pointer_enter_link(target, now);
            }
            (None, None) => {}
        }

        if let Some(href) = clicked_link {
            self.url_input = href;
            self.navigate(ctx);
        }
    }

    // ── Overlay ──────────────────────────────────────────────────────────────

    /// Paint hint, panel and spinner from the controller's overlay state.
    pub fn draw_overlay(&mut self, ctx: &egui::Context, now: Instant) {
        let mut pressed: Option<PanelButton> = None;
        let mut activated: Option<String> = None;

        let overlay = self.controller.overlay();
        let header_height = self.controller.config().header_height;

        if overlay.hint.visible {
            let p = overlay.hint.position;
            egui::Area::new(egui::Id::new(HINT_ID))
                .order(egui::Order::Tooltip)
                .fixed_pos(egui::pos2(p.x, p.y))
                .interactable(false)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(&overlay.hint.text);
                    });
                });
        }

        let panel = &overlay.panel;
        let opacity = ctx.animate_value_with_time(
            egui::Id::new(PANEL_ID).with("opacity"),
            panel.opacity,
            config::FADE_DURATION.as_secs_f32(),
        );
        if panel.display {
            let g = panel.geometry;
            egui::Area::new(egui::Id::new(PANEL_ID))
                .order(egui::Order::Foreground)
                .fixed_pos(egui::pos2(g.x, g.y))
                .show(ctx, |ui| {
                    ui.set_opacity(opacity);
                    egui::Frame::window(ui.style()).show(ui, |ui| {
                        ui.set_width(g.width);
                        ui.set_height(g.height);

                        ui.push_id(HEADER_ID, |ui| {
                            ui.horizontal(|ui| {
                                ui.set_height(header_height);
                                let layout = egui::Layout::right_to_left(egui::Align::Center);
                                ui.with_layout(layout, |ui| {
                                    ui.push_id(BUTTONS_ID, |ui| {
                                        if header_button(ui, CLOSE_BUTTON_ID, panel.close_label) {
                                            pressed = Some(PanelButton::Close);
                                        }
                                        if header_button(ui, OPEN_BUTTON_ID, panel.open_label) {
                                            pressed = Some(PanelButton::Open);
                                        }
                                        if header_button(ui, COPY_BUTTON_ID, panel.copy_label) {
                                            pressed = Some(PanelButton::Copy);
                                        }
                                    });
                                    ui.push_id(TITLE_ID, |ui| {
                                        let title = egui::RichText::new(&panel.title).strong();
                                        ui.add(egui::Label::new(title).truncate());
                                    });
                                });
                            });
                        });
                        ui.separator();

                        egui::ScrollArea::vertical()
                            .id_salt(CONTENT_ID)
                            .auto_shrink([false, false])
                            .show(ui, |ui| draw_pane(ui, &panel.content, &mut activated));
                    });
                });
        }

        let spinner = &overlay.spinner;
        let spinner_opacity = ctx.animate_value_with_time(
            egui::Id::new(SPINNER_ID).with("opacity"),
            spinner_target(spinner),
            config::FADE_DURATION.as_secs_f32(),
        );
        if spinner.visible {
            let c = spinner.center;
            let half = SPINNER_SIZE * 0.5;
            egui::Area::new(egui::Id::new(SPINNER_ID))
                .order(egui::Order::Tooltip)
                .fixed_pos(egui::pos2(c.x - half, c.y - half))
                .interactable(false)
                .show(ctx, |ui| {
                    ui.set_opacity(spinner_opacity);
                    ui.add(egui::Spinner::new().size(SPINNER_SIZE));
                });
        }

        if let Some(button) = pressed {
            self.controller.press_button(button, now);
        }
        if let Some(href) = activated {
            self.controller.content_link_activated(&href);
        }
    }

    // ── Input ────────────────────────────────────────────────────────────────

    pub fn handle_keys(&mut self, ctx: &egui::Context, now: Instant) {
        let typing = ctx.wants_keyboard_input();
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::Key {
                    key, pressed: true, ..
                } => {
                    self.controller.key_down(map_key(key), now);
                }
                egui::Event::Text(text) if !typing => {
                    for c in text.chars() {
                        self.controller.key_down(Key::Char(c), now);
                    }
                }
                _ => {}
            }
        }
    }

    pub fn handle_pointer(&mut self, ctx: &egui::Context, now: Instant) {
        let (pos, pressed, released, clicked) = ctx.input(|i| {
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_clicked(),
            )
        });
        let Some(pos) = pos else {
            return;
        };
        let p = Point::new(pos.x, pos.y);
        if pressed {
            self.controller.pointer_down(p);
        }
        self.controller.pointer_move(p);
        if released {
            self.controller.pointer_up();
        }
        if clicked {
            self.controller.click(p, now);
        }
    }

    // ── Effects ──────────────────────────────────────────────────────────────

    /// Carry out what the controller queued this frame.
    pub fn apply_effects(&mut self, ctx: &egui::Context, now: Instant) {
        for effect in self.controller.take_effects() {
            match effect {
                Effect::Fetch(ticket) => match self.bridge.as_mut() {
                    Some(bridge) => bridge.submit(ticket),
                    None => self.fail_fetch(ticket.generation, now),
                },
                Effect::WriteClipboard(url) => {
                    ctx.copy_text(url);
                    self.controller.clipboard_written(true, now);
                }
                Effect::OpenInNewTab(url) => {
                    ctx.open_url(egui::OpenUrl::new_tab(url));
                }
            }
        }
    }
}

/// Opacity the spinner animates toward. It is fed every frame and rests at
/// zero while hidden, so a reveal always fades up from transparent.
fn spinner_target(spinner: &Spinner) -> f32 {
    if spinner.visible {
        spinner.opacity
    } else {
        0.0
    }
}

fn header_button(ui: &mut egui::Ui, id: &str, label: &str) -> bool {
    ui.push_id(id, |ui| ui.button(label).clicked()).inner
}

fn draw_pane(ui: &mut egui::Ui, content: &PaneContent, activated: &mut Option<String>) {
    match content {
        PaneContent::Empty => {}
        PaneContent::Failed => {
            ui.label(config::FAILURE_MESSAGE);
        }
        PaneContent::Page(page) => {
            for block in &page.outline {
                match block {
                    Block::Heading { level, text } => {
                        if *level <= 2 {
                            ui.heading(text);
                        } else {
                            ui.label(egui::RichText::new(text).strong());
                        }
                    }
                    Block::Paragraph(text) => {
                        ui.label(text);
                    }
                    Block::Link { text, href } => {
                        if ui.link(text).on_hover_text(href).clicked() {
                            *activated = Some(href.clone());
                        }
                    }
                }
            }
        }
    }
}
