//! `PreviewApp` — the egui host page for the preview overlay.
//!
//! This module declares the `PreviewApp` struct and its frame loop.
//! The methods are split across the sibling sub-modules:
//!
//! - `navigation` — loading the host page in the background
//! - `toolbar`    — address bar
//! - `content`    — host page links, overlay painting, input and effects

pub mod content;
pub mod navigation;
pub mod toolbar;

use std::sync::{mpsc, Arc};
use std::time::Instant;

use eframe::egui;

use linkpeek::config::PreviewConfig;
use linkpeek::geometry::Size;
use linkpeek::relay::{FetchError, FetchRelay, RelayBridge};
use linkpeek::sanitize::Block;
use linkpeek::PreviewController;

/// The page the user is browsing, reduced to its outline.
pub struct HostPage {
    pub url: String,
    pub title: String,
    pub outline: Vec<Block>,
}

// ─── Application state ───────────────────────────────────────────────────────

pub struct PreviewApp {
    pub url_input: String,
    pub page: Option<HostPage>,
    pub error: Option<String>,
    pub loading: bool,
    pub page_rx: Option<mpsc::Receiver<Result<HostPage, FetchError>>>,
    pub controller: PreviewController,
    /// `None` when no HTTP client could be built; previews then fail fast.
    pub bridge: Option<RelayBridge>,
    /// URL of the link under the pointer last frame.
    pub hovered: Option<String>,
}

impl PreviewApp {
    pub fn new(cc: &eframe::CreationContext<'_>, start_url: String) -> Self {
        let ctx = cc.egui_ctx.clone();
        let bridge = match FetchRelay::http() {
            Ok(relay) => Some(
                RelayBridge::new(relay).with_waker(Arc::new(move || ctx.request_repaint())),
            ),
            Err(e) => {
                log::error!("preview relay unavailable: {}", e);
                None
            }
        };

        let screen = cc.egui_ctx.screen_rect();
        let mut app = Self {
            url_input: start_url,
            page: None,
            error: None,
            loading: false,
            page_rx: None,
            controller: PreviewController::initialize(
                PreviewConfig::default(),
                Size::new(screen.width(), screen.height()),
            ),
            bridge,
            hovered: None,
        };
        app.navigate(&cc.egui_ctx);
        app
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.check_fetch();
        self.poll_relay(now);

        let screen = ctx.screen_rect();
        self.controller
            .resize(Size::new(screen.width(), screen.height()));
        self.controller.tick(now);

        self.handle_keys(ctx, now);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, ctx);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_page(ui, ctx, now);
        });

        self.draw_overlay(ctx, now);
        self.handle_pointer(ctx, now);
        self.apply_effects(ctx, now);

        if let Some(deadline) = self.controller.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}
