//! Host page loading for `PreviewApp`.
//!
//! The host page goes through the same fetcher and sanitizer as previews,
//! on a background thread, and is polled with `check_fetch`.

use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;

use linkpeek::relay::fetch::{Fetcher, HttpFetcher};
use linkpeek::relay::protocol::FetchResponse;
use linkpeek::relay::FetchError;
use linkpeek::sanitize::sanitize_document;

use super::{HostPage, PreviewApp};

/// Bare host names get an `https://` prefix.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn load_host_page(url: &str) -> Result<HostPage, FetchError> {
    let fetcher = HttpFetcher::new()?;
    let raw = fetcher.fetch(url)?;
    let page = sanitize_document(&raw, url);
    Ok(HostPage {
        url: url.to_string(),
        title: page.title,
        outline: page.outline,
    })
}

impl PreviewApp {
    /// Start loading `url_input` as the new host page.
    pub fn navigate(&mut self, ctx: &egui::Context) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;
        self.url_input = normalize_url(&self.url_input);

        // A new page context: nothing of the old preview survives.
        self.hovered = None;
        self.controller.pointer_leave_link();
        self.controller.dismiss(Instant::now());

        let (tx, rx) = mpsc::channel();
        self.page_rx = Some(rx);

        let url = self.url_input.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = load_host_page(&url);
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Poll the host page channel.
    pub fn check_fetch(&mut self) {
        if let Some(rx) = &self.page_rx {
            if let Ok(result) = rx.try_recv() {
                match result {
                    Ok(page) => {
                        log::info!("loaded {} ({} blocks)", page.url, page.outline.len());
                        self.page = Some(page);
                        self.error = None;
                    }
                    Err(e) => {
                        self.error = Some(e.to_string());
                        self.page = None;
                    }
                }
                self.loading = false;
                self.page_rx = None;
            }
        }
    }

    /// Feed relay replies to the controller.
    pub fn poll_relay(&mut self, now: Instant) {
        let Some(bridge) = self.bridge.as_mut() else {
            return;
        };
        for (generation, response) in bridge.poll() {
            self.controller.fetch_resolved(generation, response, now);
        }
    }

    /// Used when there is no relay: every preview fails immediately.
    pub(crate) fn fail_fetch(&mut self, generation: u64, now: Instant) {
        self.controller
            .fetch_resolved(generation, FetchResponse::failed(), now);
    }
}
