mod app;

use eframe::egui;

use app::PreviewApp;

const DEFAULT_URL: &str = "https://example.com";

fn main() -> eframe::Result<()> {
    env_logger::init();

    let start_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "linkpeek",
        options,
        Box::new(move |cc| Ok(Box::new(PreviewApp::new(cc, start_url)))),
    )
}
