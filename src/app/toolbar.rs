//! Address bar for `PreviewApp`.

use eframe::egui;

use super::PreviewApp;

impl PreviewApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            let response = ui.add_sized(
                [ui.available_width() - 160.0, 24.0],
                egui::TextEdit::singleline(&mut self.url_input)
                    .hint_text("Enter URL...")
                    .font(egui::TextStyle::Monospace),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.navigate(ctx);
            }

            if ui.button("Go").clicked() {
                self.navigate(ctx);
            }

            let previews = self.bridge.as_ref().map_or(0, |b| b.in_flight());
            if self.loading || previews > 0 {
                ui.spinner();
            }
        });

        if let Some(ref err) = self.error {
            ui.colored_label(egui::Color32::from_rgb(255, 80, 80), err);
        }
    }
}
