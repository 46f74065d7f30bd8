use crate::QuantumApp;
use crate::ui::layout::{centered_panel, message_label};
use egui::{Align, Button, Context, ProgressBar};

pub fn ui_welcome(app: &mut QuantumApp, ctx: &Context) {
    let summary = app.summary();
    let has_progress = app.has_progress();
    let message = app.message.clone();

    centered_panel(ctx, 260.0, 540.0, |ui| {
        ui.with_layout(egui::Layout::top_down(Align::Center), |ui| {
            ui.heading("⚛ Quantum Quest");
            ui.label("Aprende computación cuántica nivel a nivel con el profesor Qubit.");
            ui.add_space(18.0);

            if has_progress {
                ui.add(
                    ProgressBar::new(summary.percent() as f32 / 100.0)
                        .text(format!(
                            "{} % · {} capítulos completados",
                            summary.percent(),
                            summary.completed_chapters
                        )),
                );
                ui.add_space(12.0);
            }

            let btn_w = (ui.available_width() * 0.9).clamp(120.0, 400.0);
            let btn_h = 40.0;

            let label = if has_progress {
                "▶ Continuar donde lo dejé"
            } else {
                "🚀 Empezar la aventura"
            };
            if ui.add_sized([btn_w, btn_h], Button::new(label)).clicked() {
                app.continue_game();
            }
            ui.add_space(5.0);
            if ui
                .add_sized([btn_w, btn_h], Button::new("📚 Seleccionar capítulo"))
                .clicked()
            {
                app.open_chapter_menu();
            }

            message_label(ui, &message);
        });
    });
}
