use crate::QuantumApp;
use crate::view_models::stars_text;
use egui::{Button, CentralPanel, Color32, Context, Frame, RichText, Ui, Visuals};

pub fn top_panel(app: &mut QuantumApp, ctx: &Context) {
    let summary = app.summary();
    egui::TopBottomPanel::top("menu_panel").show(ctx, |ui| {
        ui.horizontal_centered(|ui| {
            if ui.button("🏠 Inicio").clicked() {
                app.go_welcome();
            }
            if ui.button("📚 Capítulos").clicked() {
                app.leave_session();
                app.open_chapter_menu();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "⭐ {}/{}   ✔ {}/{} niveles",
                    summary.total_stars,
                    summary.max_stars,
                    summary.completed_levels,
                    summary.total_levels
                ));
            });
        });
    });
}

pub fn bottom_panel(app: &mut QuantumApp, ctx: &Context) {
    egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
        ui.horizontal(|ui| {
            // Aviso de guardado; la partida sigue aunque falle
            if let Some(warning) = app.persistence_warning() {
                ui.label(RichText::new(warning).color(Color32::YELLOW));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🌙 Modo oscuro").clicked() {
                    ctx.set_visuals(Visuals::dark());
                    app.prefs.dark_mode = true;
                }
                if ui.button("☀Modo claro").clicked() {
                    ctx.set_visuals(Visuals::light());
                    app.prefs.dark_mode = false;
                }
            });
        });
    });
}

/// Panel centrado tanto vertical como horizontalmente,
/// con un tamaño de contenido máximo y un bloque interior `inner`.
pub fn centered_panel(
    ctx: &Context,
    est_height: f32,
    max_width: f32,
    inner: impl FnOnce(&mut Ui),
) {
    CentralPanel::default().show(ctx, |ui| {
        let extra = ((ui.available_height() - est_height) / 2.0).max(0.0);
        ui.add_space(extra);
        ui.vertical_centered(|ui| {
            Frame::default()
                .fill(ui.visuals().window_fill())
                .inner_margin(egui::Margin::symmetric(16, 16))
                .show(ui, |ui| {
                    let w = ui.available_width().min(max_width);
                    ui.set_width(w);
                    inner(ui);
                });
        });
        ui.add_space(extra);
    });
}

/// Dibuja dos botones del mismo tamaño en una fila, centrados en el ancho dado.
/// Devuelve (clic izquierdo, clic derecho).
pub fn two_button_row(
    ui: &mut Ui,
    panel_width: f32,
    left_label: &str,
    right_label: &str,
) -> (bool, bool) {
    let btn_w = (panel_width - 8.0) / 2.0;
    let mut clicked_left = false;
    let mut clicked_right = false;
    ui.horizontal(|ui| {
        ui.add_space(((ui.available_width() - panel_width) / 2.0).max(0.0));
        clicked_left = ui
            .add_sized([btn_w, 36.0], Button::new(left_label))
            .clicked();
        clicked_right = ui
            .add_sized([btn_w, 36.0], Button::new(right_label))
            .clicked();
    });
    (clicked_left, clicked_right)
}

/// Mensaje destacado (bloqueos, avisos de navegación)
pub fn message_label(ui: &mut Ui, message: &str) {
    if message.is_empty() {
        return;
    }
    ui.add_space(8.0);
    ui.label(RichText::new(message).color(Color32::YELLOW).strong());
    ui.add_space(8.0);
}

pub fn stars_label(ui: &mut Ui, stars: u8) {
    ui.label(RichText::new(stars_text(stars)).heading().color(Color32::GOLD));
}
