use crate::QuantumApp;
use crate::ui::helpers::big_list_button;
use crate::ui::layout::message_label;
use crate::view_models::ChapterInfo;
use egui::{Align, Button, CentralPanel, Context, ProgressBar, ScrollArea};

pub fn ui_chapter_menu(app: &mut QuantumApp, ctx: &Context) {
    // Precomputar para no mantener el borrow de `app` dentro del panel
    let infos: Vec<ChapterInfo> = app.chapter_infos();
    let message = app.message.clone();
    let mut chosen = None;
    let mut back = false;

    CentralPanel::default().show(ctx, |ui| {
        let max_width = 440.0;
        let content_width = ui.available_width().min(max_width);
        let button_h = 36.0;

        ui.vertical_centered(|ui| {
            ui.set_width(content_width);
            ui.heading("Selecciona un capítulo");
            message_label(ui, &message);
            ui.add_space(12.0);

            ScrollArea::vertical().show(ui, |ui| {
                ui.with_layout(egui::Layout::top_down(Align::Center), |ui| {
                    for info in &infos {
                        let enabled = info.unlocked;
                        let clicked =
                            big_list_button(ui, info.label(), content_width, button_h, enabled);
                        if clicked {
                            chosen = Some(info.id);
                        }
                        if info.unlocked {
                            ui.add(
                                ProgressBar::new(info.ratio)
                                    .desired_width(content_width)
                                    .desired_height(6.0),
                            );
                        }
                        ui.add_space(8.0);
                    }

                    ui.add_space(16.0);
                    let back_button = Button::new("Volver al menú principal");
                    back = ui.add_sized([content_width, button_h], back_button).clicked();
                });
            });
        });
    });

    if let Some(chapter) = chosen {
        app.select_chapter(chapter);
    } else if back {
        app.go_welcome();
    }
}
