use crate::QuantumApp;
use crate::ui::helpers::big_list_button;
use crate::ui::layout::message_label;
use crate::view_models::LevelInfo;
use egui::{Align, Button, CentralPanel, Context, ScrollArea};

pub fn ui_level_menu(app: &mut QuantumApp, ctx: &Context) {
    let Some(chapter) = app.current_chapter.and_then(|c| app.catalog.chapter(c)).cloned() else {
        app.open_chapter_menu();
        return;
    };
    let infos: Vec<LevelInfo> = app.level_infos_in_current_chapter().unwrap_or_default();
    let message = app.message.clone();
    let mut chosen = None;
    let mut back = false;

    CentralPanel::default().show(ctx, |ui| {
        let max_width = 440.0;
        let content_width = ui.available_width().min(max_width);
        let button_h = 36.0;

        ui.vertical_centered(|ui| {
            ui.set_width(content_width);
            ui.heading(format!("Capítulo {}: {}", chapter.id, chapter.title));
            ui.label(&chapter.description);
            message_label(ui, &message);
            ui.add_space(12.0);

            ScrollArea::vertical().show(ui, |ui| {
                ui.with_layout(egui::Layout::top_down(Align::Center), |ui| {
                    for info in &infos {
                        let enabled = info.playable;
                        let clicked =
                            big_list_button(ui, info.label(), content_width, button_h, enabled);
                        if clicked {
                            chosen = Some(info.id);
                        }
                        ui.add_space(8.0);
                    }

                    ui.add_space(16.0);
                    back = ui
                        .add_sized([content_width, button_h], Button::new("Volver a capítulos"))
                        .clicked();
                });
            });
        });
    });

    if let Some(level) = chosen {
        app.start_level(level);
    } else if back {
        app.open_chapter_menu();
    }
}
