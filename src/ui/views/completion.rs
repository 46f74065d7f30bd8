use crate::QuantumApp;
use crate::unlock::NextStep;
use crate::ui::layout::{centered_panel, stars_label, two_button_row};
use egui::{Color32, Context, RichText};

pub fn ui_completion(app: &mut QuantumApp, ctx: &Context) {
    let Some(report) = app.last_completion.clone() else {
        // Registro fallido: el mensaje ya explica el motivo
        if app.session.as_ref().and_then(|s| s.outcome()).is_some() {
            centered_panel(ctx, 120.0, 420.0, |ui| {
                ui.label(&app.message);
            });
        }
        return;
    };
    let outcome = report.outcome;
    let chapter_titles: Vec<String> = report
        .unlocked_chapters
        .iter()
        .filter_map(|&id| app.catalog.chapter(id))
        .map(|c| format!("Capítulo {}: {}", c.id, c.title))
        .collect();
    let mut follow = false;
    let mut to_menu = false;

    centered_panel(ctx, 320.0, 520.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading(format!("🎉 Nivel {} completado", outcome.level_id));
            ui.add_space(8.0);
            stars_label(ui, outcome.stars);
            ui.label(format!(
                "{} de {} respuestas correctas · {} puntos",
                outcome.correct_answers, outcome.total_questions, outcome.score
            ));

            if report.update.star_delta > 0 && !report.update.first_completion {
                ui.label(RichText::new("¡Nuevo récord de estrellas!").color(Color32::GOLD));
            } else if !report.update.first_completion && report.update.star_delta == 0 {
                ui.label(format!(
                    "Tu mejor marca sigue siendo {} estrellas.",
                    report.update.stars
                ));
            }
            if !report.update.persisted {
                ui.label(
                    RichText::new("⚠ No se pudo guardar este resultado.").color(Color32::YELLOW),
                );
            }

            for title in &chapter_titles {
                ui.add_space(6.0);
                ui.label(
                    RichText::new(format!("🔓 ¡Desbloqueado! {title}"))
                        .color(Color32::LIGHT_GREEN)
                        .strong(),
                );
            }
            ui.add_space(16.0);

            let next_label = match report.next {
                NextStep::NextLevel(id) => format!("Nivel {id} ▶"),
                NextStep::NextChapter(id) => format!("Capítulo {id} ▶"),
                NextStep::ChapterLocked(_) => "Ver capítulos".to_owned(),
                NextStep::BackToChapter(_) => "Volver al capítulo".to_owned(),
                NextStep::GameComplete => "🏆 Terminar".to_owned(),
            };
            let width = ui.available_width();
            (to_menu, follow) = two_button_row(ui, width, "⬅ Menú de niveles", &next_label);
        });
    });

    if follow {
        app.follow_next_step();
    } else if to_menu {
        app.last_completion = None;
        app.leave_session();
    }
}
