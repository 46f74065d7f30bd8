use crate::QuantumApp;
use crate::session::{ChallengeMode, Phase};
use crate::ui::layout::{centered_panel, two_button_row};
use crate::view_models::stars_text;
use egui::{Context, RichText, ScrollArea};

enum IntroAction {
    Back,
    Start,
}

pub fn ui_level_intro(app: &mut QuantumApp, ctx: &Context) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let Some(level) = app.catalog.level(session.level_id()).cloned() else {
        return;
    };
    let mode = session.mode();
    let best = app.store.record().stars_for(level.id);
    let mut action = None;

    centered_panel(ctx, 320.0, 650.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading(format!("Nivel {}: {}", level.id, level.title));
            ui.label(RichText::new(level.difficulty.label()).italics());
            ui.add_space(10.0);
        });
        ui.label(RichText::new(format!("Concepto: {}", level.concept)).strong());
        ui.add_space(6.0);
        ui.label(&level.description);

        if let ChallengeMode::Timed { start_secs } = mode {
            ui.add_space(8.0);
            ui.label(format!(
                "⏱ Reto contrarreloj: {start_secs} s. \
                 Cada acierto suma tiempo y cada fallo lo resta."
            ));
        }
        if let Some(stars) = best {
            ui.add_space(8.0);
            ui.label(format!("Mejor resultado: {}", stars_text(stars)));
        }

        ui.add_space(16.0);
        let width = ui.available_width();
        let (back, start) = two_button_row(ui, width, "⬅ Volver a niveles", "Comenzar historia ▶");
        if back {
            action = Some(IntroAction::Back);
        } else if start {
            action = Some(IntroAction::Start);
        }
    });

    match action {
        Some(IntroAction::Back) => app.leave_session(),
        Some(IntroAction::Start) => app.begin_story(),
        None => {}
    }
}

enum StoryAction {
    Previous,
    Next,
    Challenge,
}

pub fn ui_story(app: &mut QuantumApp, ctx: &Context) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let Phase::Story { page } = *session.phase() else {
        return;
    };
    let text = session.page_text().unwrap_or_default().to_owned();
    let pages = session.page_count();
    let last = session.is_last_page();
    let title = app
        .catalog
        .level(session.level_id())
        .map(|l| l.title.clone())
        .unwrap_or_default();
    let mut action = None;

    centered_panel(ctx, 360.0, 650.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading(&title);
            ui.label(format!("Página {} de {}", page + 1, pages));
        });
        ui.add_space(10.0);
        ScrollArea::vertical()
            .max_height(240.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.label(RichText::new(&text).size(16.0));
            });
        ui.add_space(12.0);

        let width = ui.available_width();
        let right = if last { "¡Al reto! ⚡" } else { "Siguiente ▶" };
        let (prev, next) = two_button_row(ui, width, "⬅ Atrás", right);
        if prev {
            action = Some(StoryAction::Previous);
        } else if next {
            action = Some(if last {
                StoryAction::Challenge
            } else {
                StoryAction::Next
            });
        }
    });

    match action {
        Some(StoryAction::Previous) => {
            app.previous_story_page();
        }
        Some(StoryAction::Next) => {
            app.next_story_page();
        }
        Some(StoryAction::Challenge) => {
            app.request_challenge();
        }
        None => {}
    }
}
