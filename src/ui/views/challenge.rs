use crate::QuantumApp;
use crate::session::Phase;
use crate::ui::helpers::option_button;
use crate::ui::layout::{centered_panel, two_button_row};
use egui::{Button, Color32, Context, RichText, ScrollArea};

pub fn ui_loading(app: &mut QuantumApp, ctx: &Context) {
    let attempt = match app.session.as_ref().map(|s| s.phase()) {
        Some(Phase::Loading { attempt }) => *attempt,
        _ => return,
    };
    let mut cancel = false;

    centered_panel(ctx, 160.0, 420.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("Preparando el reto…");
            ui.add_space(12.0);
            ui.spinner();
            if attempt > 1 {
                ui.label(format!("Intento {attempt}"));
            }
            ui.add_space(12.0);
            cancel = ui.add_sized([200.0, 32.0], Button::new("Cancelar")).clicked();
        });
    });

    if cancel {
        app.back_to_intro();
    }
}

pub fn ui_load_failed(app: &mut QuantumApp, ctx: &Context) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let Phase::LoadFailed {
        message,
        retries_left,
    } = session.phase().clone()
    else {
        return;
    };
    let can_retry = session.can_retry();
    let mut retry = false;
    let mut exit = false;

    centered_panel(ctx, 220.0, 520.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("⚠ No se pudo cargar el reto");
            ui.add_space(8.0);
            ui.label(RichText::new(&message).color(Color32::LIGHT_RED));
            ui.add_space(12.0);

            let width = ui.available_width();
            if can_retry {
                let label = format!("⟲ Reintentar ({retries_left})");
                (retry, exit) = two_button_row(ui, width, &label, "Volver al inicio del nivel");
            } else {
                ui.label("No quedan reintentos.");
                exit = ui
                    .add_sized([width / 2.0, 36.0], Button::new("Volver al inicio del nivel"))
                    .clicked();
            }
        });
    });

    if retry {
        app.retry_challenge();
    } else if exit {
        app.back_to_intro();
    }
}

enum ChallengeAction {
    Select(usize),
    Submit,
    Advance,
    Leave,
}

pub fn ui_challenge(app: &mut QuantumApp, ctx: &Context) {
    let Some(challenge) = app.session.as_ref().and_then(|s| s.challenge()) else {
        return;
    };
    let Some(question) = challenge.current().cloned() else {
        return;
    };
    let position = challenge.position();
    let total = challenge.total_questions();
    let selected = challenge.selected();
    let feedback = challenge.feedback().cloned();
    let remaining = challenge.remaining_secs();
    let score = challenge.score();
    let last = challenge.is_last_question();
    let mut action = None;

    centered_panel(ctx, 420.0, 650.0, |ui| {
        ui.horizontal(|ui| {
            ui.heading(format!("Pregunta {} de {}", position + 1, total));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("Puntos: {score}"));
                if let Some(secs) = remaining {
                    let color = if secs <= 10 {
                        Color32::LIGHT_RED
                    } else {
                        ui.visuals().text_color()
                    };
                    ui.label(RichText::new(format!("⏱ {secs} s")).color(color).strong());
                }
            });
        });
        ui.add_space(10.0);

        ScrollArea::vertical()
            .max_height(120.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.label(RichText::new(&question.question).size(16.0));
            });
        ui.add_space(10.0);

        let width = ui.available_width();
        let answered = feedback.is_some();
        for (i, option) in question.options.iter().enumerate() {
            let verdict = feedback.as_ref().and_then(|f| {
                if i == question.correct_index {
                    Some(true)
                } else if i == f.selected {
                    Some(false)
                } else {
                    None
                }
            });
            if option_button(ui, option, width, selected == Some(i), answered, verdict) {
                action = Some(ChallengeAction::Select(i));
            }
            ui.add_space(4.0);
        }
        ui.add_space(10.0);

        if let Some(f) = &feedback {
            let (text, color) = if f.correct {
                ("✅ ¡Correcto!".to_owned(), Color32::LIGHT_GREEN)
            } else {
                (format!("❌ La respuesta era: {}", f.correct_option), Color32::LIGHT_RED)
            };
            ui.label(RichText::new(text).color(color).strong());
            if !f.explanation.is_empty() {
                ui.label(&f.explanation);
            }
            ui.add_space(8.0);
        }

        let right = match (&feedback, last) {
            (None, _) => "Responder",
            (Some(_), false) => "Siguiente ▶",
            (Some(_), true) => "Ver resultado",
        };
        let (leave, go) = two_button_row(ui, width, "⬅ Salir al inicio del nivel", right);
        if leave {
            action = Some(ChallengeAction::Leave);
        } else if go {
            if feedback.is_some() {
                action = Some(ChallengeAction::Advance);
            } else if selected.is_some() {
                action = Some(ChallengeAction::Submit);
            }
        }
    });

    match action {
        Some(ChallengeAction::Select(i)) => app.select_option(i),
        Some(ChallengeAction::Submit) => app.submit_answer(),
        Some(ChallengeAction::Advance) => app.advance_question(),
        Some(ChallengeAction::Leave) => app.back_to_intro(),
        None => {}
    }
}
