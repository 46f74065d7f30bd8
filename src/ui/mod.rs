mod helpers;
pub mod layout;
pub mod views;

use crate::app::QuantumApp;
use crate::model::AppState;
use crate::session::Phase;
use eframe::{APP_KEY, App, Frame, set_value};
use egui::Context;
use layout::{bottom_panel, top_panel};
use std::time::Duration;

impl App for QuantumApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        // Resultado de la carga en segundo plano, si ya llegó
        self.poll_content();
        drive_clock(self, ctx);

        if !matches!(self.state, AppState::Welcome) {
            top_panel(self, ctx);
        }
        bottom_panel(self, ctx);

        match self.state {
            AppState::Welcome => views::welcome::ui_welcome(self, ctx),
            AppState::ChapterMenu => views::chapter_menu::ui_chapter_menu(self, ctx),
            AppState::LevelMenu => views::level_menu::ui_level_menu(self, ctx),
            AppState::Session => ui_session(self, ctx),
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        set_value(storage, APP_KEY, &self.prefs);
    }
}

/// Contrarreloj con el reloj de pared de egui (`input.time`); sin eventos
/// los frames llegan cada ~100 ms.
fn drive_clock(app: &mut QuantumApp, ctx: &Context) {
    let now = ctx.input(|i| i.time);
    let ticking = app.advance_clock(now);
    if ticking || app.pending.is_some() {
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

/// Dispatch por fase del nivel en curso
fn ui_session(app: &mut QuantumApp, ctx: &Context) {
    let view: fn(&mut QuantumApp, &Context) = match app.session.as_ref().map(|s| s.phase()) {
        None => {
            app.open_level_menu();
            return;
        }
        Some(Phase::Intro) => views::level_intro::ui_level_intro,
        Some(Phase::Story { .. }) => views::level_intro::ui_story,
        Some(Phase::Loading { .. }) => views::challenge::ui_loading,
        Some(Phase::LoadFailed { .. }) => views::challenge::ui_load_failed,
        Some(Phase::Challenge(_)) => views::challenge::ui_challenge,
        Some(Phase::Complete(_)) => views::completion::ui_completion,
    };
    view(app, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{test_app, wait_for_content};
    use crate::content::testing::quiz;
    use egui::RawInput;

    #[test]
    fn timed_challenge_ends_on_wall_clock() {
        let (mut app, _) = test_app(vec![Ok(quiz(3))]);
        for level in 1..=9 {
            app.store.record_completion(level, 1).unwrap();
        }
        app.config.timer_secs = 1;
        assert!(app.start_level(10));
        app.begin_story();
        while app.next_story_page() {}
        assert!(app.request_challenge());
        wait_for_content(&mut app);

        // 20 frames separados 100 ms, sin eventos de entrada
        let ctx = Context::default();
        for frame in 0..=20 {
            let input = RawInput {
                time: Some(f64::from(frame) * 0.1),
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| drive_clock(&mut app, ctx));
        }

        let session = app.session.as_ref().unwrap();
        assert!(session.outcome().is_some());
        assert_eq!(app.last_completion.as_ref().unwrap().outcome.level_id, 10);
    }
}
