use super::*;
use crate::content::QuizRequest;
use crate::session::ChallengeMode;
use std::time::Duration;

impl QuantumApp {
    pub fn begin_story(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.begin_story();
        }
    }

    pub fn next_story_page(&mut self) -> bool {
        self.session.as_mut().is_some_and(|s| s.next_page())
    }

    pub fn previous_story_page(&mut self) -> bool {
        self.session.as_mut().is_some_and(|s| s.previous_page())
    }

    /// Historia → reto: lanza la carga del cuestionario en segundo plano
    pub fn request_challenge(&mut self) -> bool {
        let started = self.session.as_mut().is_some_and(|s| s.start_loading());
        if started {
            self.spawn_content_load();
        }
        started
    }

    pub fn retry_challenge(&mut self) -> bool {
        let started = self.session.as_mut().is_some_and(|s| s.retry_load());
        if started {
            self.spawn_content_load();
        }
        started
    }

    fn spawn_content_load(&mut self) {
        let Some(level_id) = self.session.as_ref().map(|s| s.level_id()) else {
            return;
        };
        let Some(level) = self.catalog.level(level_id) else {
            return;
        };
        let request = QuizRequest::for_level(level, self.config.questions_per_level);
        self.pending = Some(PendingQuiz::spawn(
            Arc::clone(&self.generator),
            level_id,
            request,
            self.config.retry_policy(),
        ));
    }

    /// Soltar el handle corta los reintentos que queden
    pub(crate) fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!("Carga del nivel {} cancelada", pending.level_id());
        }
    }

    /// Se llama en cada frame; no bloquea
    pub fn poll_content(&mut self) {
        let Some(result) = self.pending.as_ref().and_then(|p| p.poll()) else {
            return;
        };
        let pending_level = self.pending.take().map(|p| p.level_id());
        if let Some(session) = self.session.as_mut() {
            if Some(session.level_id()) == pending_level {
                session.content_loaded(result);
            }
        }
    }

    /// Salida del reto (o de la carga) a la intro del nivel
    pub fn back_to_intro(&mut self) {
        self.cancel_pending();
        if let Some(session) = self.session.as_mut() {
            session.back_to_intro();
        }
    }

    pub fn select_option(&mut self, option: usize) {
        if let Some(session) = self.session.as_mut() {
            session.select(option);
        }
    }

    pub fn submit_answer(&mut self) {
        let finished = self.session.as_mut().and_then(|s| {
            s.submit();
            s.outcome()
        });
        if let Some(outcome) = finished {
            self.finish_level(outcome);
        }
    }

    pub fn advance_question(&mut self) {
        if let Some(outcome) = self.session.as_mut().and_then(|s| s.advance()) {
            self.finish_level(outcome);
        }
    }

    /// Descuenta del contrarreloj el tiempo real desde el frame anterior.
    /// `now` es el reloj de la interfaz en segundos. Devuelve si el reloj corre.
    pub fn advance_clock(&mut self, now: f64) -> bool {
        let running = self.session.as_ref().is_some_and(|s| {
            s.challenge().is_some() && matches!(s.mode(), ChallengeMode::Timed { .. })
        });
        if !running {
            self.last_clock = None;
            return false;
        }
        if let Some(last) = self.last_clock.replace(now) {
            self.tick_session(Duration::from_secs_f64((now - last).max(0.0)));
        }
        true
    }

    pub fn tick_session(&mut self, elapsed: Duration) {
        if let Some(outcome) = self.session.as_mut().and_then(|s| s.tick(elapsed)) {
            self.finish_level(outcome);
        }
    }

    /// Entrega el resultado al almacén de progreso y calcula el siguiente paso
    fn finish_level(&mut self, outcome: SessionOutcome) {
        if self.last_completion.is_some() {
            return;
        }
        let before = self.store.snapshot();
        let stars = u32::from(outcome.stars);
        let update = match self.store.record_completion(outcome.level_id, stars) {
            Ok(update) => update,
            Err(e) => {
                log::error!("No se pudo registrar el nivel: {e}");
                self.message = format!("Error interno: {e}");
                return;
            }
        };

        let after = self.store.record();
        let unlocked_chapters = self
            .policy
            .newly_unlocked_chapters(&self.catalog, &before, after);
        for chapter in &unlocked_chapters {
            log::info!("Capítulo {chapter} desbloqueado");
        }
        let next = self.policy.next_step(&self.catalog, after, outcome.level_id);

        self.last_completion = Some(CompletionReport {
            outcome,
            update,
            next,
            unlocked_chapters,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::app::tests::{test_app, wait_for_content};
    use crate::content::testing::quiz;
    use crate::unlock::NextStep;

    fn play(app: &mut crate::app::QuantumApp, level: u32, options: &[usize]) {
        assert!(app.start_level(level));
        app.begin_story();
        while app.next_story_page() {}
        assert!(app.request_challenge());
        wait_for_content(app);
        for &option in options {
            app.select_option(option);
            app.submit_answer();
            app.advance_question();
        }
    }

    #[test]
    fn worse_replay_reports_zero_delta() {
        let (mut app, _) = test_app(vec![Ok(quiz(3)), Ok(quiz(3))]);
        play(&mut app, 1, &[0, 1, 2]);
        assert_eq!(app.last_completion.as_ref().unwrap().update.stars, 3);

        play(&mut app, 1, &[1, 0, 0]);
        let report = app.last_completion.as_ref().unwrap();
        assert_eq!(report.outcome.stars, 0);
        assert_eq!(report.update.star_delta, 0);
        assert_eq!(app.store.record().stars_for(1), Some(3));
    }

    #[test]
    fn crossing_threshold_reports_unlocked_chapter() {
        let (mut app, _) = test_app(vec![Ok(quiz(1))]);
        for level in 1..=7 {
            app.store.record_completion(level, 2).unwrap();
        }
        play(&mut app, 8, &[0]);
        let report = app.last_completion.clone().unwrap();
        assert_eq!(report.unlocked_chapters, vec![2]);
        assert_eq!(report.next, NextStep::NextLevel(9));

        app.follow_next_step();
        assert_eq!(app.session.as_ref().unwrap().level_id(), 9);
    }

    fn timed_app(timer_secs: u32) -> crate::app::QuantumApp {
        let (mut app, _) = test_app(vec![Ok(quiz(3)), Ok(quiz(3))]);
        for level in 1..=9 {
            app.store.record_completion(level, 1).unwrap();
        }
        app.config.timer_secs = timer_secs;
        assert!(app.start_level(10));
        app.begin_story();
        while app.next_story_page() {}
        assert!(app.request_challenge());
        wait_for_content(&mut app);
        app
    }

    #[test]
    fn clock_counts_real_time_between_frames() {
        let mut app = timed_app(5);
        assert!(app.advance_clock(100.0));
        assert!(app.advance_clock(101.5));
        assert!(app.advance_clock(102.0));
        let challenge = app.session.as_ref().unwrap().challenge().unwrap();
        assert_eq!(challenge.remaining_secs(), Some(3));
    }

    #[test]
    fn clock_restarts_after_leaving_challenge() {
        let mut app = timed_app(5);
        assert!(app.advance_clock(10.0));
        app.back_to_intro();
        assert!(!app.advance_clock(50.0));

        app.begin_story();
        while app.next_story_page() {}
        assert!(app.request_challenge());
        wait_for_content(&mut app);
        // Los 40 s fuera del reto no cuentan
        assert!(app.advance_clock(50.0));
        assert!(app.advance_clock(51.0));
        let challenge = app.session.as_ref().unwrap().challenge().unwrap();
        assert_eq!(challenge.remaining_secs(), Some(4));
    }

    #[test]
    fn countdown_reaching_zero_records_completion() {
        let mut app = timed_app(1);
        for frame in 0..=20 {
            app.advance_clock(f64::from(frame) * 0.1);
        }
        let report = app.last_completion.as_ref().unwrap();
        assert_eq!(report.outcome.level_id, 10);
        assert_eq!(report.outcome.correct_answers, 0);
        assert!(!app.advance_clock(3.0));
    }

    #[test]
    fn finishing_chapter_advances_to_next_one() {
        let (mut app, _) = test_app(vec![Ok(quiz(1))]);
        for level in 1..=9 {
            app.store.record_completion(level, 1).unwrap();
        }
        play(&mut app, 10, &[0]);
        assert_eq!(
            app.last_completion.as_ref().unwrap().next,
            NextStep::NextChapter(2)
        );
        app.follow_next_step();
        assert_eq!(app.current_chapter, Some(2));
        assert_eq!(app.state, crate::model::AppState::LevelMenu);
    }
}
