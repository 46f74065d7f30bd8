use super::*;
use crate::model::LevelId;

impl QuantumApp {
    pub fn go_welcome(&mut self) {
        self.cancel_pending();
        self.session = None;
        self.state = AppState::Welcome;
    }

    pub fn open_chapter_menu(&mut self) {
        self.state = AppState::ChapterMenu;
        self.message.clear();
    }

    /// Abre el menú de niveles de un capítulo si está desbloqueado
    pub fn select_chapter(&mut self, chapter: ChapterId) -> bool {
        if !self
            .policy
            .is_chapter_unlocked_by_id(&self.catalog, self.store.record(), chapter)
        {
            self.message = format!(
                "🔒 Completa el {} % del capítulo anterior para abrir este.",
                self.policy.threshold_percent()
            );
            return false;
        }
        self.current_chapter = Some(chapter);
        self.prefs.last_chapter = Some(chapter);
        self.state = AppState::LevelMenu;
        self.message.clear();
        true
    }

    pub fn open_level_menu(&mut self) {
        match self.current_chapter {
            Some(chapter) => {
                self.select_chapter(chapter);
            }
            None => self.open_chapter_menu(),
        }
    }

    /// Empieza un intento del nivel, siempre desde la intro
    pub fn start_level(&mut self, level_id: LevelId) -> bool {
        if !self
            .policy
            .is_level_playable(&self.catalog, self.store.record(), level_id)
        {
            self.message = format!("🔒 El nivel {level_id} todavía está bloqueado.");
            return false;
        }
        let catalog = Arc::clone(&self.catalog);
        let Some(level) = catalog.level(level_id) else {
            return false;
        };

        self.cancel_pending();
        self.session = Some(LevelSession::new(
            level,
            self.config.timer_secs,
            self.config.manual_retries,
        ));
        self.current_chapter = Some(level.chapter);
        self.prefs.last_chapter = Some(level.chapter);
        self.last_completion = None;
        self.state = AppState::Session;
        self.message.clear();
        log::debug!("Empieza el nivel {level_id}");
        true
    }

    /// "Continuar donde lo dejé"
    pub fn continue_game(&mut self) -> bool {
        let target = self.policy.resume_target(&self.catalog, self.store.record());
        self.start_level(target)
    }

    pub fn leave_session(&mut self) {
        self.cancel_pending();
        self.session = None;
        self.open_level_menu();
    }

    /// Sigue la sugerencia de la pantalla de nivel completado
    pub fn follow_next_step(&mut self) {
        let Some(report) = self.last_completion.take() else {
            self.leave_session();
            return;
        };
        self.session = None;

        match report.next {
            NextStep::NextLevel(level) => {
                self.start_level(level);
            }
            NextStep::NextChapter(chapter) => {
                log::info!("Avance automático al capítulo {chapter}");
                self.select_chapter(chapter);
            }
            NextStep::ChapterLocked(_) => {
                self.open_chapter_menu();
                self.message = format!(
                    "Completa el {} % de este capítulo para abrir el siguiente.",
                    self.policy.threshold_percent()
                );
            }
            NextStep::BackToChapter(chapter) => {
                self.select_chapter(chapter);
            }
            NextStep::GameComplete => {
                self.go_welcome();
                self.message = "🏆 ¡Has completado todos los niveles!".into();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::tests::test_app;
    use crate::model::AppState;

    #[test]
    fn locked_chapter_cannot_be_selected() {
        let (mut app, _) = test_app(vec![]);
        assert!(!app.select_chapter(2));
        assert!(!app.message.is_empty());
        assert!(app.select_chapter(1));
        assert_eq!(app.state, AppState::LevelMenu);
        assert_eq!(app.prefs.last_chapter, Some(1));
    }

    #[test]
    fn locked_level_cannot_be_started() {
        let (mut app, _) = test_app(vec![]);
        assert!(!app.start_level(2));
        assert!(app.session.is_none());
        assert!(app.continue_game());
        assert_eq!(app.session.as_ref().unwrap().level_id(), 1);
    }

    #[test]
    fn continue_resumes_at_frontier() {
        let (mut app, _) = test_app(vec![]);
        app.store.record_completion(1, 3).unwrap();
        app.store.record_completion(2, 1).unwrap();
        assert!(app.continue_game());
        assert_eq!(app.session.as_ref().unwrap().level_id(), 3);
        assert_eq!(app.current_chapter, Some(1));
    }
}
