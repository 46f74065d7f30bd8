//! Máquina de estados de un intento de nivel:
//! Intro → Historia → (Carga) → Reto → Completado.

use crate::content::ContentError;
use crate::model::{Level, LevelId, QuizQuestion};
use crate::unlock::star_tier;
use std::time::Duration;

pub mod challenge;

pub use challenge::{AnswerFeedback, Challenge, ChallengeMode};

/// Lo que el nivel entrega al terminar; quien llama lo registra en el progreso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub level_id: LevelId,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub stars: u8,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Intro,
    Story { page: usize },
    Loading { attempt: u32 },
    LoadFailed { message: String, retries_left: u32 },
    Challenge(Challenge),
    Complete(SessionOutcome),
}

#[derive(Debug, Clone)]
pub struct LevelSession {
    level_id: LevelId,
    pages: Vec<String>,
    mode: ChallengeMode,
    phase: Phase,
    retries_left: u32,
    loads: u32,
}

impl LevelSession {
    pub fn new(level: &Level, timer_secs: u32, manual_retries: u32) -> Self {
        let mode = if level.timed {
            ChallengeMode::Timed {
                start_secs: timer_secs,
            }
        } else {
            ChallengeMode::Standard
        };
        Self {
            level_id: level.id,
            pages: level.story_pages(),
            mode,
            phase: Phase::Intro,
            retries_left: manual_retries,
            loads: 0,
        }
    }

    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn mode(&self) -> ChallengeMode {
        self.mode
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_text(&self) -> Option<&str> {
        match self.phase {
            Phase::Story { page } => self.pages.get(page).map(String::as_str),
            _ => None,
        }
    }

    pub fn is_last_page(&self) -> bool {
        match self.phase {
            Phase::Story { page } => page + 1 >= self.pages.len(),
            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        match &self.phase {
            Phase::Complete(outcome) => Some(*outcome),
            _ => None,
        }
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        match &self.phase {
            Phase::Challenge(c) => Some(c),
            _ => None,
        }
    }

    pub fn begin_story(&mut self) -> bool {
        if !matches!(self.phase, Phase::Intro) {
            return false;
        }
        self.phase = Phase::Story { page: 0 };
        true
    }

    pub fn next_page(&mut self) -> bool {
        match self.phase {
            Phase::Story { page } if page + 1 < self.pages.len() => {
                self.phase = Phase::Story { page: page + 1 };
                true
            }
            _ => false,
        }
    }

    /// Desde la primera página se vuelve a la intro
    pub fn previous_page(&mut self) -> bool {
        match self.phase {
            Phase::Story { page: 0 } => {
                self.phase = Phase::Intro;
                true
            }
            Phase::Story { page } => {
                self.phase = Phase::Story { page: page - 1 };
                true
            }
            _ => false,
        }
    }

    /// Historia → carga del reto. Quien llama lanza la petición de contenido.
    pub fn start_loading(&mut self) -> bool {
        if !matches!(self.phase, Phase::Story { .. }) {
            return false;
        }
        self.loads += 1;
        self.phase = Phase::Loading { attempt: self.loads };
        true
    }

    /// Reintento manual tras un fallo de carga; acotado por `manual_retries`
    pub fn retry_load(&mut self) -> bool {
        match self.phase {
            Phase::LoadFailed { retries_left, .. } if retries_left > 0 => {
                self.retries_left = retries_left - 1;
                self.loads += 1;
                self.phase = Phase::Loading { attempt: self.loads };
                true
            }
            _ => false,
        }
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.phase, Phase::LoadFailed { retries_left, .. } if retries_left > 0)
    }

    /// Resultado de la carga. Se ignora si ya no estamos cargando.
    pub fn content_loaded(&mut self, result: Result<Vec<QuizQuestion>, ContentError>) -> bool {
        if !self.is_loading() {
            return false;
        }
        self.phase = match result {
            Ok(questions) if !questions.is_empty() => {
                Phase::Challenge(Challenge::new(questions, self.mode))
            }
            Ok(_) => self.load_failed(ContentError::Empty),
            Err(e) => self.load_failed(e),
        };
        true
    }

    fn load_failed(&self, error: ContentError) -> Phase {
        log::warn!("No se pudo cargar el reto del nivel {}: {error}", self.level_id);
        Phase::LoadFailed {
            message: error.to_string(),
            retries_left: self.retries_left,
        }
    }

    /// Salida explícita al inicio desde la carga, el error o el reto
    pub fn back_to_intro(&mut self) -> bool {
        if matches!(
            self.phase,
            Phase::Loading { .. } | Phase::LoadFailed { .. } | Phase::Challenge(_)
        ) {
            self.phase = Phase::Intro;
            true
        } else {
            false
        }
    }

    pub fn select(&mut self, option: usize) -> bool {
        match &mut self.phase {
            Phase::Challenge(c) => c.select(option),
            _ => false,
        }
    }

    pub fn submit(&mut self) -> Option<AnswerFeedback> {
        let feedback = match &mut self.phase {
            Phase::Challenge(c) => c.submit().cloned(),
            _ => None,
        };
        self.finish_if_done();
        feedback
    }

    pub fn advance(&mut self) -> Option<SessionOutcome> {
        if let Phase::Challenge(c) = &mut self.phase {
            c.advance();
        }
        self.finish_if_done()
    }

    pub fn tick(&mut self, elapsed: Duration) -> Option<SessionOutcome> {
        if let Phase::Challenge(c) = &mut self.phase {
            c.tick(elapsed);
        }
        self.finish_if_done()
    }

    fn finish_if_done(&mut self) -> Option<SessionOutcome> {
        let outcome = match &self.phase {
            Phase::Challenge(c) if c.is_finished() => SessionOutcome {
                level_id: self.level_id,
                correct_answers: c.correct_answers(),
                total_questions: c.total_questions(),
                stars: star_tier(c.correct_answers(), c.total_questions()),
                score: c.final_score(),
            },
            _ => return None,
        };
        log::debug!(
            "Nivel {} terminado: {}/{} aciertos, {} estrellas",
            outcome.level_id,
            outcome.correct_answers,
            outcome.total_questions,
            outcome.stars
        );
        self.phase = Phase::Complete(outcome);
        Some(outcome)
    }
}
