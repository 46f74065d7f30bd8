use crate::model::QuizQuestion;
use std::time::Duration;

pub const POINTS_PER_CORRECT: u32 = 100;
pub const POINTS_PER_SECOND_LEFT: u32 = 10;
const TIME_BONUS_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeMode {
    Standard,
    Timed { start_secs: u32 },
}

/// Resultado de una pregunta ya enviada; no se puede volver a enviar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: usize,
    pub correct: bool,
    pub correct_option: String,
    pub explanation: String,
}

/// Secuencia puntuada de preguntas de un nivel
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    questions: Vec<QuizQuestion>,
    index: usize,
    selected: Option<usize>,
    feedback: Option<AnswerFeedback>,
    correct_answers: usize,
    score: u32,
    mode: ChallengeMode,
    remaining_ms: Option<u64>,
    finished: bool,
}

impl Challenge {
    pub fn new(questions: Vec<QuizQuestion>, mode: ChallengeMode) -> Self {
        let remaining_ms = match mode {
            ChallengeMode::Standard => None,
            ChallengeMode::Timed { start_secs } => Some(u64::from(start_secs) * 1000),
        };
        let finished = questions.is_empty() || remaining_ms == Some(0);
        Self {
            questions,
            index: 0,
            selected: None,
            feedback: None,
            correct_answers: 0,
            score: 0,
            mode,
            remaining_ms,
            finished,
        }
    }

    pub fn mode(&self) -> ChallengeMode {
        self.mode
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        if self.finished {
            return None;
        }
        self.questions.get(self.index)
    }

    /// Índice 0-based de la pregunta actual
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        self.feedback.as_ref()
    }

    pub fn correct_answers(&self) -> usize {
        self.correct_answers
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_last_question(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining_ms
            .map(|ms| u32::try_from(ms / 1000).unwrap_or(u32::MAX))
    }

    /// Se puede cambiar de opción las veces que haga falta antes de enviar
    pub fn select(&mut self, option: usize) -> bool {
        let valid = self.feedback.is_none()
            && self.current().is_some_and(|q| option < q.options.len());
        if valid {
            self.selected = Some(option);
        }
        valid
    }

    /// Corrige la opción elegida comparando el texto con la opción correcta.
    /// Devuelve `None` si no hay selección o la pregunta ya se envió.
    pub fn submit(&mut self) -> Option<&AnswerFeedback> {
        if self.feedback.is_some() {
            return None;
        }
        let selected = self.selected?;
        let question = self.current()?;

        let chosen = question.options.get(selected)?;
        let correct_option = question.correct_option().unwrap_or_default().to_string();
        let correct = *chosen == correct_option;
        let explanation = question.explanation.clone();

        if correct {
            self.correct_answers += 1;
            self.score = self.score.saturating_add(POINTS_PER_CORRECT);
        }
        if let Some(ms) = self.remaining_ms.as_mut() {
            *ms = if correct {
                *ms + TIME_BONUS_MS
            } else {
                ms.saturating_sub(TIME_BONUS_MS)
            };
            if *ms == 0 {
                self.finished = true;
            }
        }

        self.feedback = Some(AnswerFeedback {
            selected,
            correct,
            correct_option,
            explanation,
        });
        self.feedback.as_ref()
    }

    /// Pasa a la siguiente pregunta o termina si era la última
    pub fn advance(&mut self) {
        if self.finished || self.feedback.is_none() {
            return;
        }
        if self.is_last_question() {
            self.finished = true;
            return;
        }
        self.index += 1;
        self.selected = None;
        self.feedback = None;
    }

    /// Descuenta tiempo en el modo cronometrado. Sin efecto en el estándar.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.finished {
            return;
        }
        if let Some(ms) = self.remaining_ms.as_mut() {
            *ms = ms.saturating_sub(elapsed.as_millis() as u64);
            if *ms == 0 {
                self.finished = true;
            }
        }
    }

    /// Puntos efímeros; no forman parte del progreso guardado
    pub fn final_score(&self) -> u32 {
        match self.remaining_secs() {
            Some(secs) => self
                .score
                .saturating_add(secs.saturating_mul(POINTS_PER_SECOND_LEFT)),
            None => self.score,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::quiz;

    fn answer(challenge: &mut Challenge, option: usize) -> bool {
        assert!(challenge.select(option));
        let correct = challenge.submit().unwrap().correct;
        challenge.advance();
        correct
    }

    #[test]
    fn counts_correct_answers_and_score() {
        // quiz(3): respuestas correctas 0, 1, 2
        let mut challenge = Challenge::new(quiz(3), ChallengeMode::Standard);
        assert!(answer(&mut challenge, 0));
        assert!(!answer(&mut challenge, 0));
        assert!(!challenge.is_finished());
        assert!(answer(&mut challenge, 2));
        assert!(challenge.is_finished());
        assert_eq!(challenge.correct_answers(), 2);
        assert_eq!(challenge.final_score(), 200);
        assert!(challenge.current().is_none());
    }

    #[test]
    fn reselection_allowed_until_submit() {
        let mut challenge = Challenge::new(quiz(2), ChallengeMode::Standard);
        assert!(challenge.select(2));
        assert!(challenge.select(0));
        assert_eq!(challenge.selected(), Some(0));
        assert!(challenge.submit().unwrap().correct);

        // Resultado inmutable: ni cambiar opción ni reenviar
        assert!(!challenge.select(1));
        assert!(challenge.submit().is_none());
        assert_eq!(challenge.correct_answers(), 1);
    }

    #[test]
    fn submit_without_selection_is_ignored() {
        let mut challenge = Challenge::new(quiz(1), ChallengeMode::Standard);
        assert!(challenge.submit().is_none());
        assert!(!challenge.select(7));
        challenge.advance();
        assert_eq!(challenge.position(), 0);
    }

    #[test]
    fn matches_by_option_text() {
        let mut questions = quiz(1);
        questions[0].options = vec!["igual".into(), "igual".into()];
        questions[0].correct_index = 0;
        let mut challenge = Challenge::new(questions, ChallengeMode::Standard);
        challenge.select(1);
        assert!(challenge.submit().unwrap().correct);
    }

    #[test]
    fn huge_countdown_score_saturates() {
        let mode = ChallengeMode::Timed {
            start_secs: 500_000_000,
        };
        let mut challenge = Challenge::new(quiz(1), mode);
        assert_eq!(challenge.remaining_secs(), Some(500_000_000));
        assert_eq!(challenge.final_score(), u32::MAX);
        answer(&mut challenge, 0);
        assert!(challenge.is_finished());
        assert_eq!(challenge.final_score(), u32::MAX);
    }

    #[test]
    fn timed_mode_adjusts_countdown() {
        let mut challenge = Challenge::new(quiz(3), ChallengeMode::Timed { start_secs: 10 });
        assert_eq!(challenge.remaining_secs(), Some(10));
        answer(&mut challenge, 0);
        assert_eq!(challenge.remaining_secs(), Some(12));
        answer(&mut challenge, 0);
        assert_eq!(challenge.remaining_secs(), Some(10));
        challenge.tick(Duration::from_millis(2_500));
        assert_eq!(challenge.remaining_secs(), Some(7));
        answer(&mut challenge, 2);
        assert!(challenge.is_finished());
        assert_eq!(challenge.final_score(), 200 + 9 * POINTS_PER_SECOND_LEFT);
    }

    #[test]
    fn timed_mode_finishes_when_countdown_hits_zero() {
        let mut challenge = Challenge::new(quiz(5), ChallengeMode::Timed { start_secs: 3 });
        answer(&mut challenge, 1);
        challenge.tick(Duration::from_secs(1));
        assert!(challenge.is_finished());
        assert_eq!(challenge.remaining_secs(), Some(0));
        assert_eq!(challenge.correct_answers(), 0);
    }

    #[test]
    fn wrong_answer_floors_timer_at_zero() {
        let mut challenge = Challenge::new(quiz(5), ChallengeMode::Timed { start_secs: 1 });
        challenge.select(2);
        assert!(!challenge.submit().unwrap().correct);
        assert_eq!(challenge.remaining_secs(), Some(0));
        assert!(challenge.is_finished());
    }

    #[test]
    fn standard_mode_ignores_ticks() {
        let mut challenge = Challenge::new(quiz(2), ChallengeMode::Standard);
        challenge.tick(Duration::from_secs(3600));
        assert!(!challenge.is_finished());
        assert_eq!(challenge.remaining_secs(), None);
    }
}
