//! Contrato con el servicio externo que genera los cuestionarios.
//! La llamada es lenta y puede fallar: se reintenta un número acotado de
//! veces en un hilo aparte y se puede cancelar.

use crate::model::{Level, LevelId, QuizQuestion};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
pub mod remote;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("error de red: {0}")]
    Transport(String),
    #[error("el servicio de contenido devolvió HTTP {status}")]
    Http { status: u16, body: String },
    #[error("respuesta inválida del servicio de contenido: {0}")]
    Malformed(String),
    #[error("el cuestionario llegó vacío")]
    Empty,
    #[error("la pregunta {0} no es válida")]
    InvalidQuestion(usize),
    #[error("carga cancelada")]
    Cancelled,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuizRequest {
    pub concept: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theory: Option<String>,
    pub count: usize,
}

impl QuizRequest {
    pub fn for_level(level: &Level, count: usize) -> Self {
        Self {
            concept: level.concept.clone(),
            title: level.title.clone(),
            theory: Some(level.story.clone()).filter(|s| !s.trim().is_empty()),
            count,
        }
    }
}

pub trait ContentGenerator: Send + Sync {
    fn generate_quiz(&self, request: &QuizRequest) -> Result<Vec<QuizQuestion>, ContentError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(750),
        }
    }
}

/// Una lista vacía o con preguntas mal formadas cuenta como fallo
pub fn validate_quiz(questions: Vec<QuizQuestion>) -> Result<Vec<QuizQuestion>, ContentError> {
    if questions.is_empty() {
        return Err(ContentError::Empty);
    }
    if let Some(i) = questions.iter().position(|q| !q.is_valid()) {
        return Err(ContentError::InvalidQuestion(i));
    }
    Ok(questions)
}

/// Pide el cuestionario hasta `retry.attempts` veces. Comprueba `cancel`
/// antes de cada intento.
pub fn fetch_quiz(
    generator: &dyn ContentGenerator,
    request: &QuizRequest,
    retry: RetryPolicy,
    cancel: &AtomicBool,
) -> Result<Vec<QuizQuestion>, ContentError> {
    let attempts = retry.attempts.max(1);
    let mut last_error = ContentError::Empty;

    for attempt in 1..=attempts {
        if cancel.load(Ordering::SeqCst) {
            log::debug!("Carga de '{}' cancelada antes del intento {attempt}", request.title);
            return Err(ContentError::Cancelled);
        }

        match generator.generate_quiz(request).and_then(validate_quiz) {
            Ok(questions) => {
                log::info!(
                    "Cuestionario de '{}' listo: {} preguntas (intento {attempt})",
                    request.title,
                    questions.len()
                );
                return Ok(questions);
            }
            Err(e) => {
                log::warn!("Intento {attempt}/{attempts} de '{}' falló: {e}", request.title);
                last_error = e;
            }
        }

        if attempt < attempts && !retry.delay.is_zero() {
            std::thread::sleep(retry.delay);
        }
    }

    Err(last_error)
}

/// Carga en segundo plano. Soltar el handle cancela los reintentos pendientes.
pub struct PendingQuiz {
    level_id: LevelId,
    rx: Receiver<Result<Vec<QuizQuestion>, ContentError>>,
    cancel: Arc<AtomicBool>,
}

impl PendingQuiz {
    pub fn spawn(
        generator: Arc<dyn ContentGenerator>,
        level_id: LevelId,
        request: QuizRequest,
        retry: RetryPolicy,
    ) -> Self {
        let (tx, rx) = channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        std::thread::spawn(move || {
            let result = fetch_quiz(generator.as_ref(), &request, retry, &flag);
            // Si el receptor ya no existe nadie espera el resultado
            let _ = tx.send(result);
        });

        Self { level_id, rx, cancel }
    }

    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    /// No bloquea: `None` mientras la carga sigue en curso
    pub fn poll(&self) -> Option<Result<Vec<QuizQuestion>, ContentError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ContentError::Transport(
                "el hilo de carga terminó sin respuesta".into(),
            ))),
        }
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn wait(&self, timeout: Duration) -> Option<Result<Vec<QuizQuestion>, ContentError>> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for PendingQuiz {
    fn drop(&mut self) {
        self.cancel();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::time::Instant;

    fn request() -> QuizRequest {
        QuizRequest {
            concept: "Superposition".into(),
            title: "Both at Once".into(),
            theory: None,
            count: 3,
        }
    }

    fn no_delay(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn retries_until_success() {
        let generator = ScriptedGenerator::new(vec![
            Err(ContentError::Transport("timeout".into())),
            Ok(vec![]),
            Ok(quiz(3)),
        ]);
        let cancel = AtomicBool::new(false);
        let result = fetch_quiz(&generator, &request(), no_delay(3), &cancel);
        assert_eq!(result.unwrap().len(), 3);
        assert_eq!(generator.calls(), 3);
    }

    #[test]
    fn gives_up_after_bounded_attempts() {
        let generator = ScriptedGenerator::new(vec![
            Err(ContentError::Transport("uno".into())),
            Err(ContentError::Transport("dos".into())),
            Ok(quiz(3)),
        ]);
        let cancel = AtomicBool::new(false);
        let result = fetch_quiz(&generator, &request(), no_delay(2), &cancel);
        assert_eq!(result, Err(ContentError::Transport("dos".into())));
        assert_eq!(generator.calls(), 2);
    }

    #[test]
    fn invalid_question_counts_as_failure() {
        let mut bad = quiz(2);
        bad[1].correct_index = 9;
        let generator = ScriptedGenerator::new(vec![Ok(bad)]);
        let cancel = AtomicBool::new(false);
        let result = fetch_quiz(&generator, &request(), no_delay(1), &cancel);
        assert_eq!(result, Err(ContentError::InvalidQuestion(1)));
    }

    #[test]
    fn cancelled_fetch_makes_no_calls() {
        let generator = ScriptedGenerator::new(vec![Ok(quiz(3))]);
        let cancel = AtomicBool::new(true);
        let result = fetch_quiz(&generator, &request(), no_delay(3), &cancel);
        assert_eq!(result, Err(ContentError::Cancelled));
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn pending_quiz_delivers_result() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(quiz(2))]));
        let pending = PendingQuiz::spawn(generator, 7, request(), no_delay(3));
        assert_eq!(pending.level_id(), 7);
        let result = pending.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(result.unwrap().len(), 2);
    }

    #[test]
    fn dropping_pending_stops_remaining_attempts() {
        // Guion vacío: todas las llamadas fallan
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let retry = RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(300),
        };
        let pending = PendingQuiz::spawn(generator.clone(), 1, request(), retry);

        let start = Instant::now();
        while generator.calls() == 0 {
            assert!(start.elapsed() < Duration::from_secs(5), "el primer intento no llegó");
            std::thread::sleep(Duration::from_millis(5));
        }
        drop(pending);

        std::thread::sleep(Duration::from_millis(900));
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn request_carries_level_story_as_theory() {
        let catalog = crate::data::read_catalog_embedded().unwrap();
        let level = catalog.level(1).unwrap();
        let request = QuizRequest::for_level(level, 3);
        assert_eq!(request.concept, level.concept);
        assert!(request.theory.as_deref().unwrap().contains("Professor Qubit"));
    }
}
