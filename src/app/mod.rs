use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::content::{ContentGenerator, PendingQuiz};
use crate::model::{AppState, ChapterId};
use crate::progress::{CompletionUpdate, ProgressStore};
use crate::session::{LevelSession, SessionOutcome};
use crate::unlock::{NextStep, UnlockPolicy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Submódulos
pub mod navigation;
pub mod session_flow;
pub mod view_models;

// Re-export de view models
pub use crate::view_models::{ChapterInfo, LevelInfo};

/// Preferencias de interfaz; se guardan con el almacenamiento de eframe
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UiPrefs {
    pub dark_mode: bool,
    pub last_chapter: Option<ChapterId>,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            dark_mode: true,
            last_chapter: None,
        }
    }
}

/// Lo que se muestra en la pantalla de nivel completado
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionReport {
    pub outcome: SessionOutcome,
    pub update: CompletionUpdate,
    pub next: NextStep,
    pub unlocked_chapters: Vec<ChapterId>,
}

pub struct QuantumApp {
    pub catalog: Arc<Catalog>,
    pub store: ProgressStore,
    pub policy: UnlockPolicy,
    pub config: GameConfig,
    pub generator: Arc<dyn ContentGenerator>,
    pub prefs: UiPrefs,
    pub state: AppState,
    pub current_chapter: Option<ChapterId>,
    pub session: Option<LevelSession>,
    pub pending: Option<PendingQuiz>,
    pub last_completion: Option<CompletionReport>,
    pub message: String,
    // Instante (s) del último frame con el contrarreloj en marcha
    last_clock: Option<f64>,
}

impl QuantumApp {
    pub fn new(
        store: ProgressStore,
        config: GameConfig,
        generator: Arc<dyn ContentGenerator>,
        prefs: UiPrefs,
    ) -> Self {
        let catalog = Arc::clone(store.catalog());
        let policy = UnlockPolicy::new(config.chapter_threshold_percent);
        let current_chapter = prefs
            .last_chapter
            .filter(|&c| policy.is_chapter_unlocked_by_id(&catalog, store.record(), c));

        Self {
            catalog,
            store,
            policy,
            config,
            generator,
            prefs,
            state: AppState::Welcome,
            current_chapter,
            session: None,
            pending: None,
            last_completion: None,
            message: String::new(),
            last_clock: None,
        }
    }

    pub fn has_progress(&self) -> bool {
        self.store.record().completed_count() > 0
    }

    /// Aviso no bloqueante si el último guardado falló
    pub fn persistence_warning(&self) -> Option<String> {
        self.store
            .last_persist_error()
            .map(|e| format!("⚠ El progreso no se está guardando: {e}"))
    }
}
