//! Reglas de desbloqueo. Funciones puras sobre (catálogo, progreso): no guardan
//! estado y todas las pantallas las comparten.

use crate::catalog::Catalog;
use crate::model::{ChapterId, LevelId};
use crate::progress::{MAX_STARS, ProgressRecord};

/// Porcentaje del capítulo anterior necesario para abrir el siguiente.
/// Es también el umbral de "capítulo completado".
pub const DEFAULT_CHAPTER_THRESHOLD_PERCENT: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    NextLevel(LevelId),
    NextChapter(ChapterId),
    ChapterLocked(ChapterId),
    BackToChapter(ChapterId),
    GameComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub completed_levels: usize,
    pub total_levels: usize,
    pub total_stars: u32,
    pub max_stars: u32,
    pub completed_chapters: usize,
    pub total_chapters: usize,
}

impl ProgressSummary {
    pub fn percent(&self) -> u32 {
        if self.total_levels == 0 {
            return 0;
        }
        (self.completed_levels * 100 / self.total_levels) as u32
    }
}

/// Estrellas de un intento. Umbrales fijos (1 y 2 aciertos), no proporcionales.
pub fn star_tier(correct_answers: usize, total_questions: usize) -> u8 {
    if total_questions == 0 {
        0
    } else if correct_answers >= total_questions {
        3
    } else if correct_answers >= 2 {
        2
    } else if correct_answers >= 1 {
        1
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockPolicy {
    chapter_threshold_percent: u32,
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CHAPTER_THRESHOLD_PERCENT)
    }
}

impl UnlockPolicy {
    pub fn new(chapter_threshold_percent: u32) -> Self {
        Self {
            chapter_threshold_percent: chapter_threshold_percent.min(100),
        }
    }

    pub fn threshold_percent(&self) -> u32 {
        self.chapter_threshold_percent
    }

    /// El nivel 1 siempre está abierto; el resto necesita todos sus prerrequisitos.
    /// Un nivel > 1 sin prerrequisitos se queda cerrado.
    pub fn is_level_unlocked(
        &self,
        catalog: &Catalog,
        record: &ProgressRecord,
        level: LevelId,
    ) -> bool {
        if level == 1 {
            return true;
        }
        match catalog.level(level) {
            Some(l) if !l.prerequisite.is_empty() => {
                l.prerequisite.iter().all(|&p| record.is_completed(p))
            }
            _ => false,
        }
    }

    pub fn completed_in_chapter(
        catalog: &Catalog,
        record: &ProgressRecord,
        chapter: ChapterId,
    ) -> usize {
        catalog
            .chapter(chapter)
            .map(|c| c.level_ids().filter(|&l| record.is_completed(l)).count())
            .unwrap_or(0)
    }

    /// Fracción [0, 1] de niveles completados del capítulo
    pub fn chapter_completion_ratio(
        catalog: &Catalog,
        record: &ProgressRecord,
        chapter: ChapterId,
    ) -> f32 {
        match catalog.chapter(chapter) {
            Some(c) if !c.is_empty() => {
                Self::completed_in_chapter(catalog, record, chapter) as f32 / c.len() as f32
            }
            _ => 0.0,
        }
    }

    pub fn is_chapter_complete(
        &self,
        catalog: &Catalog,
        record: &ProgressRecord,
        chapter: ChapterId,
    ) -> bool {
        let Some(c) = catalog.chapter(chapter) else {
            return false;
        };
        if c.is_empty() {
            return false;
        }
        // Aritmética entera: 8 de 10 es exactamente el 80 %
        let done = Self::completed_in_chapter(catalog, record, chapter) as u64;
        done * 100 >= u64::from(self.chapter_threshold_percent) * c.len() as u64
    }

    pub fn is_chapter_unlocked(
        &self,
        catalog: &Catalog,
        record: &ProgressRecord,
        chapter_index: usize,
    ) -> bool {
        if chapter_index == 0 {
            return true;
        }
        catalog
            .chapters()
            .get(chapter_index - 1)
            .is_some_and(|prev| self.is_chapter_complete(catalog, record, prev.id))
            && chapter_index < catalog.chapters().len()
    }

    pub fn is_chapter_unlocked_by_id(
        &self,
        catalog: &Catalog,
        record: &ProgressRecord,
        chapter: ChapterId,
    ) -> bool {
        catalog
            .chapter_index(chapter)
            .is_some_and(|idx| self.is_chapter_unlocked(catalog, record, idx))
    }

    /// Jugable = nivel desbloqueado y capítulo desbloqueado
    pub fn is_level_playable(
        &self,
        catalog: &Catalog,
        record: &ProgressRecord,
        level: LevelId,
    ) -> bool {
        let chapter_open = catalog
            .chapter_of(level)
            .is_some_and(|c| self.is_chapter_unlocked_by_id(catalog, record, c.id));
        chapter_open && self.is_level_unlocked(catalog, record, level)
    }

    pub fn unlocked_chapters(&self, catalog: &Catalog, record: &ProgressRecord) -> Vec<ChapterId> {
        catalog
            .chapters()
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_chapter_unlocked(catalog, record, *i))
            .map(|(_, c)| c.id)
            .collect()
    }

    /// Capítulos que se abrieron entre dos instantáneas
    pub fn newly_unlocked_chapters(
        &self,
        catalog: &Catalog,
        before: &ProgressRecord,
        after: &ProgressRecord,
    ) -> Vec<ChapterId> {
        let old = self.unlocked_chapters(catalog, before);
        self.unlocked_chapters(catalog, after)
            .into_iter()
            .filter(|c| !old.contains(c))
            .collect()
    }

    /// A dónde llevar al jugador después de terminar `finished`
    pub fn next_step(
        &self,
        catalog: &Catalog,
        record: &ProgressRecord,
        finished: LevelId,
    ) -> NextStep {
        let current_chapter = catalog.chapter_of(finished).map(|c| c.id);
        let back = || match current_chapter {
            Some(id) => NextStep::BackToChapter(id),
            None => NextStep::GameComplete,
        };

        let next_id = finished + 1;
        let Some(next) = catalog.level(next_id) else {
            return if catalog.levels().all(|l| record.is_completed(l.id)) {
                NextStep::GameComplete
            } else {
                back()
            };
        };

        if Some(next.chapter) == current_chapter {
            if self.is_level_playable(catalog, record, next_id) {
                NextStep::NextLevel(next_id)
            } else {
                back()
            }
        } else if self.is_chapter_unlocked_by_id(catalog, record, next.chapter) {
            NextStep::NextChapter(next.chapter)
        } else {
            NextStep::ChapterLocked(next.chapter)
        }
    }

    /// Nivel para "continuar": la pista `current_level` si es jugable,
    /// si no el primer nivel jugable pendiente.
    pub fn resume_target(&self, catalog: &Catalog, record: &ProgressRecord) -> LevelId {
        let hint = record.current_level();
        if catalog.contains_level(hint) && self.is_level_playable(catalog, record, hint) {
            return hint;
        }
        catalog
            .levels()
            .map(|l| l.id)
            .find(|&id| !record.is_completed(id) && self.is_level_playable(catalog, record, id))
            .unwrap_or(1)
    }

    pub fn summary(&self, catalog: &Catalog, record: &ProgressRecord) -> ProgressSummary {
        ProgressSummary {
            completed_levels: catalog.levels().filter(|l| record.is_completed(l.id)).count(),
            total_levels: catalog.level_count(),
            total_stars: record.total_stars(),
            max_stars: catalog.level_count() as u32 * u32::from(MAX_STARS),
            completed_chapters: catalog
                .chapters()
                .iter()
                .filter(|c| self.is_chapter_complete(catalog, record, c.id))
                .count(),
            total_chapters: catalog.chapters().len(),
        }
    }
}
