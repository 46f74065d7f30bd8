use super::*;
use crate::unlock::ProgressSummary;

impl QuantumApp {
    pub fn chapter_infos(&self) -> Vec<ChapterInfo> {
        let record = self.store.record();
        self.catalog
            .chapters()
            .iter()
            .enumerate()
            .map(|(idx, chapter)| ChapterInfo {
                idx,
                id: chapter.id,
                title: chapter.title.clone(),
                unlocked: self.policy.is_chapter_unlocked(&self.catalog, record, idx),
                completed: self.policy.is_chapter_complete(&self.catalog, record, chapter.id),
                completed_levels: UnlockPolicy::completed_in_chapter(
                    &self.catalog,
                    record,
                    chapter.id,
                ),
                total_levels: chapter.len(),
                ratio: UnlockPolicy::chapter_completion_ratio(&self.catalog, record, chapter.id),
            })
            .collect()
    }

    pub fn level_infos_in_current_chapter(&self) -> Option<Vec<LevelInfo>> {
        let chapter = self.current_chapter?;
        let record = self.store.record();
        Some(
            self.catalog
                .levels_in(chapter)
                .map(|level| LevelInfo {
                    id: level.id,
                    title: level.title.clone(),
                    difficulty: level.difficulty,
                    playable: self.policy.is_level_playable(&self.catalog, record, level.id),
                    completed: record.is_completed(level.id),
                    stars: record.stars_for(level.id),
                    timed: level.timed,
                })
                .collect(),
        )
    }

    pub fn summary(&self) -> ProgressSummary {
        self.policy.summary(&self.catalog, self.store.record())
    }
}
