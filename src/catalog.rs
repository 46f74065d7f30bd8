use crate::model::{Chapter, ChapterId, Level, LevelId};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catálogo YAML inválido: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("el catálogo no tiene capítulos")]
    Empty,
    #[error("capítulo {0} duplicado")]
    DuplicateChapter(ChapterId),
    #[error("el capítulo {0} no tiene niveles")]
    EmptyChapter(ChapterId),
    #[error("nivel {0} duplicado")]
    DuplicateLevel(LevelId),
    #[error("capítulo {chapter}: se esperaba el nivel {expected} y llegó el {found}")]
    NonContiguous {
        chapter: ChapterId,
        expected: LevelId,
        found: LevelId,
    },
    #[error("el nivel {level} declara el capítulo {declared} pero está listado en el {listed}")]
    ChapterMismatch {
        level: LevelId,
        declared: ChapterId,
        listed: ChapterId,
    },
    #[error("el nivel {level} requiere el nivel {prerequisite}, que no es anterior")]
    ForwardPrerequisite { level: LevelId, prerequisite: LevelId },
}

/// Formato del YAML embebido: capítulos con sus niveles anidados
#[derive(Deserialize, Debug)]
struct CatalogFile {
    chapters: Vec<ChapterEntry>,
}

#[derive(Deserialize, Debug)]
struct ChapterEntry {
    id: ChapterId,
    title: String,
    description: String,
    #[serde(default)]
    levels: Vec<Level>,
}

/// Catálogo estático de solo lectura. Se construye una vez al arrancar.
#[derive(Debug, Clone)]
pub struct Catalog {
    levels: BTreeMap<LevelId, Level>,
    chapters: Vec<Chapter>,
}

impl Catalog {
    pub fn from_yaml(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(text)?;
        Self::build(file.chapters)
    }

    fn build(entries: Vec<ChapterEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut levels = BTreeMap::new();
        let mut chapters = Vec::with_capacity(entries.len());
        let mut chapter_ids = HashSet::new();
        let mut expected: LevelId = 1;

        for entry in entries {
            if !chapter_ids.insert(entry.id) {
                return Err(CatalogError::DuplicateChapter(entry.id));
            }
            if entry.levels.is_empty() {
                return Err(CatalogError::EmptyChapter(entry.id));
            }

            let first_level = expected;
            for level in entry.levels {
                if levels.contains_key(&level.id) {
                    return Err(CatalogError::DuplicateLevel(level.id));
                }
                if level.id != expected {
                    return Err(CatalogError::NonContiguous {
                        chapter: entry.id,
                        expected,
                        found: level.id,
                    });
                }
                if level.chapter != entry.id {
                    return Err(CatalogError::ChapterMismatch {
                        level: level.id,
                        declared: level.chapter,
                        listed: entry.id,
                    });
                }
                // Sin referencias hacia delante ni circulares
                if let Some(&bad) = level
                    .prerequisite
                    .iter()
                    .find(|&&p| p == 0 || p >= level.id)
                {
                    return Err(CatalogError::ForwardPrerequisite {
                        level: level.id,
                        prerequisite: bad,
                    });
                }
                expected += 1;
                levels.insert(level.id, level);
            }

            chapters.push(Chapter {
                id: entry.id,
                title: entry.title,
                description: entry.description,
                first_level,
                last_level: expected - 1,
            });
        }

        Ok(Self { levels, chapters })
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.get(&id)
    }

    pub fn contains_level(&self, id: LevelId) -> bool {
        self.levels.contains_key(&id)
    }

    /// Niveles en orden de id
    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn last_level_id(&self) -> Option<LevelId> {
        self.levels.keys().next_back().copied()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn chapter_index(&self, id: ChapterId) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == id)
    }

    pub fn chapter_of(&self, level: LevelId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.contains(level))
    }

    pub fn levels_in(&self, chapter: ChapterId) -> impl Iterator<Item = &Level> {
        let range = self.chapter(chapter).map(Chapter::level_ids);
        range
            .into_iter()
            .flat_map(move |r| self.levels.range(r).map(|(_, l)| l))
    }
}
