use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub type LevelId = u32;
pub type ChapterId = u32;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Principiante",
            Difficulty::Intermediate => "Intermedio",
            Difficulty::Advanced => "Avanzado",
            Difficulty::Expert => "Experto",
            Difficulty::Master => "Maestro",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Level {
    pub id: LevelId,
    pub chapter: ChapterId,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub prerequisite: Vec<LevelId>,
    pub concept: String,
    pub title: String,
    pub description: String,
    pub story: String,
    /// Reto con cuenta atrás
    #[serde(default)]
    pub timed: bool,
}

impl Level {
    /// Párrafos de la historia (separados por línea en blanco)
    pub fn story_pages(&self) -> Vec<String> {
        self.story
            .split("\n\n")
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    pub description: String,
    pub first_level: LevelId,
    pub last_level: LevelId,
}

impl Chapter {
    pub fn level_ids(&self) -> RangeInclusive<LevelId> {
        self.first_level..=self.last_level
    }

    pub fn len(&self) -> usize {
        (self.last_level + 1).saturating_sub(self.first_level) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, level: LevelId) -> bool {
        self.level_ids().contains(&level)
    }
}

/// Pregunta de opción múltiple generada por el servicio de contenido
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer", alias = "correctIndex")]
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }

    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() >= 2
            && self.correct_index < self.options.len()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Welcome,
    ChapterMenu,
    LevelMenu,
    Session,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_pages_split_on_blank_lines() {
        let level = Level {
            id: 1,
            chapter: 1,
            difficulty: Difficulty::Beginner,
            prerequisite: vec![],
            concept: "Qubit".into(),
            title: "Meet the Qubit".into(),
            description: String::new(),
            story: "First page.\n\nSecond page.\n\n\n".into(),
            timed: false,
        };
        assert_eq!(level.story_pages(), vec!["First page.", "Second page."]);
    }

    #[test]
    fn question_with_out_of_range_answer_is_invalid() {
        let q = QuizQuestion {
            question: "What is |0>?".into(),
            options: vec!["A basis state".into(), "A gate".into()],
            correct_index: 2,
            explanation: String::new(),
        };
        assert!(!q.is_valid());
        assert_eq!(q.correct_option(), None);
    }
}
