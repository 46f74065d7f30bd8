// src/view_models.rs

use crate::model::{ChapterId, Difficulty, LevelId};
use crate::progress::MAX_STARS;

#[derive(Clone, Debug, PartialEq)]
pub struct ChapterInfo {
    pub idx: usize, // índice 0-based en catalog.chapters()
    pub id: ChapterId,
    pub title: String,
    pub unlocked: bool,
    pub completed: bool, // alcanza el umbral del capítulo
    pub completed_levels: usize,
    pub total_levels: usize,
    pub ratio: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelInfo {
    pub id: LevelId,
    pub title: String,
    pub difficulty: Difficulty,
    pub playable: bool,
    pub completed: bool, // está en completedLevels
    pub stars: Option<u8>,
    pub timed: bool,
}

pub fn stars_text(stars: u8) -> String {
    let stars = stars.min(MAX_STARS);
    let mut text = "★".repeat(stars as usize);
    text.push_str(&"☆".repeat((MAX_STARS - stars) as usize));
    text
}

impl ChapterInfo {
    pub fn label(&self) -> String {
        if self.completed {
            format!("Capítulo {}: {} ✅", self.id, self.title)
        } else if self.unlocked {
            format!(
                "Capítulo {}: {} 🔓 ({}/{})",
                self.id, self.title, self.completed_levels, self.total_levels
            )
        } else {
            format!("Capítulo {}: {} 🔒", self.id, self.title)
        }
    }
}

impl LevelInfo {
    pub fn label(&self) -> String {
        let clock = if self.timed { " ⏱" } else { "" };
        if self.completed {
            let stars = stars_text(self.stars.unwrap_or(0));
            format!("Nivel {}: {}{} {}", self.id, self.title, clock, stars)
        } else if self.playable {
            format!("Nivel {}: {}{} 🔓", self.id, self.title, clock)
        } else {
            format!("Nivel {} 🔒", self.id)
        }
    }
}
