pub mod challenge;
pub mod chapter_menu;
pub mod completion;
pub mod level_intro;
pub mod level_menu;
pub mod welcome;
