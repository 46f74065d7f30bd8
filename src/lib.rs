pub mod app;
pub mod catalog;
pub mod config;
pub mod content;
pub mod data;
pub mod model;
pub mod progress;
pub mod session;
pub mod ui;
pub mod unlock;
pub mod view_models;

pub use app::QuantumApp;
