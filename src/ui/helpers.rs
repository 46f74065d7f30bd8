// src/ui/helpers.rs
use egui::{Button, Color32, RichText, Ui, Vec2};

pub fn big_list_button(ui: &mut Ui, label: String, width: f32, height: f32, enabled: bool) -> bool {
    ui.add_enabled(enabled, Button::new(label).min_size(Vec2::new(width, height)))
        .clicked()
}

/// Botón de opción del reto. Tras responder (`answered`) se bloquea y se colorea:
/// verde la correcta, rojo la elegida si falló.
pub fn option_button(
    ui: &mut Ui,
    label: &str,
    width: f32,
    selected: bool,
    answered: bool,
    verdict: Option<bool>,
) -> bool {
    let text = match verdict {
        Some(true) => RichText::new(format!("✔ {label}")).color(Color32::WHITE),
        Some(false) => RichText::new(format!("✘ {label}")).color(Color32::WHITE),
        None => RichText::new(label),
    };
    let mut button = Button::new(text)
        .min_size(Vec2::new(width, 36.0))
        .selected(selected && !answered);
    button = match verdict {
        Some(true) => button.fill(Color32::DARK_GREEN),
        Some(false) => button.fill(Color32::DARK_RED),
        None => button,
    };
    ui.add_enabled(!answered, button).clicked()
}
