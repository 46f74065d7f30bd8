use quantum_quest::QuantumApp;
use quantum_quest::app::UiPrefs;
use quantum_quest::config::GameConfig;
use quantum_quest::content::remote::RemoteContentGenerator;
use quantum_quest::data::read_catalog_embedded;
use quantum_quest::progress::{FileStorage, ProgressStore};
use std::sync::Arc;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quantum_quest=info")),
        )
        .init();

    let config = GameConfig::from_env();
    log::info!("Quantum Quest v{} arrancando", env!("CARGO_PKG_VERSION"));

    // Sin catálogo no hay juego
    let catalog = match read_catalog_embedded() {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            log::error!("Catálogo de niveles inválido: {e}");
            std::process::exit(1);
        }
    };

    let generator = match RemoteContentGenerator::new(
        config.content_endpoint.clone(),
        config.content_timeout,
    ) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            log::error!("No se pudo crear el cliente de contenido: {e}");
            std::process::exit(1);
        }
    };

    let storage = FileStorage::new(config.progress_path.clone());
    log::info!("Progreso en {}", storage.path().display());
    let store = ProgressStore::load(Box::new(storage), catalog);

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Quantum Quest",
        options,
        Box::new(move |cc| {
            let prefs: UiPrefs = cc
                .storage
                .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
                .unwrap_or_default();
            let visuals = if prefs.dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            };
            cc.egui_ctx.set_visuals(visuals);
            Ok(Box::new(QuantumApp::new(store, config, generator, prefs)))
        }),
    )
}
