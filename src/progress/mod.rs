//! Registro durable del progreso del jugador y el único punto que lo modifica.

use crate::catalog::Catalog;
use crate::model::LevelId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use thiserror::Error;

pub mod storage;

pub use storage::{FileStorage, MemoryStorage, ProgressStorage, StorageError};

pub const MAX_STARS: u8 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("el nivel {0} no existe en el catálogo")]
    UnknownLevel(LevelId),
}

/// Progreso persistido. `total_stars` es una caché de la suma de estrellas
/// de los niveles completados; solo cambia a través de `apply_completion`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    completed_levels: BTreeSet<LevelId>,
    level_stars: BTreeMap<LevelId, u8>,
    current_level: LevelId,
    total_stars: u32,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            completed_levels: BTreeSet::new(),
            level_stars: BTreeMap::new(),
            current_level: 1,
            total_stars: 0,
        }
    }
}

/// Resultado de aplicar una finalización de nivel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionUpdate {
    pub level_id: LevelId,
    pub previous_stars: u8,
    pub stars: u8,
    pub star_delta: u8,
    pub first_completion: bool,
    pub persisted: bool,
}

impl ProgressRecord {
    pub fn completed_levels(&self) -> &BTreeSet<LevelId> {
        &self.completed_levels
    }

    pub fn is_completed(&self, level: LevelId) -> bool {
        self.completed_levels.contains(&level)
    }

    pub fn stars_for(&self, level: LevelId) -> Option<u8> {
        self.level_stars.get(&level).copied()
    }

    pub fn level_stars(&self) -> &BTreeMap<LevelId, u8> {
        &self.level_stars
    }

    pub fn current_level(&self) -> LevelId {
        self.current_level
    }

    pub fn total_stars(&self) -> u32 {
        self.total_stars
    }

    pub fn completed_count(&self) -> usize {
        self.completed_levels.len()
    }

    fn stars_sum(&self) -> u32 {
        self.completed_levels
            .iter()
            .filter_map(|l| self.level_stars.get(l))
            .map(|&s| u32::from(s))
            .sum()
    }

    /// Mezcla monótona de un resultado. Las estrellas de un nivel nunca bajan.
    pub(crate) fn apply_completion(
        &mut self,
        level_id: LevelId,
        stars_earned: u32,
    ) -> CompletionUpdate {
        let stars = stars_earned.min(u32::from(MAX_STARS)) as u8;
        let previous_stars = self.level_stars.get(&level_id).copied().unwrap_or(0);
        let star_delta = stars.saturating_sub(previous_stars);

        self.level_stars.insert(level_id, previous_stars.max(stars));
        let first_completion = self.completed_levels.insert(level_id);
        self.total_stars += u32::from(star_delta);
        self.current_level = self.current_level.max(level_id + 1);

        CompletionUpdate {
            level_id,
            previous_stars,
            stars: previous_stars.max(stars),
            star_delta,
            first_completion,
            persisted: false,
        }
    }

    /// Repara un registro cargado contra el catálogo. Devuelve `true` si cambió algo.
    fn reconcile(&mut self, catalog: &Catalog) -> bool {
        let before = self.clone();

        self.completed_levels.retain(|&l| catalog.contains_level(l));
        let completed = &self.completed_levels;
        self.level_stars.retain(|l, _| completed.contains(l));
        for stars in self.level_stars.values_mut() {
            *stars = (*stars).min(MAX_STARS);
        }
        self.total_stars = self.stars_sum();

        let frontier = self.completed_levels.iter().next_back().map_or(1, |&l| l + 1);
        self.current_level = self.current_level.max(frontier);

        *self != before
    }
}

/// Única fuente de verdad del progreso. Todas las pantallas leen de aquí.
pub struct ProgressStore {
    record: ProgressRecord,
    catalog: Arc<Catalog>,
    storage: Box<dyn ProgressStorage>,
    subscribers: Vec<Sender<ProgressRecord>>,
    last_persist_error: Option<StorageError>,
}

impl ProgressStore {
    /// Lee el registro guardado. Si falta o está corrupto arranca de cero.
    pub fn load(storage: Box<dyn ProgressStorage>, catalog: Arc<Catalog>) -> Self {
        let mut last_persist_error = None;

        let mut record = match storage.read() {
            Ok(None) => {
                log::info!("Sin progreso guardado; empezando de cero");
                ProgressRecord::default()
            }
            Ok(Some(blob)) => match serde_json::from_str::<ProgressRecord>(&blob) {
                Ok(record) => {
                    log::info!(
                        "Progreso restaurado: {} niveles, {} estrellas",
                        record.completed_count(),
                        record.total_stars()
                    );
                    record
                }
                Err(e) => {
                    log::warn!("Progreso guardado corrupto ({e}); se usa progreso vacío");
                    ProgressRecord::default()
                }
            },
            Err(e) => {
                log::warn!("No se pudo leer el progreso: {e}");
                last_persist_error = Some(e);
                ProgressRecord::default()
            }
        };

        if record.reconcile(&catalog) {
            log::warn!("Progreso guardado inconsistente; reparado contra el catálogo");
        }

        Self {
            record,
            catalog,
            storage,
            subscribers: Vec::new(),
            last_persist_error,
        }
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn snapshot(&self) -> ProgressRecord {
        self.record.clone()
    }

    /// Recibe una copia del registro tras cada modificación
    pub fn subscribe(&mut self) -> Receiver<ProgressRecord> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn last_persist_error(&self) -> Option<&StorageError> {
        self.last_persist_error.as_ref()
    }

    /// Registra un nivel terminado. Un nivel desconocido se rechaza sin tocar nada.
    /// La escritura en disco termina (o falla) antes de devolver.
    pub fn record_completion(
        &mut self,
        level_id: LevelId,
        stars_earned: u32,
    ) -> Result<CompletionUpdate, ProgressError> {
        if !self.catalog.contains_level(level_id) {
            log::warn!("Finalización rechazada: nivel {level_id} desconocido");
            return Err(ProgressError::UnknownLevel(level_id));
        }

        let mut update = self.record.apply_completion(level_id, stars_earned);
        log::info!(
            "Nivel {} completado: {} estrellas (+{}), total {}",
            level_id,
            update.stars,
            update.star_delta,
            self.record.total_stars()
        );

        update.persisted = self.persist();
        self.notify();
        Ok(update)
    }

    fn persist(&mut self) -> bool {
        let result = serde_json::to_string(&self.record)
            .map_err(StorageError::from)
            .and_then(|blob| self.storage.write(&blob));
        match result {
            Ok(()) => {
                self.last_persist_error = None;
                true
            }
            Err(e) => {
                // El estado en memoria sigue siendo válido para esta sesión
                log::warn!("No se pudo guardar el progreso: {e}");
                self.last_persist_error = Some(e);
                false
            }
        }
    }

    fn notify(&mut self) {
        let snapshot = &self.record;
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_catalog_embedded;

    struct BrokenStorage;

    impl ProgressStorage for BrokenStorage {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disco roto".into()))
        }
        fn write(&mut self, _blob: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disco roto".into()))
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(read_catalog_embedded().unwrap())
    }

    fn fresh_store() -> (ProgressStore, MemoryStorage) {
        let storage = MemoryStorage::default();
        let store = ProgressStore::load(Box::new(storage.clone()), catalog());
        (store, storage)
    }

    fn assert_total_matches_sum(record: &ProgressRecord) {
        assert_eq!(record.total_stars(), record.stars_sum());
    }

    #[test]
    fn fresh_record_is_empty() {
        let (store, _) = fresh_store();
        let record = store.record();
        assert!(record.completed_levels().is_empty());
        assert!(record.level_stars().is_empty());
        assert_eq!(record.total_stars(), 0);
        assert_eq!(record.current_level(), 1);
    }

    #[test]
    fn repeated_completion_is_idempotent() {
        let (mut store, _) = fresh_store();
        let first = store.record_completion(4, 2).unwrap();
        assert_eq!(first.star_delta, 2);
        assert!(first.first_completion);

        let after_first = store.snapshot();
        let second = store.record_completion(4, 2).unwrap();
        assert_eq!(second.star_delta, 0);
        assert!(!second.first_completion);
        assert_eq!(store.snapshot(), after_first);
    }

    #[test]
    fn worse_replay_keeps_best_stars() {
        let (mut store, _) = fresh_store();
        store.record_completion(5, 2).unwrap();
        let total = store.record().total_stars();
        store.record_completion(5, 1).unwrap();
        assert_eq!(store.record().stars_for(5), Some(2));
        assert_eq!(store.record().total_stars(), total);

        let better = store.record_completion(5, 3).unwrap();
        assert_eq!(better.star_delta, 1);
        assert_eq!(store.record().total_stars(), 3);
    }

    #[test]
    fn total_stars_always_matches_sum() {
        let (mut store, _) = fresh_store();
        let calls = [(1, 3), (2, 1), (2, 3), (3, 0), (1, 1), (7, 2), (3, 2), (7, 9)];
        for (level, stars) in calls {
            store.record_completion(level, stars).unwrap();
            assert_total_matches_sum(store.record());
        }
        assert_eq!(store.record().total_stars(), 3 + 3 + 2 + 3);
    }

    #[test]
    fn out_of_range_stars_are_clamped() {
        let (mut store, _) = fresh_store();
        let update = store.record_completion(1, 42).unwrap();
        assert_eq!(update.stars, 3);
        assert_eq!(store.record().total_stars(), 3);
    }

    #[test]
    fn current_level_tracks_frontier() {
        let (mut store, _) = fresh_store();
        store.record_completion(3, 1).unwrap();
        assert_eq!(store.record().current_level(), 4);
        store.record_completion(1, 1).unwrap();
        assert_eq!(store.record().current_level(), 4);
    }

    #[test]
    fn unknown_level_is_refused_without_changes() {
        let (mut store, storage) = fresh_store();
        let before = store.snapshot();
        assert_eq!(
            store.record_completion(101, 3),
            Err(ProgressError::UnknownLevel(101))
        );
        assert_eq!(store.snapshot(), before);
        assert!(storage.contents().is_none());
    }

    #[test]
    fn every_mutation_is_persisted_and_reloadable() {
        let (mut store, storage) = fresh_store();
        store.record_completion(1, 2).unwrap();
        store.record_completion(2, 3).unwrap();

        let blob = storage.contents().unwrap();
        assert!(blob.contains("\"completedLevels\":[1,2]"));
        assert!(blob.contains("\"totalStars\":5"));

        let reloaded = ProgressStore::load(Box::new(storage.clone()), catalog());
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let storage = MemoryStorage::with_blob(r#"{"completedLevels":[1]}"#);
        let store = ProgressStore::load(Box::new(storage), catalog());
        assert!(store.record().is_completed(1));
        assert_eq!(store.record().total_stars(), 0);
        assert_eq!(store.record().current_level(), 2);
    }

    #[test]
    fn malformed_blob_falls_back_to_default() {
        let storage = MemoryStorage::with_blob("{not json");
        let store = ProgressStore::load(Box::new(storage), catalog());
        assert_eq!(store.snapshot(), ProgressRecord::default());
        assert!(store.last_persist_error().is_none());
    }

    #[test]
    fn load_repairs_inconsistent_record() {
        let blob = r#"{
            "completedLevels": [1, 2, 500],
            "levelStars": {"1": 3, "2": 9, "3": 2},
            "currentLevel": 1,
            "totalStars": 77
        }"#;
        let store = ProgressStore::load(Box::new(MemoryStorage::with_blob(blob)), catalog());
        let record = store.record();
        assert_eq!(record.completed_levels().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(record.stars_for(2), Some(3));
        assert_eq!(record.stars_for(3), None);
        assert_eq!(record.total_stars(), 6);
        assert_eq!(record.current_level(), 3);
    }

    #[test]
    fn persistence_failure_keeps_memory_state() {
        let mut store = ProgressStore::load(Box::new(BrokenStorage), catalog());
        assert!(store.last_persist_error().is_some());

        let update = store.record_completion(1, 2).unwrap();
        assert!(!update.persisted);
        assert!(store.record().is_completed(1));
        assert_eq!(store.record().total_stars(), 2);
        assert!(store.last_persist_error().is_some());
    }

    #[test]
    fn subscribers_receive_snapshots() {
        let (mut store, _) = fresh_store();
        let rx = store.subscribe();
        let dropped = store.subscribe();
        drop(dropped);

        store.record_completion(1, 1).unwrap();
        let seen = rx.try_recv().unwrap();
        assert!(seen.is_completed(1));
        assert_eq!(store.subscribers.len(), 1);
    }
}
