use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("error de E/S en {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no se pudo serializar el progreso: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("almacenamiento no disponible: {0}")]
    Unavailable(String),
}

/// Almacén durable de un único registro (blob JSON).
pub trait ProgressStorage {
    /// `Ok(None)` si todavía no se ha guardado nada
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&mut self, blob: &str) -> Result<(), StorageError>;
}

/// Guarda el progreso en un fichero JSON local
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProgressStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&mut self, blob: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        // Escribe a un temporal y renombra: nunca queda un fichero a medias
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, blob).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

/// Almacén en memoria; los clones comparten el mismo contenido.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|b| b.clone())
    }
}

impl ProgressStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        self.blob
            .lock()
            .map(|b| b.clone())
            .map_err(|_| StorageError::Unavailable("mutex envenenado".into()))
    }

    fn write(&mut self, blob: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| StorageError::Unavailable("mutex envenenado".into()))?;
        *guard = Some(blob.to_string());
        Ok(())
    }
}
