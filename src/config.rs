use crate::content::RetryPolicy;
use crate::unlock::DEFAULT_CHAPTER_THRESHOLD_PERCENT;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const APP_ID: &str = "quantum_quest";
const PROGRESS_FILE: &str = "quantum_progress.json";
/// Tope del contador de los retos contrarreloj (una hora)
pub const MAX_TIMER_SECS: u32 = 3_600;

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub content_endpoint: String,
    pub content_timeout: Duration,
    pub content_attempts: u32,
    pub manual_retries: u32,
    pub questions_per_level: usize,
    pub timer_secs: u32,
    pub progress_path: PathBuf,
    pub chapter_threshold_percent: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            content_endpoint: "http://127.0.0.1:8788/api/quiz".to_string(),
            content_timeout: Duration::from_secs(20),
            content_attempts: 3,
            manual_retries: 2,
            questions_per_level: 3,
            timer_secs: 60,
            progress_path: default_progress_path(),
            chapter_threshold_percent: DEFAULT_CHAPTER_THRESHOLD_PERCENT,
        }
    }
}

impl GameConfig {
    /// Lee `QUANTUM_QUEST_*` del entorno; lo que falte o no se entienda
    /// se queda con el valor por defecto.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = text_var(&lookup, "QUANTUM_QUEST_CONTENT_ENDPOINT") {
            config.content_endpoint = endpoint;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "QUANTUM_QUEST_CONTENT_TIMEOUT_SECS") {
            config.content_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(n) = parse_var::<u32>(&lookup, "QUANTUM_QUEST_CONTENT_ATTEMPTS") {
            config.content_attempts = n.max(1);
        }
        if let Some(n) = parse_var(&lookup, "QUANTUM_QUEST_MANUAL_RETRIES") {
            config.manual_retries = n;
        }
        if let Some(n) = parse_var::<usize>(&lookup, "QUANTUM_QUEST_QUESTIONS") {
            config.questions_per_level = n.max(1);
        }
        if let Some(n) = parse_var::<u32>(&lookup, "QUANTUM_QUEST_TIMER_SECS") {
            config.timer_secs = n.min(MAX_TIMER_SECS);
        }
        if let Some(path) = text_var(&lookup, "QUANTUM_QUEST_PROGRESS_PATH") {
            config.progress_path = PathBuf::from(path);
        }
        if let Some(pct) = parse_var::<u32>(&lookup, "QUANTUM_QUEST_CHAPTER_THRESHOLD") {
            config.chapter_threshold_percent = pct.min(100);
        }

        config
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.content_attempts,
            ..RetryPolicy::default()
        }
    }
}

fn text_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = text_var(lookup, key)?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("{key}={value} no es válido; se usa el valor por defecto");
            None
        }
    }
}

/// Junto al resto de datos de eframe si hay carpeta de datos; si no, en el directorio actual
#[cfg(not(target_arch = "wasm32"))]
fn default_progress_path() -> PathBuf {
    eframe::storage_dir(APP_ID)
        .map(|dir| dir.join(PROGRESS_FILE))
        .unwrap_or_else(|| PathBuf::from(PROGRESS_FILE))
}

#[cfg(target_arch = "wasm32")]
fn default_progress_path() -> PathBuf {
    PathBuf::from(PROGRESS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = GameConfig::from_lookup(|_| None);
        assert_eq!(config.content_attempts, 3);
        assert_eq!(config.manual_retries, 2);
        assert_eq!(config.chapter_threshold_percent, 80);
        assert!(config.progress_path.ends_with(PROGRESS_FILE));
    }

    #[test]
    fn reads_overrides() {
        let config = GameConfig::from_lookup(lookup(&[
            ("QUANTUM_QUEST_CONTENT_ENDPOINT", " https://quiz.example/api "),
            ("QUANTUM_QUEST_CONTENT_ATTEMPTS", "2"),
            ("QUANTUM_QUEST_TIMER_SECS", "45"),
            ("QUANTUM_QUEST_PROGRESS_PATH", "/tmp/p.json"),
            ("QUANTUM_QUEST_CHAPTER_THRESHOLD", "150"),
        ]));
        assert_eq!(config.content_endpoint, "https://quiz.example/api");
        assert_eq!(config.retry_policy().attempts, 2);
        assert_eq!(config.timer_secs, 45);
        assert_eq!(config.progress_path, PathBuf::from("/tmp/p.json"));
        assert_eq!(config.chapter_threshold_percent, 100);
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let config = GameConfig::from_lookup(lookup(&[
            ("QUANTUM_QUEST_CONTENT_ATTEMPTS", "muchos"),
            ("QUANTUM_QUEST_QUESTIONS", "0"),
        ]));
        assert_eq!(config.content_attempts, 3);
        assert_eq!(config.questions_per_level, 1);
    }

    #[test]
    fn timer_is_capped() {
        let config = GameConfig::from_lookup(lookup(&[("QUANTUM_QUEST_TIMER_SECS", "500000000")]));
        assert_eq!(config.timer_secs, MAX_TIMER_SECS);
    }
}
