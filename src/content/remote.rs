use super::{ContentError, ContentGenerator, QuizRequest};
use crate::model::QuizQuestion;
use serde::Deserialize;
use std::time::Duration;

/// El servicio puede responder `{"questions": [...]}` o directamente `[...]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuizPayload {
    Wrapped { questions: Vec<QuizQuestion> },
    Bare(Vec<QuizQuestion>),
}

/// Cliente HTTP bloqueante; se usa siempre desde el hilo de carga.
pub struct RemoteContentGenerator {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl RemoteContentGenerator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ContentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("QuantumQuest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ContentError::Transport(format!("no se pudo crear el cliente HTTP: {e}"))
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ContentGenerator for RemoteContentGenerator {
    fn generate_quiz(&self, request: &QuizRequest) -> Result<Vec<QuizQuestion>, ContentError> {
        let mut last_http_error = None;

        for candidate in endpoint_candidates(&self.endpoint) {
            let response = self
                .client
                .post(&candidate)
                .json(request)
                .send()
                .map_err(|e| ContentError::Transport(format!("{candidate}: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                log::debug!("{candidate} devolvió HTTP {status}");
                let error = ContentError::Http {
                    status: status.as_u16(),
                    body: body.trim().to_string(),
                };
                // Ruta equivocada: probamos la siguiente candidata
                if matches!(status.as_u16(), 404 | 405) {
                    last_http_error = Some(error);
                    continue;
                }
                return Err(error);
            }

            let text = response
                .text()
                .map_err(|e| {
                    ContentError::Transport(format!("no se pudo leer la respuesta: {e}"))
                })?;
            return parse_quiz_payload(&text);
        }

        Err(last_http_error
            .unwrap_or_else(|| ContentError::Transport("ningún endpoint respondió".into())))
    }
}

/// Acepta JSON envuelto en un bloque de código Markdown, como suelen
/// devolver los modelos de texto.
pub fn parse_quiz_payload(text: &str) -> Result<Vec<QuizQuestion>, ContentError> {
    let body = strip_code_fence(text);
    let payload: QuizPayload =
        serde_json::from_str(body).map_err(|e| ContentError::Malformed(e.to_string()))?;
    Ok(match payload {
        QuizPayload::Wrapped { questions } => questions,
        QuizPayload::Bare(questions) => questions,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Salta la etiqueta de lenguaje (```json)
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn endpoint_candidates(primary: &str) -> Vec<String> {
    fn push_unique(candidates: &mut Vec<String>, value: String) {
        if !value.trim().is_empty() && !candidates.iter().any(|c| c == &value) {
            candidates.push(value);
        }
    }

    fn split_origin(value: &str) -> Option<(&str, &str)> {
        let scheme = value.find("://")?;
        let path_start = value[scheme + 3..].find('/').map(|i| i + scheme + 3);
        match path_start {
            Some(i) => Some((&value[..i], &value[i..])),
            None => Some((value, "")),
        }
    }

    let primary = primary.trim().trim_end_matches('/').to_string();
    let mut candidates = Vec::new();
    push_unique(&mut candidates, primary.clone());

    if let Some((origin, path)) = split_origin(&primary) {
        if matches!(path, "" | "/api/quiz" | "/quiz") {
            for suffix in ["/api/quiz", "/quiz"] {
                push_unique(&mut candidates, format!("{origin}{suffix}"));
            }
        }
    }

    candidates
}
