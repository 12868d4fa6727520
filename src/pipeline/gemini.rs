use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract::extract_json;
use super::image::ImagePayload;
use super::PipelineError;
use crate::config::InferenceConfig;

/// Finish reasons meaning the service withheld generated text.
const WITHHELD_FINISH_REASONS: &[&str] =
    &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII", "RECITATION"];

/// One multimodal generation call (allows mocking).
pub trait InferenceClient {
    /// Send `prompt` plus `image` and return the JSON object the model produced.
    ///
    /// Exactly one request per call, no retries.
    fn generate(
        &self,
        credential: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<Value, PipelineError>;
}

// ──────────────────────────────────────────────
// Wire types (generateContent)
// ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Image { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
    #[serde(rename = "thinkingConfig", skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
struct ThinkingConfig {
    #[serde(rename = "thinkingBudget")]
    thinking_budget: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// ──────────────────────────────────────────────
// Response interpretation (pure)
// ──────────────────────────────────────────────

/// Human-readable message for a non-success status.
pub fn transport_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Inference service returned HTTP {status}"))
}

/// Pull the generated text out of a successful response body.
pub fn response_text(body: &str) -> Result<String, PipelineError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|_| PipelineError::EmptyResponse)?;

    if parsed
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
        .is_some()
    {
        return Err(PipelineError::ContentWithheld);
    }

    let candidate = parsed.candidates.first().ok_or(PipelineError::EmptyResponse)?;
    let text: String = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        let withheld = candidate
            .finish_reason
            .as_deref()
            .is_some_and(|r| WITHHELD_FINISH_REASONS.contains(&r));
        return Err(if withheld {
            PipelineError::ContentWithheld
        } else {
            PipelineError::EmptyResponse
        });
    }

    Ok(text)
}

// ──────────────────────────────────────────────
// GeminiClient
// ──────────────────────────────────────────────

/// Blocking client for the hosted `generateContent` endpoint.
pub struct GeminiClient {
    config: InferenceConfig,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(config: InferenceConfig) -> Result<Self, PipelineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Transport(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self, PipelineError> {
        Self::new(InferenceConfig::from_env())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body<'a>(&self, prompt: &'a str, image: &'a ImagePayload) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: image.mime_type(),
                            data: image.encoded_bytes(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: self.config.temperature,
                thinking_config: self
                    .config
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            },
        }
    }
}

impl InferenceClient for GeminiClient {
    fn generate(
        &self,
        credential: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<Value, PipelineError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(PipelineError::NoCredential);
        }

        let _span = tracing::info_span!(
            "inference_call",
            model = %self.config.model,
            mime = image.mime_type(),
            prompt_len = prompt.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", credential)])
            .json(&self.request_body(prompt, image))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    PipelineError::Transport(format!(
                        "Request timed out after {}s",
                        self.config.timeout_secs
                    ))
                } else if e.is_connect() {
                    PipelineError::Transport("Could not reach the inference service".into())
                } else {
                    PipelineError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| PipelineError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = transport_error_message(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), %message, "Inference call failed");
            return Err(PipelineError::Transport(message));
        }

        let text = response_text(&body)?;
        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = text.len(),
            "Inference call complete"
        );

        extract_json(&text).ok_or(PipelineError::UnparseableResponse)
    }
}

// ──────────────────────────────────────────────
// MockInferenceClient
// ──────────────────────────────────────────────

/// Mock client for testing. Replays queued results and counts calls.
#[derive(Default)]
pub struct MockInferenceClient {
    responses: Mutex<VecDeque<Result<Value, PipelineError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, value: Value) -> Self {
        self.push(Ok(value));
        self
    }

    pub fn with_error(self, error: PipelineError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, result: Result<Value, PipelineError>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(result);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl InferenceClient for MockInferenceClient {
    fn generate(
        &self,
        credential: &str,
        prompt: &str,
        _image: &ImagePayload,
    ) -> Result<Value, PipelineError> {
        if credential.trim().is_empty() {
            return Err(PipelineError::NoCredential);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or(Err(PipelineError::EmptyResponse))
    }
}
