use serde::{Deserialize, Serialize};

// ─── GenerationParams ─────────────────────────────────────────────────────

/// Per-call generation parameters.
///
/// `model` is the provider-side deployment name (Azure routes by deployment,
/// not by model family).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    pub fn new(model: impl Into<String>, temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_output_tokens,
        }
    }
}

// ─── Chat completions wire format ─────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// Single-turn request: the whole prompt goes in one user message.
    pub(crate) fn single_turn(prompt: &'a str, params: &GenerationParams) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_output_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if the provider produced any.
    pub(crate) fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub(crate) fn finish_reason(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.finish_reason.as_deref())
    }
}
