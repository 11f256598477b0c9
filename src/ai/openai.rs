//! OpenAI-backed implementations of the AI ports. Both adapters share one
//! configured client; the model name comes from configuration.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use super::{EntryAnalysis, EntryAnalysisService, GenerationError, ReflectionPromptService};

const PROMPT_SYSTEM: &str = "You are an AI assistant that writes personalized reflection \
    prompts based on the titles of a user's past journal entries. Analyze the titles for \
    recurring themes, emotions and experiences. Based ONLY on the titles, respond with a \
    single, thought-provoking question that encourages the user to explore new perspectives. \
    Keep it concise. Respond with the question alone, no quotes, no explanation.";

const ANALYSIS_SYSTEM: &str = "You are an AI trained to analyze text and detect its \
    emotional tone. Analyze the journal entry and respond with a JSON object of the form \
    {\"summary\": \"...\", \"tone\": \"...\"}. The summary covers the main points in one or \
    two sentences. The tone is a short label such as positive, negative, neutral, angry, \
    sad or happy. Respond with JSON only, no markdown.";

pub struct OpenAiPromptAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiPromptAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl ReflectionPromptService for OpenAiPromptAdapter {
    async fn prompt_from_titles(&self, titles: &[String]) -> Result<String, GenerationError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(PROMPT_SYSTEM)
                    .build()
                    .map_err(|e| GenerationError::Backend(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(format!("Journal entry titles:\n\n{}", titles.join("\n")))
                    .build()
                    .map_err(|e| GenerationError::Backend(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(60u32)
            .temperature(0.7)
            .build()
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let prompt = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(GenerationError::EmptyResponse)?;

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(prompt.to_string())
    }
}

pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl EntryAnalysisService for OpenAiAnalysisAdapter {
    async fn analyze(&self, content: &str) -> Result<EntryAnalysis, GenerationError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(ANALYSIS_SYSTEM)
                    .build()
                    .map_err(|e| GenerationError::Backend(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(format!("Journal entry:\n\n{}", content))
                    .build()
                    .map_err(|e| GenerationError::Backend(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(200u32)
            .temperature(0.2)
            .build()
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let raw = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(GenerationError::EmptyResponse)?;

        parse_analysis(&raw)
    }
}

/// Models occasionally wrap JSON in a markdown fence despite instructions,
/// so tolerate that before parsing.
fn parse_analysis(raw: &str) -> Result<EntryAnalysis, GenerationError> {
    let body = strip_code_fence(raw.trim());
    serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
