//! Daily reflection prompt service.
//!
//! One personalized prompt per owner per calendar day. Prompts are cached
//! with the day they were generated for, so a stale entry can never serve
//! yesterday's question today. Fallback prompts are deliberately not
//! cached: the next request gets another chance to generate.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;

use crate::ai::ReflectionPromptService;
use crate::models::EntryKind;
use crate::store::{EntryStore, StorageError};

/// Served when the owner has no journal entries to draw themes from yet.
pub const STARTER_PROMPT: &str = "What are you grateful for today?";

/// Served when prompt generation fails.
pub const GENERATION_FALLBACK_PROMPT: &str = "What was the most significant moment of your day?";

/// Newest titles handed to the model as context.
const MAX_TITLE_CONTEXT: usize = 20;

const PROMPT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_CACHED_OWNERS: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedPrompt {
    text: String,
    day: NaiveDate,
}

pub struct DailyPromptService {
    store: Arc<dyn EntryStore>,
    model: Arc<dyn ReflectionPromptService>,
    cache: Cache<String, CachedPrompt>,
}

impl DailyPromptService {
    pub fn new(store: Arc<dyn EntryStore>, model: Arc<dyn ReflectionPromptService>) -> Self {
        let cache = Cache::builder()
            .time_to_live(PROMPT_TTL)
            .max_capacity(MAX_CACHED_OWNERS)
            .build();

        Self {
            store,
            model,
            cache,
        }
    }

    /// The owner's reflection prompt for `day`.
    ///
    /// The model sees journal entry titles only; reflection titles are
    /// formulaic and sealed bodies never leave the service. Generation
    /// failures degrade to a static fallback, storage failures surface to
    /// the caller.
    pub async fn prompt_for(&self, owner_id: &str, day: NaiveDate) -> Result<String, StorageError> {
        if let Some(cached) = self.cache.get(owner_id).await {
            if cached.day == day {
                tracing::debug!(owner_id, %day, "reflection prompt served from cache");
                return Ok(cached.text);
            }
        }

        let titles: Vec<String> = self
            .store
            .list(owner_id)
            .await?
            .iter()
            .filter(|e| e.kind == EntryKind::Journal)
            .take(MAX_TITLE_CONTEXT)
            .map(|e| e.title.clone())
            .collect();

        if titles.is_empty() {
            tracing::debug!(owner_id, "no journal entries yet, serving starter prompt");
            return Ok(STARTER_PROMPT.to_string());
        }

        match self.model.prompt_from_titles(&titles).await {
            Ok(text) => {
                self.cache
                    .insert(
                        owner_id.to_string(),
                        CachedPrompt {
                            text: text.clone(),
                            day,
                        },
                    )
                    .await;
                tracing::debug!(owner_id, %day, "generated and cached reflection prompt");
                Ok(text)
            }
            Err(e) => {
                tracing::warn!(owner_id, error = %e, "prompt generation failed, serving fallback");
                Ok(GENERATION_FALLBACK_PROMPT.to_string())
            }
        }
    }

    /// Drop the owner's cached prompt. Called after a reflection is
    /// submitted so the next prompt accounts for it.
    pub async fn invalidate(&self, owner_id: &str) {
        self.cache.invalidate(owner_id).await;
    }
}
