//! Shared doubles for handler tests: an in-memory store and scripted AI
//! collaborators wired into a real `AppState`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::State, Json};
use metrics_exporter_prometheus::PrometheusBuilder;
use uuid::Uuid;

use crate::ai::{EntryAnalysis, EntryAnalysisService, GenerationError, ReflectionPromptService};
use crate::auth::JwksCache;
use crate::extractors::AuthenticatedUser;
use crate::handlers::entries_handler::create_entry;
use crate::handlers::MetricsState;
use crate::models::{CreateEntryInput, EntryKind, JournalEntry};
use crate::reflection::DailyPromptService;
use crate::store::{DayWindow, EntryChanges, EntryStore, NewEntry, StorageError};
use crate::{AppConfig, AppState};

#[derive(Default)]
pub(crate) struct MemoryStore {
    pub(crate) rows: Mutex<HashMap<Uuid, JournalEntry>>,
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<JournalEntry>, StorageError> {
        let mut entries: Vec<JournalEntry> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<JournalEntry>, StorageError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&id)
            .filter(|e| e.owner_id == owner_id)
            .cloned())
    }

    async fn create(&self, owner_id: &str, entry: NewEntry) -> Result<Uuid, StorageError> {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().insert(
            id,
            JournalEntry {
                id,
                owner_id: owner_id.to_string(),
                date: entry.date,
                title: entry.title,
                content: entry.content,
                kind: entry.kind,
                summary: entry.summary,
                tone: entry.tone,
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        changes: EntryChanges,
    ) -> Result<Option<JournalEntry>, StorageError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&id).filter(|e| e.owner_id == owner_id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(content) = changes.content {
            row.content = content;
            row.summary = None;
            row.tone = None;
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool, StorageError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get(&id) {
            Some(e) if e.owner_id == owner_id => {
                rows.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_reflection_in(
        &self,
        owner_id: &str,
        window: DayWindow,
    ) -> Result<Option<JournalEntry>, StorageError> {
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<JournalEntry> = rows
            .values()
            .filter(|e| {
                e.owner_id == owner_id
                    && e.kind == EntryKind::Reflection
                    && window.contains(e.date)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found.into_iter().next())
    }
}

pub(crate) struct FixedAnalysis {
    pub(crate) calls: AtomicUsize,
    fail: bool,
}

impl FixedAnalysis {
    pub(crate) fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }
}

#[async_trait]
impl EntryAnalysisService for FixedAnalysis {
    async fn analyze(&self, _content: &str) -> Result<EntryAnalysis, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError::Backend("model down".into()));
        }
        Ok(EntryAnalysis {
            summary: "A short summary.".to_string(),
            tone: "positive".to_string(),
        })
    }
}

pub(crate) struct PromptModelSpy {
    pub(crate) calls: AtomicUsize,
}

#[async_trait]
impl ReflectionPromptService for PromptModelSpy {
    async fn prompt_from_titles(&self, _titles: &[String]) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("What keeps coming back to you?".to_string())
    }
}

pub(crate) struct TestEnv {
    pub(crate) state: Arc<AppState>,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) analysis: Arc<FixedAnalysis>,
    pub(crate) prompt_model: Arc<PromptModelSpy>,
}

pub(crate) fn env_with(analysis: Arc<FixedAnalysis>) -> TestEnv {
    let store = Arc::new(MemoryStore::default());
    let prompt_model = Arc::new(PromptModelSpy {
        calls: AtomicUsize::new(0),
    });

    let store_dyn: Arc<dyn EntryStore> = store.clone();
    let prompts = Arc::new(DailyPromptService::new(
        store_dyn.clone(),
        prompt_model.clone(),
    ));

    // Recorder is built but not installed so parallel tests never fight
    // over the global one.
    let metrics = Arc::new(MetricsState {
        handle: PrometheusBuilder::new().build_recorder().handle(),
    });

    let config = AppConfig {
        database_url: "postgres://unused".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        allowed_origin: "http://localhost:3000".to_string(),
        auth_issuer: "https://issuer.test".to_string(),
        auth_audience: "journely-test".to_string(),
        auth_jwks_url: "https://issuer.test/.well-known/jwks.json".to_string(),
        openai_api_key: "test-key".to_string(),
        prompt_model: "test-model".to_string(),
        analysis_model: "test-model".to_string(),
    };

    let state = Arc::new(AppState {
        store: store_dyn,
        jwks_cache: Arc::new(JwksCache::new(config.auth_jwks_url.clone())),
        prompts,
        analysis: analysis.clone(),
        config,
        metrics,
    });

    TestEnv {
        state,
        store,
        analysis,
        prompt_model,
    }
}

pub(crate) fn user(owner: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        owner_id: owner.to_string(),
        email: None,
    }
}

pub(crate) async fn create_journal(env: &TestEnv, owner: &str, title: &str, content: &str) -> Uuid {
    let Json(created) = create_entry(
        State(env.state.clone()),
        user(owner),
        Json(CreateEntryInput {
            title: Some(title.to_string()),
            content: content.to_string(),
            kind: EntryKind::Journal,
        }),
    )
    .await
    .unwrap();
    created.id
}

pub(crate) async fn create_reflection(env: &TestEnv, owner: &str, content: &str) -> Uuid {
    let Json(created) = create_entry(
        State(env.state.clone()),
        user(owner),
        Json(CreateEntryInput {
            title: None,
            content: content.to_string(),
            kind: EntryKind::Reflection,
        }),
    )
    .await
    .unwrap();
    created.id
}
