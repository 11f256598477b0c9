use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Dashboard grouping of an entry. Fixed at creation, stored as an explicit
/// tag, never inferred from other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "entry_kind", rename_all = "lowercase")]
pub enum EntryKind {
    Journal,
    Reflection,
}

/// One unit of user-authored content.
///
/// `content` is a sealed payload (base64 nonce+ciphertext, see
/// `crate::crypto`); the store and the AI collaborators treat it as opaque.
/// `title` stays plaintext because it feeds reflection-prompt generation.
/// `summary`/`tone` are derived from the plaintext body at creation time,
/// strictly before sealing, and cleared when the body changes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JournalEntry {
    pub id: Uuid,
    pub owner_id: String,
    pub date: DateTime<Utc>,
    pub title: String,
    pub content: String,
    pub kind: EntryKind,
    pub summary: Option<String>,
    pub tone: Option<String>,
}
