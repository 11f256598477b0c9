use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::EntryKind;

/// Input for creating an entry. Content arrives in plaintext and is sealed
/// server-side before it reaches the store; the title stays plaintext.
/// Reflections may omit the title (a dated default is filled in).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEntryInput {
    pub title: Option<String>,
    pub content: String,
    pub kind: EntryKind,
}

/// Input for updating an entry. Only title and content are mutable; any
/// other field in the body (id, owner, date, kind) is rejected outright.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateEntryInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Response for entry creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntryCreated {
    pub id: Uuid,
}

/// Response for entry mutations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntryMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Input for batch deletion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteManyInput {
    pub ids: Vec<Uuid>,
}
