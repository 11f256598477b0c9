use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    crypto,
    extractors::AuthenticatedUser,
    models::{
        CreateEntryInput, DeleteManyInput, EntryCreated, EntryKind, EntryMutationResponse,
        JournalEntry, UpdateEntryInput,
    },
    store::{DeleteOutcome, EntryChanges, NewEntry},
    AppError, AppResult, AppState,
};

/// GET /api/entries - List the authenticated owner's entries
#[utoipa::path(
    get,
    path = "/api/entries",
    responses(
        (status = 200, description = "Entries for the authenticated owner, newest first. Content is the sealed payload.", body = Vec<JournalEntry>),
        (status = 401, description = "Missing or invalid credentials")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let entries = state.store.list(&auth.owner_id).await?;
    Ok(Json(entries))
}

/// GET /api/entries/{id} - Fetch one entry with its content opened for display
#[utoipa::path(
    get,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "The entry, content decrypted for display", body = JournalEntry),
        (status = 404, description = "No such entry for this owner")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<JournalEntry>> {
    let mut entry = state
        .store
        .get(&auth.owner_id, entry_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;

    super::open_for_display(&mut entry, &auth.owner_id);

    Ok(Json(entry))
}

/// POST /api/entries - Create a new entry
#[utoipa::path(
    post,
    path = "/api/entries",
    request_body = CreateEntryInput,
    responses(
        (status = 200, description = "Entry created, id returned", body = EntryCreated),
        (status = 422, description = "Missing content or title")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<CreateEntryInput>,
) -> AppResult<Json<EntryCreated>> {
    if input.content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }

    let now = Utc::now();
    let title = match input.kind {
        EntryKind::Journal => match input.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(AppError::Validation(
                    "title is required for journal entries".to_string(),
                ))
            }
        },
        EntryKind::Reflection => match input.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Reflection - {}", now.date_naive()),
        },
    };

    // Annotations are derived from plaintext, so this must happen before
    // sealing. Best effort: a model outage never blocks a journal write.
    let (summary, tone) = if input.kind == EntryKind::Journal {
        match state.analysis.analyze(&input.content).await {
            Ok(analysis) => (Some(analysis.summary), Some(analysis.tone)),
            Err(e) => {
                tracing::warn!(error = %e, "entry analysis failed, storing without annotations");
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let sealed = crypto::seal(&input.content, &auth.owner_id)
        .map_err(|e| AppError::Internal(format!("Failed to seal entry content: {}", e)))?;

    let id = state
        .store
        .create(
            &auth.owner_id,
            NewEntry {
                title,
                content: sealed,
                kind: input.kind,
                date: now,
                summary,
                tone,
            },
        )
        .await?;

    if input.kind == EntryKind::Reflection {
        state.prompts.invalidate(&auth.owner_id).await;
        tracing::debug!(owner_id = %auth.owner_id, "reflection submitted, prompt cache invalidated");
    }

    tracing::info!(owner_id = %auth.owner_id, entry_id = %id, kind = ?input.kind, "entry created");

    Ok(Json(EntryCreated { id }))
}

/// PUT /api/entries/{id} - Update an entry's title and/or content
#[utoipa::path(
    put,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    request_body = UpdateEntryInput,
    responses(
        (status = 200, description = "Updated entry (content stays sealed)", body = JournalEntry),
        (status = 400, description = "Empty update"),
        (status = 404, description = "No such entry for this owner"),
        (status = 422, description = "Blank field or unknown field")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
    Json(input): Json<UpdateEntryInput>,
) -> AppResult<Json<JournalEntry>> {
    if input.title.is_none() && input.content.is_none() {
        return Err(AppError::BadRequest(
            "Nothing to update: provide title and/or content".to_string(),
        ));
    }

    let title = match input.title {
        Some(t) => {
            let t = t.trim().to_string();
            if t.is_empty() {
                return Err(AppError::Validation("title must not be empty".to_string()));
            }
            Some(t)
        }
        None => None,
    };

    let content = match input.content {
        Some(c) => {
            if c.trim().is_empty() {
                return Err(AppError::Validation("content must not be empty".to_string()));
            }
            let sealed = crypto::seal(&c, &auth.owner_id)
                .map_err(|e| AppError::Internal(format!("Failed to seal entry content: {}", e)))?;
            Some(sealed)
        }
        None => None,
    };

    let entry = state
        .store
        .update(&auth.owner_id, entry_id, EntryChanges { title, content })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;

    tracing::info!(owner_id = %auth.owner_id, entry_id = %entry_id, "entry updated");

    Ok(Json(entry))
}

/// DELETE /api/entries/{id} - Delete an entry (idempotent)
#[utoipa::path(
    delete,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Deletion outcome; deleting an absent entry is still success", body = EntryMutationResponse)
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<EntryMutationResponse>> {
    let deleted = state.store.delete(&auth.owner_id, entry_id).await?;

    if deleted {
        tracing::info!(owner_id = %auth.owner_id, entry_id = %entry_id, "entry deleted");
    }

    Ok(Json(EntryMutationResponse {
        success: true,
        message: Some(if deleted {
            "Entry deleted".to_string()
        } else {
            "Entry was already gone".to_string()
        }),
    }))
}

/// POST /api/entries/delete-many - Delete a batch of entries
#[utoipa::path(
    post,
    path = "/api/entries/delete-many",
    request_body = DeleteManyInput,
    responses(
        (status = 200, description = "Per-id outcomes; a failed id never aborts the rest", body = Vec<DeleteOutcome>)
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn delete_many_entries(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<DeleteManyInput>,
) -> AppResult<Json<Vec<DeleteOutcome>>> {
    let outcomes = state.store.delete_many(&auth.owner_id, &input.ids).await;

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    if failed > 0 {
        tracing::warn!(
            owner_id = %auth.owner_id,
            failed,
            total = outcomes.len(),
            "batch delete completed with failures"
        );
    }

    Ok(Json(outcomes))
}
