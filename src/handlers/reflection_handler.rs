use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{
    extractors::AuthenticatedUser, models::JournalEntry, store::DayWindow, AppError, AppResult,
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PromptQuery {
    /// Caller's local calendar day, YYYY-MM-DD. Defaults to the UTC day.
    pub day: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyPromptResponse {
    pub prompt: String,
    pub day: NaiveDate,
}

/// GET /api/reflection/prompt?day=
#[utoipa::path(
    get,
    path = "/api/reflection/prompt",
    params(PromptQuery),
    responses(
        (status = 200, description = "The owner's reflection prompt for the day", body = DailyPromptResponse),
        (status = 400, description = "Invalid day format")
    ),
    tag = "reflection",
    security(("cookie_auth" = []))
)]
pub async fn daily_prompt(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<PromptQuery>,
) -> AppResult<Json<DailyPromptResponse>> {
    let day = parse_day(query.day.as_deref())?;
    let prompt = state.prompts.prompt_for(&auth.owner_id, day).await?;

    Ok(Json(DailyPromptResponse { prompt, day }))
}

/// Widest zone offset accepted, one full day either side of UTC.
const MAX_ZONE_OFFSET_MINUTES: i32 = 1440;

#[derive(Debug, Deserialize, IntoParams)]
pub struct TodayQuery {
    /// Caller's local calendar day, YYYY-MM-DD. Defaults to the UTC day.
    pub day: Option<String>,
    /// Caller's zone offset east of UTC in minutes. Defaults to 0.
    #[serde(rename = "offsetMinutes")]
    pub offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodayReflectionResponse {
    pub submitted: bool,
    pub entry: Option<JournalEntry>,
}

/// GET /api/reflection/today?day=&offsetMinutes=
///
/// Lets the UI show the already-written reflection instead of the prompt
/// form.
#[utoipa::path(
    get,
    path = "/api/reflection/today",
    params(TodayQuery),
    responses(
        (status = 200, description = "Whether a reflection exists for the day, with the entry opened for display", body = TodayReflectionResponse),
        (status = 400, description = "Invalid day or zone offset")
    ),
    tag = "reflection",
    security(("cookie_auth" = []))
)]
pub async fn todays_reflection(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<TodayQuery>,
) -> AppResult<Json<TodayReflectionResponse>> {
    let day = parse_day(query.day.as_deref())?;
    let offset_minutes = query.offset_minutes.unwrap_or(0);
    if !(-MAX_ZONE_OFFSET_MINUTES..=MAX_ZONE_OFFSET_MINUTES).contains(&offset_minutes) {
        return Err(AppError::BadRequest(format!(
            "Invalid offsetMinutes: {} is outside -1440..=1440",
            offset_minutes
        )));
    }
    let window = DayWindow::for_day(day, offset_minutes)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid day: {} is out of range", day)))?;

    let mut entry = state.store.find_reflection_in(&auth.owner_id, window).await?;
    if let Some(entry) = entry.as_mut() {
        super::open_for_display(entry, &auth.owner_id);
    }

    Ok(Json(TodayReflectionResponse {
        submitted: entry.is_some(),
        entry,
    }))
}

fn parse_day(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| AppError::BadRequest(format!("Invalid day: {}", e))),
        None => Ok(Utc::now().date_naive()),
    }
}
