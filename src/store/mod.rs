//! Entry persistence façade.
//!
//! Every operation is scoped by the owner identifier carried in the
//! authenticated session; an entry belonging to someone else is
//! indistinguishable from one that does not exist.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{EntryKind, JournalEntry};

pub use postgres::PgEntryStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage operation failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Fields of an entry the caller supplies at creation. The id is assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub title: String,
    /// Sealed payload; the store never sees plaintext bodies.
    pub content: String,
    pub kind: EntryKind,
    pub date: DateTime<Utc>,
    pub summary: Option<String>,
    pub tone: Option<String>,
}

/// The only fields an update may touch. Owner, id, date and kind are not
/// expressible here, which is what makes them immutable.
#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    pub title: Option<String>,
    /// Re-sealed payload. Setting this clears any stored annotations,
    /// since they were derived from the previous plaintext.
    pub content: Option<String>,
}

/// Per-id result of a batch deletion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteOutcome {
    pub id: Uuid,
    pub deleted: bool,
    pub error: Option<String>,
}

/// One calendar day as a half-open UTC instant window.
///
/// `offset_minutes` is the client zone's offset east of UTC (+120 for
/// UTC+2, -300 for New York in winter), so "today" means the caller's
/// today, not the server's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// `None` when the day and offset would place the window outside the
    /// representable time range.
    pub fn for_day(day: NaiveDate, offset_minutes: i32) -> Option<Self> {
        let midnight = day.and_time(NaiveTime::MIN);
        let start = DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc)
            .checked_sub_signed(Duration::minutes(offset_minutes as i64))?;
        let end = start.checked_add_signed(Duration::days(1))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries of one owner, newest first. Unknown owners yield an
    /// empty list, not an error.
    async fn list(&self, owner_id: &str) -> Result<Vec<JournalEntry>, StorageError>;

    /// A single entry, or `None` when it does not exist *for this owner*.
    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<JournalEntry>, StorageError>;

    /// Persist a new entry and return its store-assigned id.
    async fn create(&self, owner_id: &str, entry: NewEntry) -> Result<Uuid, StorageError>;

    /// Apply `changes`, returning the updated row, or `None` when the entry
    /// does not exist for this owner.
    async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        changes: EntryChanges,
    ) -> Result<Option<JournalEntry>, StorageError>;

    /// Remove an entry. Idempotent: deleting an id that is already gone is
    /// success, reported as `false`.
    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool, StorageError>;

    /// The most recent reflection entry whose timestamp falls inside the
    /// given calendar-day window.
    async fn find_reflection_in(
        &self,
        owner_id: &str,
        window: DayWindow,
    ) -> Result<Option<JournalEntry>, StorageError>;

    /// Delete a batch of entries, each attempted independently: one failure
    /// never aborts the rest.
    async fn delete_many(&self, owner_id: &str, ids: &[Uuid]) -> Vec<DeleteOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            let outcome = match self.delete(owner_id, id).await {
                Ok(deleted) => DeleteOutcome {
                    id,
                    deleted,
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(%id, error = %e, "batch delete: entry failed, continuing");
                    DeleteOutcome {
                        id,
                        deleted: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_window_in_utc() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let w = DayWindow::for_day(day, 0).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2024-03-09T00:00:00+00:00");
        assert_eq!(w.end.to_rfc3339(), "2024-03-10T00:00:00+00:00");
        assert!(w.contains("2024-03-09T23:59:59Z".parse().unwrap()));
        assert!(!w.contains("2024-03-10T00:00:00Z".parse().unwrap()));
    }

    #[test]
    fn day_window_honors_zone_offset() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        // UTC+2: the caller's March 9 starts at 22:00 UTC on March 8.
        let east = DayWindow::for_day(day, 120).unwrap();
        assert_eq!(east.start.to_rfc3339(), "2024-03-08T22:00:00+00:00");

        // New York winter (UTC-5): it starts at 05:00 UTC on March 9.
        let west = DayWindow::for_day(day, -300).unwrap();
        assert_eq!(west.start.to_rfc3339(), "2024-03-09T05:00:00+00:00");
        assert!(west.contains("2024-03-10T04:59:00Z".parse().unwrap()));
    }

    #[test]
    fn day_window_refuses_the_calendar_edges() {
        assert!(DayWindow::for_day(NaiveDate::MAX, 0).is_none());
        assert!(DayWindow::for_day(NaiveDate::MAX, i32::MIN).is_none());
        assert!(DayWindow::for_day(NaiveDate::MIN, i32::MAX).is_none());
    }

    mod batch_delete {
        use super::*;
        use async_trait::async_trait;
        use std::collections::HashSet;

        /// Store double whose `delete` fails for designated ids.
        struct FlakyStore {
            existing: HashSet<Uuid>,
            failing: HashSet<Uuid>,
        }

        #[async_trait]
        impl EntryStore for FlakyStore {
            async fn list(&self, _: &str) -> Result<Vec<JournalEntry>, StorageError> {
                unreachable!("not exercised here")
            }
            async fn get(&self, _: &str, _: Uuid) -> Result<Option<JournalEntry>, StorageError> {
                unreachable!("not exercised here")
            }
            async fn create(&self, _: &str, _: NewEntry) -> Result<Uuid, StorageError> {
                unreachable!("not exercised here")
            }
            async fn update(
                &self,
                _: &str,
                _: Uuid,
                _: EntryChanges,
            ) -> Result<Option<JournalEntry>, StorageError> {
                unreachable!("not exercised here")
            }
            async fn delete(&self, _: &str, id: Uuid) -> Result<bool, StorageError> {
                if self.failing.contains(&id) {
                    return Err(StorageError::Unavailable("injected failure".into()));
                }
                Ok(self.existing.contains(&id))
            }
            async fn find_reflection_in(
                &self,
                _: &str,
                _: DayWindow,
            ) -> Result<Option<JournalEntry>, StorageError> {
                unreachable!("not exercised here")
            }
        }

        #[tokio::test]
        async fn missing_ids_do_not_block_real_ones() {
            let real = Uuid::new_v4();
            let ghost = Uuid::new_v4();
            let store = FlakyStore {
                existing: HashSet::from([real]),
                failing: HashSet::new(),
            };

            let outcomes = store.delete_many("owner-1", &[ghost, real]).await;
            assert_eq!(outcomes.len(), 2);
            assert!(!outcomes[0].deleted);
            assert!(outcomes[0].error.is_none());
            assert!(outcomes[1].deleted);
        }

        #[tokio::test]
        async fn one_failure_never_aborts_the_rest() {
            let poisoned = Uuid::new_v4();
            let fine = Uuid::new_v4();
            let store = FlakyStore {
                existing: HashSet::from([fine]),
                failing: HashSet::from([poisoned]),
            };

            let outcomes = store.delete_many("owner-1", &[poisoned, fine]).await;
            assert!(outcomes[0].error.is_some());
            assert!(!outcomes[0].deleted);
            assert!(outcomes[1].deleted, "later ids must still be attempted");
        }
    }
}
