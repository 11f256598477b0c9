pub mod entries_handler;
pub mod health;
pub mod metrics;
pub mod reflection_handler;

#[cfg(test)]
pub(crate) mod testing;

pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};

use crate::{crypto, models::JournalEntry};

/// Shown in place of a body that cannot be decrypted.
pub const DECRYPT_PLACEHOLDER: &str = "Could not decrypt this entry.";

/// Swap the sealed body for plaintext before an entry leaves the API on a
/// display path. A payload that will not open becomes a visible placeholder;
/// ciphertext is never passed off as the entry text and the request never
/// fails for it.
pub fn open_for_display(entry: &mut JournalEntry, owner_secret: &str) {
    match crypto::open(&entry.content, owner_secret) {
        Ok(plaintext) => entry.content = plaintext,
        Err(e) => {
            tracing::warn!(entry_id = %entry.id, error = %e, "entry content failed to decrypt, substituting placeholder");
            entry.content = DECRYPT_PLACEHOLDER.to_string();
        }
    }
}
