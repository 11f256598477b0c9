pub mod entry;
pub mod entry_input;

pub use entry::{EntryKind, JournalEntry};
pub use entry_input::{
    CreateEntryInput, DeleteManyInput, EntryCreated, EntryMutationResponse, UpdateEntryInput,
};
