pub mod services;

pub use services::drafter::{NoteDrafterService, GENERATED_NOTE_COLUMN};
