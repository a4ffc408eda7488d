//! Shared types for the RAK support intake form.
//!
//! `catalog` holds the static enumerations, `record` the in-progress
//! submission record and its partial-update type, and `wire` the JSON
//! bodies exchanged between the form client and the relay.

pub mod catalog;
pub mod record;
pub mod wire;

pub use catalog::DEVICE_MODELS;
pub use catalog::OTHER_DEVICE_MODEL;
pub use catalog::ProblemType;
pub use catalog::SupportMethod;
pub use catalog::UrgencyLevel;
pub use record::FileMeta;
pub use record::PatchError;
pub use record::RecordPatch;
pub use record::SupportRecord;
pub use record::TicketId;
pub use wire::REQUIRED_FIELDS;
pub use wire::RelayReply;
pub use wire::SupportPayload;

/// Returns `Some(trimmed)` when `value` has visible content.
///
/// Whitespace-only input counts as absent for every optional field.
pub fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
