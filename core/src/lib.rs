//! Root of the `support-core` library.
//!
//! Owns the multi-step intake flow (steps, store, validators and views),
//! the translation of a finished record into a ticket request, and the
//! client side of submission (gateway, session, configuration).

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the front end or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod attachments;
pub mod classify;
pub mod config;
pub mod gateway;
pub mod session;
pub mod step;
pub mod store;
pub mod summary;
pub mod translate;
pub mod validate;
pub mod views;

pub use attachments::AttachmentError;
pub use attachments::FileKind;
pub use classify::ClassifiedError;
pub use classify::ErrorKind;
pub use gateway::RelayGateway;
pub use gateway::TicketCreated;
pub use gateway::TicketGateway;
pub use session::SubmitError;
pub use session::SubmitReceipt;
pub use session::SupportSession;
pub use step::FlowOptions;
pub use step::Step;
pub use store::FormStore;
pub use store::NavigationError;
pub use translate::TicketEnvelope;
pub use translate::translate;
