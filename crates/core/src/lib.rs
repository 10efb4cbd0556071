// Agent Edit Sessions
//
// This crate provides a transport-agnostic engine for editing an agent's
// configuration field by field (name, instructions, welcome message,
// suggested prompts, files) and saving it to a backend.
//
// Key design decisions:
// - Uses traits (AgentStore, FieldEditor) for pluggable backends and editors
// - Pending values are separate from the server-confirmed baseline; only an
//   acknowledged save moves pending into baseline
// - At most one save per session is in flight
// - Editors validate input; the session only stores what they commit
// - Domain entity types (AgentRecord, ChatAgent, Attachment) are defined here

// Domain entity types
pub mod agent;
pub mod field;

// Value codecs and views
pub mod display;
pub mod files;
pub mod prompts;
pub mod validation;

pub mod error;
pub mod session;
pub mod traits;
pub mod wizard;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use agent::{AgentRecord, Attachment, ChatAgent};
pub use display::{DisplayStyle, FieldDisplay, FileRow, FileRowState};
pub use error::{Result, SaveError, SessionError, StoreError};
pub use field::{FieldId, FieldKind, FieldList};
pub use files::FileSetDraft;
pub use memory::InMemoryAgentStore;
pub use prompts::SuggestedPrompts;
pub use session::{EditSession, SavePayload, WizardState};
pub use traits::{AgentStore, StoreResult};
pub use validation::ValidationError;
pub use wizard::{
    run_wizard, EditOutcome, EditRequest, EditedValue, FieldDraft, FieldEditor, WizardError,
};
