// Wizard driver
//
// Field editors are external collaborators: given the active field's current
// pending value and its neighbors, they return the committed value and where
// to go next. `run_wizard` forwards each outcome into the session until the
// wizard closes.

use async_trait::async_trait;

use crate::agent::Attachment;
use crate::error::SessionError;
use crate::field::{FieldId, FieldKind};
use crate::files::FileSetDraft;
use crate::session::{EditSession, WizardState};

/// Current pending value handed to an editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDraft {
    /// Text or encoded list value
    Text(String),
    /// File-set working copy
    Files(FileSetDraft),
}

/// What an editor is asked to edit
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub field: FieldId,
    pub draft: FieldDraft,
    pub prev: Option<FieldId>,
    pub next: Option<FieldId>,
}

/// Value committed by an editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditedValue {
    Text(String),
    Files {
        new_files: Vec<Attachment>,
        deleted: Vec<String>,
    },
}

/// Result of one editor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Commit the value, then open `navigate_to` or close the wizard
    Commit {
        value: EditedValue,
        navigate_to: Option<FieldId>,
    },
    /// Leave the field untouched and close the wizard
    Cancel,
}

/// Errors from driving the wizard
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Editor failed: {0}")]
    Editor(#[source] anyhow::Error),
}

/// Trait for interactive field editors
///
/// Implementations validate their input before returning a commit.
#[async_trait]
pub trait FieldEditor: Send {
    async fn edit(&mut self, request: EditRequest) -> anyhow::Result<EditOutcome>;
}

impl EditSession {
    /// Request describing the active field, none while the wizard is closed
    pub fn edit_request(&self) -> Option<EditRequest> {
        let field = self.active_field()?;
        let draft = match field.kind() {
            FieldKind::FileSet => FieldDraft::Files(self.files_draft()),
            FieldKind::Text | FieldKind::DelimitedList => {
                FieldDraft::Text(self.pending(field).unwrap_or_default().to_string())
            }
        };
        Some(EditRequest {
            field,
            draft,
            prev: self.prev_field(),
            next: self.next_field(),
        })
    }

    /// Forward an editor outcome for `field` into the session
    pub fn apply_outcome(
        &mut self,
        field: FieldId,
        outcome: EditOutcome,
    ) -> Result<(), SessionError> {
        match outcome {
            EditOutcome::Cancel => {
                self.close();
                Ok(())
            }
            EditOutcome::Commit {
                value: EditedValue::Text(text),
                navigate_to,
            } => self.commit_field(field, text, navigate_to),
            EditOutcome::Commit {
                value: EditedValue::Files { new_files, deleted },
                navigate_to,
            } => self.commit_files(field, new_files, deleted, navigate_to),
        }
    }
}

/// Drive editors until the wizard closes
pub async fn run_wizard<E: FieldEditor + ?Sized>(
    session: &mut EditSession,
    editor: &mut E,
) -> Result<(), WizardError> {
    while let WizardState::Open(_) = session.state() {
        let Some(request) = session.edit_request() else {
            break;
        };
        let field = request.field;
        let outcome = editor.edit(request).await.map_err(WizardError::Editor)?;
        session.apply_outcome(field, outcome)?;
    }
    Ok(())
}
