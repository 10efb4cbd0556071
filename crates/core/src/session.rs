// Field edit session
//
// An EditSession holds an agent's server-confirmed baseline next to the
// pending values the user has committed field by field, sequences the
// wizard over the session's FieldList and produces the save payload.
//
// Pending values only become baseline through `apply_server_baseline`, after
// the backend acknowledged a save. At most one save per session is in flight;
// while it is, mutations are rejected with `SessionError::SaveInFlight`.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::agent::{AgentRecord, Attachment};
use crate::display::{self, FieldDisplay, FileRow};
use crate::error::{Result, SaveError, SessionError};
use crate::field::{FieldId, FieldKind, FieldList};
use crate::files::{self, FileSetDraft};
use crate::traits::AgentStore;

/// Wizard state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Closed,
    Open(FieldId),
}

/// Text-valued fields of an agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TextFields {
    name: String,
    instructions: String,
    welcome_message: String,
    suggested_prompts: String,
}

impl TextFields {
    fn from_record(record: &AgentRecord) -> Self {
        Self {
            name: record.name.clone(),
            instructions: record.instructions.clone(),
            welcome_message: record.welcome_message.clone(),
            suggested_prompts: record.suggested_prompts.clone(),
        }
    }

    fn get(&self, field: FieldId) -> Option<&str> {
        match field {
            FieldId::Name => Some(&self.name),
            FieldId::Instructions => Some(&self.instructions),
            FieldId::WelcomeMessage => Some(&self.welcome_message),
            FieldId::SuggestedPrompts => Some(&self.suggested_prompts),
            FieldId::Files => None,
        }
    }

    fn slot_mut(&mut self, field: FieldId) -> Option<&mut String> {
        match field {
            FieldId::Name => Some(&mut self.name),
            FieldId::Instructions => Some(&mut self.instructions),
            FieldId::WelcomeMessage => Some(&mut self.welcome_message),
            FieldId::SuggestedPrompts => Some(&mut self.suggested_prompts),
            FieldId::Files => None,
        }
    }
}

/// Scheduled auto-open of a field (the idle hint on new agents)
#[derive(Debug, Clone, Copy)]
struct OpenHint {
    field: FieldId,
    due: Instant,
}

/// Everything the backend needs to persist a session's pending state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavePayload {
    pub name: String,
    pub instructions: String,
    pub welcome_message: String,
    pub suggested_prompts: String,
    pub new_files: Vec<Attachment>,
    /// Comma-joined names of baseline files to delete
    pub deleted_files: String,
}

impl SavePayload {
    /// Text form fields in the order the backend reads them
    pub fn form_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("name", &self.name),
            ("instructions", &self.instructions),
            ("welcome_message", &self.welcome_message),
            ("suggested_prompts", &self.suggested_prompts),
            ("deleted_files", &self.deleted_files),
        ]
    }

    /// Names of baseline files marked for deletion
    pub fn deleted_names(&self) -> Vec<String> {
        files::split_names(&self.deleted_files)
    }
}

/// Edit session over one agent
#[derive(Debug, Clone)]
pub struct EditSession {
    baseline: AgentRecord,
    baseline_text: TextFields,
    pending: TextFields,
    new_files: Vec<Attachment>,
    deleted_files: Vec<String>,
    /// Effective comma-joined file names after pending file edits
    pending_files: String,
    field_list: FieldList,
    state: WizardState,
    is_new: bool,
    dirty: bool,
    save_in_flight: bool,
    hint: Option<OpenHint>,
}

impl EditSession {
    /// Session for an agent that does not exist yet
    pub fn new_entity() -> Self {
        Self::build(AgentRecord::default(), true)
    }

    /// Session for an agent fetched from the backend
    pub fn for_record(record: AgentRecord) -> Self {
        Self::build(record, false)
    }

    /// Fetch an agent and open a session on it
    pub async fn open_existing<S: AgentStore + ?Sized>(
        store: &S,
        name: &str,
    ) -> std::result::Result<Self, crate::error::StoreError> {
        let record = store.fetch_agent(name).await?;
        Ok(Self::for_record(record))
    }

    fn build(record: AgentRecord, is_new: bool) -> Self {
        let baseline_text = TextFields::from_record(&record);
        Self {
            field_list: FieldList::for_entity(!is_new && !record.name.is_empty()),
            pending: baseline_text.clone(),
            baseline_text,
            pending_files: record.files.clone(),
            baseline: record,
            new_files: Vec::new(),
            deleted_files: Vec::new(),
            state: WizardState::Closed,
            is_new,
            dirty: false,
            save_in_flight: false,
            hint: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn baseline(&self) -> &AgentRecord {
        &self.baseline
    }

    /// Name the backend knows this agent by, none until first saved
    pub fn agent_name(&self) -> Option<&str> {
        if self.is_new {
            None
        } else {
            Some(&self.baseline.name)
        }
    }

    /// Pending value of a text or list field; `None` for the file-set
    pub fn pending(&self, field: FieldId) -> Option<&str> {
        self.pending.get(field)
    }

    /// Baseline value of a text or list field; `None` for the file-set
    pub fn baseline_value(&self, field: FieldId) -> Option<&str> {
        self.baseline_text.get(field)
    }

    pub fn baseline_files(&self) -> Vec<String> {
        self.baseline.file_names()
    }

    pub fn new_files(&self) -> &[Attachment] {
        &self.new_files
    }

    pub fn deleted_files(&self) -> &[String] {
        &self.deleted_files
    }

    pub fn field_list(&self) -> &FieldList {
        &self.field_list
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn active_field(&self) -> Option<FieldId> {
        match self.state {
            WizardState::Open(field) => Some(field),
            WizardState::Closed => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_new_entity(&self) -> bool {
        self.is_new
    }

    pub fn is_save_in_flight(&self) -> bool {
        self.save_in_flight
    }

    /// False while the backend is still processing the agent's files
    pub fn is_editable(&self) -> bool {
        !self.baseline.is_processing()
    }

    // ------------------------------------------------------------------
    // Wizard navigation
    // ------------------------------------------------------------------

    /// Open a field's editor, cancelling any scheduled auto-open
    pub fn open(&mut self, field: FieldId) -> Result<()> {
        if !self.field_list.contains(field) {
            return Err(SessionError::NotInFieldList(field));
        }
        self.hint = None;
        if self.state != WizardState::Open(field) {
            tracing::debug!(field = %field, "Opening field");
            self.state = WizardState::Open(field);
        }
        Ok(())
    }

    /// Close the wizard; pending values are kept
    pub fn close(&mut self) {
        self.hint = None;
        if self.state != WizardState::Closed {
            tracing::debug!("Closing wizard");
        }
        self.state = WizardState::Closed;
    }

    /// Field before the active one
    pub fn prev_field(&self) -> Option<FieldId> {
        self.active_field().and_then(|f| self.field_list.prev(f))
    }

    /// Field after the active one
    pub fn next_field(&self) -> Option<FieldId> {
        self.active_field().and_then(|f| self.field_list.next(f))
    }

    /// Schedule `field` to open after `delay` unless the user opens something first
    pub fn schedule_open(&mut self, field: FieldId, delay: Duration) -> Result<()> {
        if !self.field_list.contains(field) {
            return Err(SessionError::NotInFieldList(field));
        }
        self.hint = Some(OpenHint {
            field,
            due: Instant::now() + delay,
        });
        Ok(())
    }

    /// When the scheduled auto-open is due
    pub fn hint_deadline(&self) -> Option<Instant> {
        self.hint.map(|h| h.due)
    }

    /// Open the scheduled field if its deadline has passed and the wizard is closed
    pub fn fire_due_hint(&mut self, now: Instant) -> Option<FieldId> {
        let hint = self.hint?;
        if hint.due > now {
            return None;
        }
        self.hint = None;
        if self.state != WizardState::Closed {
            return None;
        }
        tracing::debug!(field = %hint.field, "Auto-opening field");
        self.state = WizardState::Open(hint.field);
        Some(hint.field)
    }

    // ------------------------------------------------------------------
    // Commits
    // ------------------------------------------------------------------

    /// Store an editor's value for the active field and move the wizard
    pub fn commit_field(
        &mut self,
        field: FieldId,
        value: impl Into<String>,
        navigate_to: Option<FieldId>,
    ) -> Result<()> {
        self.check_commit(field, navigate_to)?;
        let slot = self
            .pending
            .slot_mut(field)
            .ok_or(SessionError::WrongFieldKind(field))?;
        *slot = value.into();
        self.after_commit(field, navigate_to);
        Ok(())
    }

    /// Store the files editor's result and move the wizard
    ///
    /// `new_files` replaces the pending attachments (names colliding with
    /// baseline files or each other are dropped); `deleted` replaces the set
    /// of baseline names marked for deletion.
    pub fn commit_files(
        &mut self,
        field: FieldId,
        new_files: Vec<Attachment>,
        deleted: Vec<String>,
        navigate_to: Option<FieldId>,
    ) -> Result<()> {
        self.check_commit(field, navigate_to)?;
        if field.kind() != FieldKind::FileSet {
            return Err(SessionError::WrongFieldKind(field));
        }
        let existing = self.baseline.file_names();
        self.new_files = files::dedup_attachments(&existing, new_files);
        self.deleted_files = files::normalize_deleted(&existing, deleted);
        self.pending_files = if self.new_files.is_empty() && self.deleted_files.is_empty() {
            self.baseline.files.clone()
        } else {
            let kept = existing
                .iter()
                .filter(|name| !self.deleted_files.contains(name))
                .cloned();
            let added = self.new_files.iter().map(|f| f.name.clone());
            files::join_names(&kept.chain(added).collect::<Vec<_>>())
        };
        self.after_commit(field, navigate_to);
        Ok(())
    }

    fn check_commit(&self, field: FieldId, navigate_to: Option<FieldId>) -> Result<()> {
        if self.save_in_flight {
            return Err(SessionError::SaveInFlight);
        }
        if self.state != WizardState::Open(field) {
            return Err(SessionError::NotActive { field });
        }
        if let Some(next) = navigate_to {
            if !self.field_list.contains(next) {
                return Err(SessionError::NotInFieldList(next));
            }
        }
        Ok(())
    }

    fn after_commit(&mut self, field: FieldId, navigate_to: Option<FieldId>) {
        self.recompute_dirty();
        tracing::debug!(field = %field, dirty = self.dirty, "Committed field");
        match navigate_to {
            Some(next) => self.state = WizardState::Open(next),
            None => self.close(),
        }
    }

    fn recompute_dirty(&mut self) {
        self.dirty = self.pending != self.baseline_text
            || !self.new_files.is_empty()
            || !self.deleted_files.is_empty();
    }

    /// Discard every pending edit
    pub fn reset(&mut self) -> Result<()> {
        if self.save_in_flight {
            return Err(SessionError::SaveInFlight);
        }
        self.discard_pending();
        tracing::debug!("Session reset");
        Ok(())
    }

    fn discard_pending(&mut self) {
        self.pending = self.baseline_text.clone();
        self.new_files.clear();
        self.deleted_files.clear();
        self.pending_files = self.baseline.files.clone();
        self.dirty = false;
        self.hint = None;
        self.state = WizardState::Closed;
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Payload carrying every pending value
    pub fn build_save_payload(&self) -> SavePayload {
        SavePayload {
            name: self.pending.name.clone(),
            instructions: self.pending.instructions.clone(),
            welcome_message: self.pending.welcome_message.clone(),
            suggested_prompts: self.pending.suggested_prompts.clone(),
            new_files: self.new_files.clone(),
            deleted_files: files::join_names(&self.deleted_files),
        }
    }

    /// Mark a save as in flight and hand out its payload
    pub fn begin_save(&mut self) -> Result<SavePayload> {
        if self.save_in_flight {
            return Err(SessionError::SaveInFlight);
        }
        self.save_in_flight = true;
        Ok(self.build_save_payload())
    }

    /// Give up on the in-flight save; pending values stay for a retry
    pub fn abort_save(&mut self) {
        self.save_in_flight = false;
    }

    /// Adopt the backend's record as the new baseline and start over
    pub fn apply_server_baseline(&mut self, record: AgentRecord) {
        tracing::info!(agent = %record.name, "Applying saved agent as baseline");
        self.baseline_text = TextFields::from_record(&record);
        self.field_list = FieldList::for_entity(!record.name.is_empty());
        self.is_new = record.name.is_empty();
        self.baseline = record;
        self.save_in_flight = false;
        self.discard_pending();
    }

    /// Save pending values through `store`, adopting the result on success
    pub async fn save<S: AgentStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> std::result::Result<&AgentRecord, SaveError> {
        let payload = self.begin_save()?;
        let name = self.agent_name().map(str::to_string);

        match store.save_agent(name.as_deref(), &payload).await {
            Ok(record) => {
                self.apply_server_baseline(record);
                Ok(&self.baseline)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Save failed, keeping pending edits");
                self.abort_save();
                Err(err.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    fn placeholder(&self, field: FieldId) -> &'static str {
        if self.is_new {
            field.example_placeholder()
        } else {
            field.empty_placeholder()
        }
    }

    /// What a field's read-only view shows
    pub fn display(&self, field: FieldId) -> FieldDisplay<'_> {
        let placeholder = self.placeholder(field);
        match (self.baseline_text.get(field), self.pending.get(field)) {
            (Some(baseline), Some(pending)) => display::resolve(baseline, pending, placeholder),
            _ => display::resolve(&self.baseline.files, &self.pending_files, placeholder),
        }
    }

    /// Numbered listing of baseline files and pending attachments
    pub fn file_rows(&self) -> Vec<FileRow> {
        let new_names: Vec<&str> = self.new_files.iter().map(|f| f.name.as_str()).collect();
        display::file_rows(&self.baseline.file_names(), &new_names, &self.deleted_files)
    }

    /// Working copy for the files editor
    pub fn files_draft(&self) -> FileSetDraft {
        FileSetDraft::new(
            self.baseline.file_names(),
            self.new_files.clone(),
            self.deleted_files.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted() -> AgentRecord {
        AgentRecord {
            name: "policy-bot".to_string(),
            instructions: "Answer from the documents.".to_string(),
            welcome_message: "Hi!".to_string(),
            suggested_prompts: "How do I file a claim?".to_string(),
            files: "a.txt, b.txt".to_string(),
            ..Default::default()
        }
    }

    fn attachment(name: &str) -> Attachment {
        Attachment::new(name, b"data".to_vec())
    }

    #[test]
    fn test_update_session_omits_name() {
        let session = EditSession::for_record(persisted());
        assert!(!session.is_new_entity());
        assert_eq!(session.agent_name(), Some("policy-bot"));
        assert!(!session.field_list().contains(FieldId::Name));
        assert_eq!(session.state(), WizardState::Closed);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_new_session_starts_with_name() {
        let session = EditSession::new_entity();
        assert!(session.is_new_entity());
        assert_eq!(session.agent_name(), None);
        assert_eq!(session.field_list().first(), Some(FieldId::Name));
    }

    #[test]
    fn test_open_rejects_field_outside_list() {
        let mut session = EditSession::for_record(persisted());
        assert_eq!(
            session.open(FieldId::Name),
            Err(SessionError::NotInFieldList(FieldId::Name))
        );
        assert_eq!(session.state(), WizardState::Closed);
    }

    #[test]
    fn test_open_same_field_twice_is_noop() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Files).unwrap();
        session.open(FieldId::Files).unwrap();
        assert_eq!(session.state(), WizardState::Open(FieldId::Files));
    }

    #[test]
    fn test_wizard_navigation() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Instructions).unwrap();
        assert_eq!(session.prev_field(), None);
        assert_eq!(session.next_field(), Some(FieldId::WelcomeMessage));

        session.open(FieldId::Files).unwrap();
        assert_eq!(session.next_field(), None);

        session
            .commit_files(FieldId::Files, Vec::new(), Vec::new(), None)
            .unwrap();
        assert_eq!(session.state(), WizardState::Closed);
        assert_eq!(session.next_field(), None);
    }

    #[test]
    fn test_commit_field_navigates_and_marks_dirty() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Instructions).unwrap();
        session
            .commit_field(
                FieldId::Instructions,
                "Be brief.",
                Some(FieldId::WelcomeMessage),
            )
            .unwrap();

        assert!(session.is_dirty());
        assert_eq!(session.pending(FieldId::Instructions), Some("Be brief."));
        assert_eq!(
            session.baseline_value(FieldId::Instructions),
            Some("Answer from the documents.")
        );
        assert_eq!(session.state(), WizardState::Open(FieldId::WelcomeMessage));
    }

    #[test]
    fn test_commit_same_value_is_not_dirty() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::WelcomeMessage).unwrap();
        session
            .commit_field(FieldId::WelcomeMessage, "Hi!", None)
            .unwrap();
        assert!(!session.is_dirty());
        assert_eq!(session.state(), WizardState::Closed);
    }

    #[test]
    fn test_commit_requires_active_field() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Instructions).unwrap();
        assert_eq!(
            session.commit_field(FieldId::WelcomeMessage, "x", None),
            Err(SessionError::NotActive {
                field: FieldId::WelcomeMessage
            })
        );
        assert_eq!(
            session.commit_field(FieldId::Instructions, "x", Some(FieldId::Name)),
            Err(SessionError::NotInFieldList(FieldId::Name))
        );
        assert_eq!(
            session.pending(FieldId::Instructions),
            Some("Answer from the documents.")
        );
    }

    #[test]
    fn test_commit_field_rejects_file_set() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Files).unwrap();
        assert_eq!(
            session.commit_field(FieldId::Files, "x.txt", None),
            Err(SessionError::WrongFieldKind(FieldId::Files))
        );

        session.open(FieldId::Instructions).unwrap();
        assert_eq!(
            session.commit_files(FieldId::Instructions, Vec::new(), Vec::new(), None),
            Err(SessionError::WrongFieldKind(FieldId::Instructions))
        );
    }

    #[test]
    fn test_commit_files_dedups_and_filters() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Files).unwrap();
        session
            .commit_files(
                FieldId::Files,
                vec![attachment("a.txt"), attachment("c.txt"), attachment("c.txt")],
                vec!["b.txt".to_string(), "missing.txt".to_string()],
                None,
            )
            .unwrap();

        let names: Vec<&str> = session.new_files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["c.txt"]);
        assert_eq!(session.deleted_files(), &["b.txt".to_string()]);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_file_edits_survive_switching_fields() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Files).unwrap();
        session
            .commit_files(
                FieldId::Files,
                vec![attachment("c.txt")],
                vec!["a.txt".to_string()],
                Some(FieldId::SuggestedPrompts),
            )
            .unwrap();
        session
            .commit_field(FieldId::SuggestedPrompts, "One?", Some(FieldId::Files))
            .unwrap();

        let draft = session.files_draft();
        assert_eq!(draft.new_files().len(), 1);
        assert!(draft.is_deleted("a.txt"));
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Instructions).unwrap();
        session
            .commit_field(FieldId::Instructions, "x", Some(FieldId::WelcomeMessage))
            .unwrap();
        session
            .commit_field(FieldId::WelcomeMessage, "y", Some(FieldId::Files))
            .unwrap();
        session
            .commit_files(
                FieldId::Files,
                vec![attachment("c.txt")],
                vec!["a.txt".to_string()],
                Some(FieldId::Instructions),
            )
            .unwrap();

        session.reset().unwrap();

        for field in [
            FieldId::Name,
            FieldId::Instructions,
            FieldId::WelcomeMessage,
            FieldId::SuggestedPrompts,
        ] {
            assert_eq!(session.pending(field), session.baseline_value(field));
        }
        assert!(session.new_files().is_empty());
        assert!(session.deleted_files().is_empty());
        assert!(!session.is_dirty());
        assert_eq!(session.state(), WizardState::Closed);
    }

    #[test]
    fn test_build_save_payload() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Files).unwrap();
        session
            .commit_files(
                FieldId::Files,
                vec![attachment("c.txt")],
                vec!["a.txt".to_string(), "b.txt".to_string()],
                None,
            )
            .unwrap();

        let payload = session.build_save_payload();
        assert_eq!(payload.name, "policy-bot");
        assert_eq!(payload.deleted_files, "a.txt, b.txt");
        assert_eq!(payload.deleted_names(), vec!["a.txt", "b.txt"]);
        assert_eq!(payload.new_files.len(), 1);
        assert_eq!(payload.form_fields()[1], ("instructions", "Answer from the documents."));
        // building a payload does not touch the session
        assert!(session.is_dirty());
    }

    #[test]
    fn test_save_in_flight_blocks_mutation() {
        let mut session = EditSession::for_record(persisted());
        session.open(FieldId::Instructions).unwrap();
        let _payload = session.begin_save().unwrap();

        assert_eq!(session.begin_save(), Err(SessionError::SaveInFlight));
        assert_eq!(
            session.commit_field(FieldId::Instructions, "x", None),
            Err(SessionError::SaveInFlight)
        );
        assert_eq!(session.reset(), Err(SessionError::SaveInFlight));

        session.abort_save();
        assert!(session
            .commit_field(FieldId::Instructions, "x", None)
            .is_ok());
    }

    #[test]
    fn test_apply_server_baseline_starts_fresh() {
        let mut session = EditSession::new_entity();
        session.open(FieldId::Name).unwrap();
        session
            .commit_field(FieldId::Name, "claims", Some(FieldId::Instructions))
            .unwrap();
        session.begin_save().unwrap();

        let mut saved = persisted();
        saved.name = "claims".to_string();
        session.apply_server_baseline(saved);

        assert!(!session.is_dirty());
        assert!(!session.is_save_in_flight());
        assert!(!session.is_new_entity());
        assert_eq!(session.agent_name(), Some("claims"));
        assert!(!session.field_list().contains(FieldId::Name));
        assert_eq!(session.state(), WizardState::Closed);
        for field in FieldId::ALL {
            assert_eq!(session.pending(field), session.baseline_value(field));
        }
    }

    #[test]
    fn test_display_precedence_per_session() {
        let mut session = EditSession::for_record(persisted());
        assert_eq!(
            session.display(FieldId::Instructions).style,
            display::DisplayStyle::Confirmed
        );

        session.open(FieldId::Instructions).unwrap();
        session
            .commit_field(FieldId::Instructions, "New", None)
            .unwrap();
        let shown = session.display(FieldId::Instructions);
        assert_eq!(shown.text, "New");
        assert_eq!(shown.style, display::DisplayStyle::Provisional);

        let fresh = EditSession::new_entity();
        let shown = fresh.display(FieldId::Name);
        assert_eq!(shown.text, "set-a-name");
        assert_eq!(shown.style, display::DisplayStyle::Placeholder);
    }

    #[test]
    fn test_file_display_turns_provisional_after_edit() {
        let mut session = EditSession::for_record(persisted());
        assert_eq!(
            session.display(FieldId::Files).style,
            display::DisplayStyle::Confirmed
        );
        session.open(FieldId::Files).unwrap();
        session
            .commit_files(FieldId::Files, Vec::new(), vec!["a.txt".to_string()], None)
            .unwrap();
        let shown = session.display(FieldId::Files);
        assert_eq!(shown.text, "b.txt");
        assert_eq!(shown.style, display::DisplayStyle::Provisional);
        assert_eq!(
            session.file_rows()[0].state,
            display::FileRowState::MarkedDeleted
        );
    }

    #[test]
    fn test_hint_fires_when_due() {
        let mut session = EditSession::new_entity();
        session
            .schedule_open(FieldId::Name, Duration::from_secs(5))
            .unwrap();
        let due = session.hint_deadline().unwrap();

        assert_eq!(session.fire_due_hint(due - Duration::from_secs(1)), None);
        assert_eq!(session.fire_due_hint(due), Some(FieldId::Name));
        assert_eq!(session.state(), WizardState::Open(FieldId::Name));
        assert!(session.hint_deadline().is_none());
    }

    #[test]
    fn test_open_cancels_hint() {
        let mut session = EditSession::new_entity();
        session
            .schedule_open(FieldId::Name, Duration::from_secs(5))
            .unwrap();
        session.open(FieldId::Instructions).unwrap();
        assert!(session.hint_deadline().is_none());
        assert_eq!(
            session.fire_due_hint(Instant::now() + Duration::from_secs(60)),
            None
        );
        assert_eq!(session.state(), WizardState::Open(FieldId::Instructions));
    }

    #[test]
    fn test_processing_agent_is_not_editable() {
        let mut record = persisted();
        record.embeddings_status = crate::agent::EMBEDDINGS_IN_PROGRESS.to_string();
        assert!(!EditSession::for_record(record).is_editable());
        assert!(EditSession::for_record(persisted()).is_editable());
    }
}
