// Property tests for EditSession reset and baseline adoption
//
// Run with: cargo test -p agentdesk-core --test session_properties_test

use agentdesk_core::{AgentRecord, Attachment, EditSession, FieldId, FieldKind, WizardState};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Text { slot: usize, value: String },
    Files { new_names: Vec<String>, deleted: Vec<String> },
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..5, "[a-z ,\"]{0,12}").prop_map(|(slot, value)| Edit::Text { slot, value }),
        (
            prop::collection::vec("[a-c]\\.txt", 0..3),
            prop::collection::vec(prop_oneof![Just("a.txt"), Just("b.txt"), Just("z.txt")], 0..3),
        )
            .prop_map(|(new_names, deleted)| Edit::Files {
                new_names,
                deleted: deleted.into_iter().map(str::to_string).collect(),
            }),
    ]
}

fn baseline() -> AgentRecord {
    let mut record = AgentRecord::named("claims");
    record.instructions = "Answer from the policy.".to_string();
    record.welcome_message = "Hi".to_string();
    record.suggested_prompts = "One?, Two?".to_string();
    record.files = "a.txt, b.txt".to_string();
    record
}

fn apply(session: &mut EditSession, edit: &Edit) {
    match edit {
        Edit::Text { slot, value } => {
            let fields: Vec<FieldId> = session
                .field_list()
                .iter()
                .filter(|f| f.kind() != FieldKind::FileSet)
                .collect();
            let field = fields[slot % fields.len()];
            session.open(field).unwrap();
            session.commit_field(field, value.clone(), None).unwrap();
        }
        Edit::Files { new_names, deleted } => {
            let new_files = new_names
                .iter()
                .map(|name| Attachment::new(name.clone(), b"text".to_vec()))
                .collect();
            session.open(FieldId::Files).unwrap();
            session
                .commit_files(FieldId::Files, new_files, deleted.clone(), None)
                .unwrap();
        }
    }
}

fn assert_matches_baseline(session: &EditSession) -> Result<(), TestCaseError> {
    for field in FieldId::ALL {
        prop_assert_eq!(session.pending(field), session.baseline_value(field));
    }
    prop_assert!(session.new_files().is_empty());
    prop_assert!(session.deleted_files().is_empty());
    prop_assert!(!session.is_dirty());
    prop_assert_eq!(session.state(), WizardState::Closed);
    Ok(())
}

proptest! {
    #[test]
    fn reset_restores_baseline_after_any_commits(
        new_entity in any::<bool>(),
        edits in prop::collection::vec(arb_edit(), 0..12),
    ) {
        let mut session = if new_entity {
            EditSession::new_entity()
        } else {
            EditSession::for_record(baseline())
        };
        for edit in &edits {
            apply(&mut session, edit);
        }
        session.reset().unwrap();
        assert_matches_baseline(&session)?;
    }

    #[test]
    fn applied_baseline_clears_pending_state(edits in prop::collection::vec(arb_edit(), 1..8)) {
        let mut session = EditSession::for_record(baseline());
        for edit in &edits {
            apply(&mut session, edit);
        }
        let mut saved = baseline();
        saved.instructions = "Saved instructions".to_string();
        session.apply_server_baseline(saved);

        assert_matches_baseline(&session)?;
        prop_assert_eq!(session.pending(FieldId::Instructions), Some("Saved instructions"));
    }
}
