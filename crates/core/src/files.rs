// File-set handling
//
// The backend stores an agent's files as a comma-joined name list. Edits are
// expressed as new attachments plus a set of existing names to delete.

use crate::agent::Attachment;
use crate::prompts::strip_surrounding_quotes;

/// Separator used when joining names for the backend
pub const NAME_SEPARATOR: &str = ", ";

/// Split a comma-joined name list, dropping blanks
pub fn split_names(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(|name| strip_surrounding_quotes(name.trim()).trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Join names for the backend
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(NAME_SEPARATOR)
}

/// Keep incoming attachments whose names collide with neither `existing`
/// nor an earlier incoming attachment.
pub fn dedup_attachments<S: AsRef<str>>(
    existing: &[S],
    incoming: impl IntoIterator<Item = Attachment>,
) -> Vec<Attachment> {
    let mut kept: Vec<Attachment> = Vec::new();
    for file in incoming {
        let collides = existing.iter().any(|n| n.as_ref() == file.name)
            || kept.iter().any(|k| k.name == file.name);
        if collides {
            tracing::debug!(file = %file.name, "Dropping duplicate attachment");
            continue;
        }
        kept.push(file);
    }
    kept
}

/// Restrict deletion marks to distinct names that exist in `existing`
pub fn normalize_deleted<S: AsRef<str>>(
    existing: &[S],
    deleted: impl IntoIterator<Item = String>,
) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for name in deleted {
        let name = name.trim().to_string();
        if existing.iter().any(|n| n.as_ref() == name) && !kept.contains(&name) {
            kept.push(name);
        }
    }
    kept
}

/// Working copy of the file-set used while the files editor is open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSetDraft {
    existing: Vec<String>,
    new_files: Vec<Attachment>,
    deleted: Vec<String>,
}

impl FileSetDraft {
    pub fn new(existing: Vec<String>, new_files: Vec<Attachment>, deleted: Vec<String>) -> Self {
        Self {
            existing,
            new_files,
            deleted,
        }
    }

    /// Baseline file names
    pub fn existing(&self) -> &[String] {
        &self.existing
    }

    pub fn new_files(&self) -> &[Attachment] {
        &self.new_files
    }

    pub fn deleted(&self) -> &[String] {
        &self.deleted
    }

    pub fn is_deleted(&self, name: &str) -> bool {
        self.deleted.iter().any(|d| d == name)
    }

    /// True when there is nothing to show at all
    pub fn is_empty(&self) -> bool {
        self.existing.is_empty() && self.new_files.is_empty()
    }

    /// Add attachments, ignoring names already present. Returns how many were added.
    pub fn add(&mut self, incoming: impl IntoIterator<Item = Attachment>) -> usize {
        let taken: Vec<String> = self
            .existing
            .iter()
            .cloned()
            .chain(self.new_files.iter().map(|f| f.name.clone()))
            .collect();
        let added = dedup_attachments(&taken, incoming);
        let count = added.len();
        self.new_files.extend(added);
        count
    }

    /// Drop a not-yet-uploaded attachment. Returns false if it was not pending.
    pub fn remove_new(&mut self, name: &str) -> bool {
        let before = self.new_files.len();
        self.new_files.retain(|f| f.name != name);
        self.new_files.len() != before
    }

    /// Flip the deletion mark of an existing file. Returns whether it is now marked.
    pub fn toggle_deleted(&mut self, name: &str) -> bool {
        if !self.existing.iter().any(|n| n == name) {
            return false;
        }
        if self.is_deleted(name) {
            self.deleted.retain(|d| d != name);
            false
        } else {
            self.deleted.push(name.to_string());
            true
        }
    }

    pub fn into_parts(self) -> (Vec<Attachment>, Vec<String>) {
        (self.new_files, self.deleted)
    }
}
