// Terminal field editors
//
// TerminalEditor implements the core FieldEditor trait over any line reader
// and writer, so the wizard runs on stdin/stdout and on scripted input in
// tests. Input is validated here before anything is committed.
//
// Every prompt accepts navigation commands:
//   :next  keep the value and go to the next field
//   :prev  keep the value and go to the previous field
//   :done  keep the value and close the wizard
//   :cancel  close the wizard without committing this field

use agentdesk_core::display;
use agentdesk_core::files::FileSetDraft;
use agentdesk_core::validation::{validate_agent_name, validate_attachment_name};
use agentdesk_core::{
    Attachment, EditOutcome, EditRequest, EditedValue, FieldDraft, FieldEditor, FieldId,
    FieldKind, SuggestedPrompts,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::output;

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Next,
    Prev,
    Done,
    Cancel,
    Value(String),
}

impl Line {
    fn parse(raw: &str) -> Self {
        match raw.trim() {
            ":next" | ":n" => Line::Next,
            ":prev" | ":p" => Line::Prev,
            ":done" | ":d" => Line::Done,
            ":cancel" | ":q" => Line::Cancel,
            _ => Line::Value(raw.to_string()),
        }
    }

    /// Navigation target for a command line, `None` meaning close
    fn target(&self, request: &EditRequest) -> Option<FieldId> {
        match self {
            Line::Next => request.next,
            Line::Prev => request.prev.or(Some(request.field)),
            _ => None,
        }
    }
}

/// Line-oriented editor for the agent fields
pub struct TerminalEditor<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalEditor<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Read one line without its terminator; `None` at end of input
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Write a line of output
    pub async fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Write text without a line break
    pub async fn write_prompt(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Write a prompt and read the answer
    pub async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        self.write_prompt(text).await?;
        self.read_line().await
    }

    /// Read a value that may continue over several lines ending in `\`
    async fn read_value(&mut self, first: String) -> Result<String> {
        let mut value = first;
        while value.ends_with('\\') {
            value.pop();
            value.push('\n');
            match self.read_line().await? {
                Some(next) => value.push_str(&next),
                None => break,
            }
        }
        Ok(value.trim().to_string())
    }

    async fn header(&mut self, request: &EditRequest) -> Result<()> {
        self.say("").await?;
        self.say(&format!("== {} ==", request.field.title())).await?;
        self.say(request.field.hint()).await?;
        self.say("Commands: :next :prev :done :cancel").await
    }

    async fn edit_text(&mut self, request: &EditRequest, current: String) -> Result<EditOutcome> {
        self.header(request).await?;
        let shown = if current.is_empty() {
            "(empty)"
        } else {
            current.as_str()
        };
        self.say(&format!("Current: {}", shown)).await?;

        loop {
            let Some(raw) = self
                .prompt("New value (empty line keeps the current one): ")
                .await?
            else {
                return Ok(EditOutcome::Cancel);
            };

            let value = match Line::parse(&raw) {
                Line::Cancel => return Ok(EditOutcome::Cancel),
                Line::Value(raw) if raw.trim().is_empty() => {
                    return Ok(commit_text(current, request.next));
                }
                Line::Value(raw) => self.read_value(raw).await?,
                nav => {
                    let target = nav.target(request);
                    return Ok(commit_text(current, target));
                }
            };

            if request.field == FieldId::Name {
                if let Err(err) = validate_agent_name(&value) {
                    self.say(&err.to_string()).await?;
                    continue;
                }
            }
            return Ok(commit_text(value, request.next));
        }
    }

    async fn edit_prompts(&mut self, request: &EditRequest, current: &str) -> Result<EditOutcome> {
        self.header(request).await?;
        self.say("Empty line keeps a prompt, '-' clears it.").await?;
        let mut prompts = SuggestedPrompts::from_encoded(current);

        let mut index = 0;
        while index < prompts.slots().len() {
            let shown = prompts.slots()[index].clone();
            let Some(raw) = self
                .prompt(&format!("Prompt {} [{}]: ", index + 1, shown))
                .await?
            else {
                return Ok(EditOutcome::Cancel);
            };

            match Line::parse(&raw) {
                Line::Cancel => return Ok(EditOutcome::Cancel),
                Line::Value(raw) => {
                    let value = raw.trim();
                    if value == "-" {
                        prompts.set(index, "");
                    } else if value.contains(',') {
                        self.say("Suggested prompts cannot contain commas.").await?;
                        continue;
                    } else if !value.is_empty() {
                        prompts.set(index, value);
                    }
                }
                nav => {
                    let target = nav.target(request);
                    return Ok(commit_text(prompts.encode(), target));
                }
            }
            index += 1;
        }
        Ok(commit_text(prompts.encode(), request.next))
    }

    async fn show_files(&mut self, draft: &FileSetDraft) -> Result<()> {
        let new_names: Vec<&str> = draft.new_files().iter().map(|f| f.name.as_str()).collect();
        let rows = display::file_rows(draft.existing(), &new_names, draft.deleted());
        if rows.is_empty() {
            return self.say("No files attached.").await;
        }
        for row in &rows {
            self.say(&output::file_row(row)).await?;
        }
        Ok(())
    }

    async fn edit_files(
        &mut self,
        request: &EditRequest,
        mut draft: FileSetDraft,
    ) -> Result<EditOutcome> {
        self.header(request).await?;
        self.say("add <path> | rm <name> (drop a new file) | del <name> (toggle deletion)")
            .await?;

        loop {
            self.show_files(&draft).await?;
            let Some(raw) = self.prompt("Files (empty line to finish): ").await? else {
                return Ok(EditOutcome::Cancel);
            };

            let line = match Line::parse(&raw) {
                Line::Cancel => return Ok(EditOutcome::Cancel),
                Line::Value(line) => line,
                nav => {
                    let target = nav.target(request);
                    return Ok(commit_files(draft, target));
                }
            };

            let line = line.trim();
            if line.is_empty() {
                return Ok(commit_files(draft, request.next));
            }
            let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));
            let arg = arg.trim();
            match verb {
                "add" => self.add_file(&mut draft, arg).await?,
                "rm" => {
                    if !draft.remove_new(arg) {
                        self.say(&format!("No new file named {}", arg)).await?;
                    }
                }
                "del" => {
                    if !draft.existing().iter().any(|n| n == arg) {
                        self.say(&format!("No existing file named {}", arg)).await?;
                    } else {
                        draft.toggle_deleted(arg);
                    }
                }
                _ => self.say(&format!("Unknown command: {}", verb)).await?,
            }
        }
    }

    async fn add_file(&mut self, draft: &mut FileSetDraft, path: &str) -> Result<()> {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if let Err(err) = validate_attachment_name(&name) {
            return self.say(&err.to_string()).await;
        }
        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(err) => return self.say(&format!("Cannot read {}: {}", path, err)).await,
        };
        if draft.add([Attachment::new(name.clone(), content)]) == 0 {
            self.say(&format!("{} is already attached", name)).await?;
        }
        Ok(())
    }
}

fn commit_text(value: String, navigate_to: Option<FieldId>) -> EditOutcome {
    EditOutcome::Commit {
        value: EditedValue::Text(value),
        navigate_to,
    }
}

fn commit_files(draft: FileSetDraft, navigate_to: Option<FieldId>) -> EditOutcome {
    let (new_files, deleted) = draft.into_parts();
    EditOutcome::Commit {
        value: EditedValue::Files { new_files, deleted },
        navigate_to,
    }
}

#[async_trait]
impl<R, W> FieldEditor for TerminalEditor<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn edit(&mut self, request: EditRequest) -> anyhow::Result<EditOutcome> {
        match request.draft.clone() {
            FieldDraft::Files(draft) => self.edit_files(&request, draft).await,
            FieldDraft::Text(current) if request.field.kind() == FieldKind::DelimitedList => {
                self.edit_prompts(&request, &current).await
            }
            FieldDraft::Text(current) => self.edit_text(&request, current).await,
        }
    }
}
