//! Notes CRUD over a narrow document-store interface.
//!
//! Rows are partitioned by `user_id`; every store operation filters on it.

use crate::notification::Notification;
use crate::{log_debug, log_error};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub user_id: String,
    pub title: String,
    pub content: String,
}

/// Fields changed by an edit; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("Please provide both title and content")]
    MissingFields,
    #[error("Note {0} not found")]
    NotFound(i64),
    #[error("Notes storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Notes file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// Column a fetch can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteColumn {
    #[default]
    Id,
    CreatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOrder {
    pub column: NoteColumn,
    pub ascending: bool,
}

/// Ordering and row limit for [`NoteStore::fetch`]. Rows are sorted first, then cut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub order: Option<NoteOrder>,
    pub limit: Option<usize>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, column: NoteColumn, ascending: bool) -> Self {
        self.order = Some(NoteOrder { column, ascending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Document-store operations the notes surface relies on
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn fetch(&self, user_id: &str, options: FetchOptions) -> Result<Vec<Note>, NoteError>;
    async fn insert(&self, note: NewNote) -> Result<Note, NoteError>;
    async fn update(&self, user_id: &str, id: i64, update: NoteUpdate) -> Result<Note, NoteError>;
    async fn delete(&self, user_id: &str, id: i64) -> Result<(), NoteError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NoteTable {
    next_id: i64,
    rows: Vec<Note>,
}

impl NoteTable {
    fn fetch(&self, user_id: &str, options: FetchOptions) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .rows
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notes.sort_by_key(|n| n.id);
        if let Some(order) = options.order {
            match order.column {
                NoteColumn::Id => {}
                NoteColumn::CreatedAt => notes.sort_by_key(|n| n.created_at),
                NoteColumn::Title => notes.sort_by(|a, b| a.title.cmp(&b.title)),
            }
            if !order.ascending {
                notes.reverse();
            }
        }
        if let Some(limit) = options.limit {
            notes.truncate(limit);
        }
        notes
    }

    fn insert(&mut self, note: NewNote) -> Note {
        self.next_id += 1;
        let row = Note {
            id: self.next_id,
            user_id: note.user_id,
            title: note.title,
            content: note.content,
            created_at: Utc::now(),
        };
        self.rows.push(row.clone());
        row
    }

    fn update(&mut self, user_id: &str, id: i64, update: NoteUpdate) -> Result<Note, NoteError> {
        let row = self
            .rows
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or(NoteError::NotFound(id))?;
        if let Some(title) = update.title {
            row.title = title;
        }
        if let Some(content) = update.content {
            row.content = content;
        }
        Ok(row.clone())
    }

    fn delete(&mut self, user_id: &str, id: i64) -> Result<(), NoteError> {
        let before = self.rows.len();
        self.rows.retain(|n| !(n.id == id && n.user_id == user_id));
        if self.rows.len() == before {
            return Err(NoteError::NotFound(id));
        }
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    table: Mutex<NoteTable>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn fetch(&self, user_id: &str, options: FetchOptions) -> Result<Vec<Note>, NoteError> {
        Ok(self.table.lock().fetch(user_id, options))
    }

    async fn insert(&self, note: NewNote) -> Result<Note, NoteError> {
        Ok(self.table.lock().insert(note))
    }

    async fn update(&self, user_id: &str, id: i64, update: NoteUpdate) -> Result<Note, NoteError> {
        self.table.lock().update(user_id, id, update)
    }

    async fn delete(&self, user_id: &str, id: i64) -> Result<(), NoteError> {
        self.table.lock().delete(user_id, id)
    }
}

/// Store backed by a single JSON file, rewritten on every change.
///
/// A change only becomes visible once the rewrite succeeded.
#[derive(Debug)]
pub struct JsonNoteStore {
    path: PathBuf,
    table: Mutex<NoteTable>,
}

impl JsonNoteStore {
    /// Open the file at `path`, starting empty if it does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, NoteError> {
        let path = path.into();
        let table = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                NoteTable::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            NoteTable::default()
        };
        log_debug!("Opened notes store at {}", path.display());
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename over the real one
    fn persist(&self, table: &NoteTable) -> Result<(), NoteError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(table)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl NoteStore for JsonNoteStore {
    async fn fetch(&self, user_id: &str, options: FetchOptions) -> Result<Vec<Note>, NoteError> {
        Ok(self.table.lock().fetch(user_id, options))
    }

    async fn insert(&self, note: NewNote) -> Result<Note, NoteError> {
        let mut table = self.table.lock();
        let mut next = table.clone();
        let row = next.insert(note);
        self.persist(&next)?;
        *table = next;
        Ok(row)
    }

    async fn update(&self, user_id: &str, id: i64, update: NoteUpdate) -> Result<Note, NoteError> {
        let mut table = self.table.lock();
        let mut next = table.clone();
        let row = next.update(user_id, id, update)?;
        self.persist(&next)?;
        *table = next;
        Ok(row)
    }

    async fn delete(&self, user_id: &str, id: i64) -> Result<(), NoteError> {
        let mut table = self.table.lock();
        let mut next = table.clone();
        next.delete(user_id, id)?;
        self.persist(&next)?;
        *table = next;
        Ok(())
    }
}

/// Notes surface for one signed-in user
pub struct NotesService<S> {
    store: S,
    user_id: String,
}

impl<S: NoteStore> NotesService<S> {
    pub fn new(store: S, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// All of the user's notes, oldest first
    pub async fn list(&self) -> Result<Vec<Note>, NoteError> {
        self.list_with(FetchOptions::default()).await
    }

    pub async fn list_with(&self, options: FetchOptions) -> Result<Vec<Note>, NoteError> {
        self.store
            .fetch(&self.user_id, options)
            .await
            .inspect_err(|e| log_error!("Error loading notes: {}", e))
    }

    /// Create a note; both title and content are required
    pub async fn create(&self, title: &str, content: &str) -> Result<Note, NoteError> {
        if title.is_empty() || content.is_empty() {
            return Err(NoteError::MissingFields);
        }
        self.store
            .insert(NewNote {
                user_id: self.user_id.clone(),
                title: title.to_string(),
                content: content.to_string(),
            })
            .await
            .inspect_err(|e| log_error!("Error creating note: {}", e))
    }

    pub async fn edit(&self, id: i64, update: NoteUpdate) -> Result<Note, NoteError> {
        if update.title.as_deref() == Some("") || update.content.as_deref() == Some("") {
            return Err(NoteError::MissingFields);
        }
        self.store
            .update(&self.user_id, id, update)
            .await
            .inspect_err(|e| log_error!("Error updating note: {}", e))
    }

    pub async fn delete(&self, id: i64) -> Result<(), NoteError> {
        self.store
            .delete(&self.user_id, id)
            .await
            .inspect_err(|e| log_error!("Error deleting note: {}", e))
    }
}

/// Notification for the outcome of a notes operation
pub fn notification<T>(action: NoteAction, result: &Result<T, NoteError>) -> Notification {
    match (action, result) {
        (NoteAction::Create, Ok(_)) => {
            Notification::info("Note created", "Your note has been saved successfully")
        }
        (NoteAction::Update, Ok(_)) => {
            Notification::info("Note updated", "Your note has been updated successfully")
        }
        (NoteAction::Delete, Ok(_)) => {
            Notification::info("Note deleted", "Your note has been deleted successfully")
        }
        (NoteAction::Load, Ok(_)) => Notification::info("Notes loaded", ""),
        (NoteAction::Create, Err(NoteError::MissingFields)) => {
            Notification::error("Missing fields", NoteError::MissingFields.to_string())
        }
        (action, Err(e)) => Notification::error(action.error_title(), e.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAction {
    Load,
    Create,
    Update,
    Delete,
}

impl NoteAction {
    const fn error_title(self) -> &'static str {
        match self {
            Self::Load => "Error loading notes",
            Self::Create => "Error creating note",
            Self::Update => "Error updating note",
            Self::Delete => "Error deleting note",
        }
    }
}
