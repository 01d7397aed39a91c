use std::collections::VecDeque;
use std::path::PathBuf;

use tracing::debug;

use super::error::{AppError, Result};
use crate::app::domain::FileRef;

/// A file chosen through the open picker, already read.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub file_ref: FileRef,
}

/// File access: pickers plus whole-file reads and writes.
///
/// A cancelled picker is `Ok(None)`, never an error.
#[allow(async_fn_in_trait)]
pub trait FileStorage {
    async fn pick_readable_file(&mut self) -> Result<Option<PickedFile>>;
    async fn pick_writable_file(&mut self, suggested_name: &str) -> Result<Option<FileRef>>;
    async fn read_all(&mut self, file: &FileRef) -> Result<Vec<u8>>;
    async fn write_all(&mut self, file: &FileRef, bytes: &[u8]) -> Result<()>;
}

/// Local file system storage.
///
/// A terminal has no picker dialog, so the front end stages the path the
/// user typed before dispatching Open or Save As. An empty queue behaves
/// like a dismissed dialog.
#[derive(Debug, Default)]
pub struct FsStorage {
    staged_open: VecDeque<PathBuf>,
    staged_save: Option<PathBuf>,
}

impl FsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_open(&mut self, path: impl Into<PathBuf>) {
        self.staged_open.push_back(path.into());
    }

    pub fn stage_save(&mut self, path: impl Into<PathBuf>) {
        self.staged_save = Some(path.into());
    }

    pub fn clear_staged(&mut self) {
        self.staged_open.clear();
        self.staged_save = None;
    }

    fn path_of(file: &FileRef) -> PathBuf {
        PathBuf::from(file.locator())
    }
}

impl FileStorage for FsStorage {
    async fn pick_readable_file(&mut self) -> Result<Option<PickedFile>> {
        let path = match self.staged_open.pop_front() {
            Some(path) => path,
            None => return Ok(None),
        };
        let file_ref = FileRef::new(path.to_string_lossy());
        let bytes = self.read_all(&file_ref).await?;
        Ok(Some(PickedFile {
            name: file_ref.file_name(),
            bytes,
            file_ref,
        }))
    }

    async fn pick_writable_file(&mut self, suggested_name: &str) -> Result<Option<FileRef>> {
        debug!("Save picker opened with suggestion {}", suggested_name);
        Ok(self
            .staged_save
            .take()
            .map(|path| FileRef::new(path.to_string_lossy())))
    }

    async fn read_all(&mut self, file: &FileRef) -> Result<Vec<u8>> {
        tokio::fs::read(Self::path_of(file))
            .await
            .map_err(|e| AppError::FileRead(format!("{}: {}", file.locator(), e)))
    }

    async fn write_all(&mut self, file: &FileRef, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(Self::path_of(file), bytes)
            .await
            .map_err(|e| AppError::FileWrite(format!("{}: {}", file.locator(), e)))
    }
}
