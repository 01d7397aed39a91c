use super::error::{AppError, Result};

/// System clipboard. Reading may be refused by the platform.
#[allow(async_fn_in_trait)]
pub trait Clipboard {
    async fn read_text(&mut self) -> Result<String>;
    async fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Process-local clipboard. `deny_reads` simulates a refused permission.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: String,
    deny_reads: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying_reads() -> Self {
        Self {
            deny_reads: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Platform clipboard through `arboard`. The handle is opened on first use
/// and kept, since some platforms drop the contents with it.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_handle<T>(
        &mut self,
        op: impl FnOnce(&mut arboard::Clipboard) -> std::result::Result<T, arboard::Error>,
    ) -> Result<T> {
        let mut handle = match self.handle.take() {
            Some(handle) => handle,
            None => arboard::Clipboard::new().map_err(denied)?,
        };
        let result = op(&mut handle);
        self.handle = Some(handle);
        result.map_err(denied)
    }
}

fn denied(e: arboard::Error) -> AppError {
    AppError::ClipboardDenied(e.to_string())
}

/// An empty or non-text clipboard reads as empty text.
fn text_or_empty(result: std::result::Result<String, arboard::Error>) -> Result<String> {
    match result {
        Ok(text) => Ok(text),
        Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
        Err(e) => Err(denied(e)),
    }
}

impl Clipboard for SystemClipboard {
    async fn read_text(&mut self) -> Result<String> {
        let read = self.with_handle(|clipboard| Ok(clipboard.get_text()))?;
        text_or_empty(read)
    }

    async fn write_text(&mut self, text: &str) -> Result<()> {
        self.with_handle(|clipboard| clipboard.set_text(text))
    }
}

impl Clipboard for MemoryClipboard {
    async fn read_text(&mut self) -> Result<String> {
        if self.deny_reads {
            return Err(AppError::ClipboardDenied("read permission refused".to_string()));
        }
        Ok(self.text.clone())
    }

    async fn write_text(&mut self, text: &str) -> Result<()> {
        self.text = text.to_string();
        Ok(())
    }
}
