//! JSON Lines writer
//!
//! Writes every retrieved record as one JSON object per line.

use crate::engine::{RecordHandler, RecordPage};
use crate::error::{Error, Result};
use crate::types::Record;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// How an output file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate any existing file
    #[default]
    Create,
    /// Append to an existing file, as a resumed run does
    Append,
}

/// Configuration for the JSON Lines writer
#[derive(Debug, Clone, Default)]
pub struct JsonLinesConfig {
    mode: WriteMode,
    flush_each_page: bool,
}

impl JsonLinesConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the write mode
    #[must_use]
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Append instead of truncating
    #[must_use]
    pub fn append(self) -> Self {
        self.with_mode(WriteMode::Append)
    }

    /// Flush after every page so a paused run leaves complete output
    #[must_use]
    pub fn with_flush_each_page(mut self, enabled: bool) -> Self {
        self.flush_each_page = enabled;
        self
    }

    /// Get the write mode
    #[must_use]
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Get flush-per-page
    #[must_use]
    pub fn is_flush_each_page(&self) -> bool {
        self.flush_each_page
    }
}

type Sink = Box<dyn AsyncWrite + Send + Unpin>;

/// Record handler writing JSON Lines to a file or stdout
pub struct JsonLinesWriter {
    /// Underlying sink
    sink: Mutex<Sink>,
    /// Target path, `None` for stdout
    path: Option<PathBuf>,
    /// Flush after every page
    flush_each_page: bool,
    /// Number of records written
    rows_written: AtomicUsize,
}

impl JsonLinesWriter {
    /// Open a file writer; parent directories are created as needed
    pub async fn open(path: impl AsRef<Path>, config: &JsonLinesConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Output {
                    message: format!("Failed to create {}: {e}", parent.display()),
                })?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        match config.mode {
            WriteMode::Create => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };
        let file = options.open(&path).await.map_err(|e| Error::Output {
            message: format!("Failed to open {}: {e}", path.display()),
        })?;

        Ok(Self::with_sink(Box::new(file), Some(path), config))
    }

    /// Writer for stdout
    pub fn stdout(config: &JsonLinesConfig) -> Self {
        Self::with_sink(Box::new(tokio::io::stdout()), None, config)
    }

    fn with_sink(sink: Sink, path: Option<PathBuf>, config: &JsonLinesConfig) -> Self {
        Self {
            sink: Mutex::new(sink),
            path,
            flush_each_page: config.flush_each_page,
            rows_written: AtomicUsize::new(0),
        }
    }

    /// Target path, `None` for stdout
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the number of records written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written.load(Ordering::SeqCst)
    }

    /// Write records, one line each
    pub async fn write_records(&self, records: &[Record]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut buffer = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buffer, record)?;
            buffer.push(b'\n');
        }

        let mut sink = self.sink.lock().await;
        sink.write_all(&buffer).await.map_err(|e| Error::Output {
            message: format!("Failed to write records: {e}"),
        })?;

        self.rows_written.fetch_add(records.len(), Ordering::SeqCst);
        Ok(records.len())
    }

    /// Flush buffered output
    pub async fn flush(&self) -> Result<()> {
        self.sink
            .lock()
            .await
            .flush()
            .await
            .map_err(|e| Error::Output {
                message: format!("Failed to flush output: {e}"),
            })
    }
}

#[async_trait]
impl RecordHandler for JsonLinesWriter {
    async fn handle(&self, page: RecordPage) -> Result<()> {
        self.write_records(&page.records).await?;
        if self.flush_each_page {
            self.flush().await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for JsonLinesWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesWriter")
            .field("path", &self.path)
            .field("rows_written", &self.rows_written())
            .finish_non_exhaustive()
    }
}
