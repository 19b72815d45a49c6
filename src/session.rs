//! Conversion session: the select / convert / save cycle, with conversion
//! running on a background worker thread.
//!
//! ```no_run
//! use std::time::Duration;
//! use docling_converter::{ConversionSession, ConvertOptions};
//!
//! # fn main() -> docling_converter::Result<()> {
//! let mut session = ConversionSession::new(ConvertOptions::default());
//! session.set_accurate_mode(true);
//! let mut job = session.select_pdf("report.pdf")?;
//! let event = loop {
//!     if let Some(event) = job.wait_timeout(Duration::from_millis(100)) {
//!         break event;
//!     }
//!     println!("{}", session.status());
//! };
//! session.apply(event);
//! session.save("report.md")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};

use crate::convert::{convert_file, ConvertOptions};
use crate::error::{Error, Result};
use crate::output::save_markdown;
use crate::render::{ExtractionStats, RenderResult};
use crate::validate::validate_pdf_file;

pub const STATUS_IDLE: &str = "Select a PDF file to convert";
pub const STATUS_COMPLETED: &str = "Conversion completed!";
pub const STATUS_SAVED: &str = "File saved successfully!";

const WORKER_NAME: &str = "pdf-conversion";
const WORKER_LOST: &str = "Conversion worker stopped without a result";

/// Outcome reported by the worker.
#[derive(Debug, Clone)]
pub enum ConversionEvent {
    Completed(RenderResult),
    Failed(String),
}

/// A conversion running on its own thread.
pub struct ConversionJob {
    file_name: String,
    receiver: Receiver<ConversionEvent>,
    handle: Option<JoinHandle<()>>,
    reported: bool,
}

impl ConversionJob {
    /// Start converting `path` on a named worker thread.
    pub fn spawn(path: PathBuf, options: ConvertOptions) -> Result<Self> {
        let file_name = display_name(&path);
        let (sender, receiver) = bounded(1);

        let handle = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let event = match convert_file(&path, &options) {
                    Ok(result) => ConversionEvent::Completed(result),
                    Err(e) => {
                        log::error!("Error converting PDF: {}", e);
                        ConversionEvent::Failed(e.to_string())
                    }
                };
                // The session may have dropped the job; nobody to tell.
                let _ = sender.send(event);
            })?;

        Ok(Self {
            file_name,
            receiver,
            handle: Some(handle),
            reported: false,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The event, if the worker has finished. Returns `Some` once.
    pub fn try_event(&mut self) -> Option<ConversionEvent> {
        if self.reported {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(event) => Some(self.finish(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.finish(lost())),
        }
    }

    /// Block for at most `timeout`.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<ConversionEvent> {
        if self.reported {
            return None;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(self.finish(event)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.finish(lost())),
        }
    }

    /// Block until the worker reports.
    pub fn wait(mut self) -> ConversionEvent {
        let event = self.receiver.recv().unwrap_or_else(|_| lost());
        self.finish(event)
    }

    fn finish(&mut self, event: ConversionEvent) -> ConversionEvent {
        self.reported = true;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Conversion worker for {} panicked", self.file_name);
            }
        }
        event
    }
}

fn lost() -> ConversionEvent {
    ConversionEvent::Failed(WORKER_LOST.to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Headless state of the converter window: status line, mode toggle,
/// converted content and which actions are available.
#[derive(Debug)]
pub struct ConversionSession {
    options: ConvertOptions,
    status: String,
    converting: bool,
    content: Option<String>,
    stats: Option<ExtractionStats>,
}

impl ConversionSession {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            status: STATUS_IDLE.to_string(),
            converting: false,
            content: None,
            stats: None,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_accurate_mode(&mut self, accurate: bool) {
        self.options = std::mem::take(&mut self.options).with_accurate_mode(accurate);
    }

    pub fn accurate_mode(&self) -> bool {
        self.options.accurate_mode()
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn is_converting(&self) -> bool {
        self.converting
    }

    pub fn can_select(&self) -> bool {
        !self.converting
    }

    pub fn can_save(&self) -> bool {
        !self.converting && self.content.is_some()
    }

    /// Markdown of the last successful conversion.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn stats(&self) -> Option<&ExtractionStats> {
        self.stats.as_ref()
    }

    /// Validate `path` and start converting it.
    pub fn select_pdf<P: AsRef<Path>>(&mut self, path: P) -> Result<ConversionJob> {
        let path = path.as_ref();
        if self.converting {
            return Err(Error::Other("A conversion is already running".to_string()));
        }
        if let Err(e) = validate_pdf_file(path) {
            log::error!("{}", e);
            self.status = format!("Error: {}", e);
            return Err(e);
        }

        self.content = None;
        self.stats = None;
        self.status = format!("Converting: {}", display_name(path));
        self.converting = true;

        match ConversionJob::spawn(path.to_path_buf(), self.options.clone()) {
            Ok(job) => Ok(job),
            Err(e) => {
                self.converting = false;
                self.status = format!("Error: {}", e);
                Err(e)
            }
        }
    }

    /// Take the worker's report into the session.
    pub fn apply(&mut self, event: ConversionEvent) {
        self.converting = false;
        match event {
            ConversionEvent::Completed(result) => {
                self.status = STATUS_COMPLETED.to_string();
                self.content = Some(result.content);
                self.stats = Some(result.stats);
            }
            ConversionEvent::Failed(message) => {
                log::error!("Conversion error: {}", message);
                self.status = format!("Error: {}", message);
            }
        }
    }

    /// Save the converted Markdown.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<PathBuf> {
        let Some(content) = self.content.as_deref() else {
            log::warn!("No content to save");
            return Err(Error::NoContent);
        };

        match save_markdown(content, path, self.options.chunk_size) {
            Ok(written) => {
                self.status = STATUS_SAVED.to_string();
                Ok(written)
            }
            Err(e) => {
                let message = format!("Error saving file: {}", e);
                log::error!("{}", message);
                self.status = message;
                Err(e)
            }
        }
    }
}
