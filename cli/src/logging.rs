//! Log setup: timestamped records to stderr and, optionally, a log file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use env_logger::{Builder, Env, Target};
use indicatif::ProgressBar;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Spinner currently drawn on stderr, if any.
static PROGRESS: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Clears the spinner registration when dropped.
pub struct ProgressGuard(());

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        if let Ok(mut slot) = PROGRESS.lock() {
            *slot = None;
        }
    }
}

/// Hide `bar` while each log record is written to stderr, until the
/// returned guard is dropped.
pub fn suspend_progress(bar: &ProgressBar) -> ProgressGuard {
    if let Ok(mut slot) = PROGRESS.lock() {
        *slot = Some(bar.clone());
    }
    ProgressGuard(())
}

fn write_stderr(buf: &[u8]) -> io::Result<()> {
    let bar = PROGRESS.lock().ok().and_then(|slot| slot.clone());
    match bar {
        Some(bar) => bar.suspend(|| io::stderr().write_all(buf)),
        None => io::stderr().write_all(buf),
    }
}

/// Writes every record to stderr and to the log file, when one is open.
struct Tee {
    file: Option<File>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        write_stderr(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Install the global logger. `RUST_LOG` overrides the `info` default.
///
/// If the log file cannot be opened the logger still goes to stderr and
/// the open error is returned.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let (file, open_error) = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (Some(file), None),
            Err(e) => (None, Some(e)),
        },
        None => (None, None),
    };

    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format(TIMESTAMP_FORMAT),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee { file })))
        .init();

    match open_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_registered_until_guard_drops() {
        let bar = ProgressBar::hidden();
        {
            let _guard = suspend_progress(&bar);
            assert!(PROGRESS.lock().unwrap().is_some());
            write_stderr(b"").unwrap();
        }
        assert!(PROGRESS.lock().unwrap().is_none());
    }
}
