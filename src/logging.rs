//! `log` backend: env_logger writing `[bridge]<utc timestamp> LEVEL message`
//! lines to stderr, optionally mirrored into a log file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use env_logger::{Builder, Env, Target};
use parking_lot::Mutex;

use crate::error::Result;

/// Writer that duplicates every record to stderr and, when configured, a file.
///
/// The file sits behind a mutex so concurrent writers never interleave lines.
#[derive(Clone)]
pub struct LogTee {
    file: Option<Arc<Mutex<File>>>,
}

impl LogTee {
    pub fn stderr_only() -> Self {
        Self { file: None }
    }

    pub fn with_file(file: File) -> Self {
        Self {
            file: Some(Arc::new(Mutex::new(file))),
        }
    }

    /// Append to `path`, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::with_file(file))
    }
}

impl Write for LogTee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Diagnostics must never take the loop down; stderr errors are dropped.
        let _ = io::stderr().write_all(buf);
        if let Some(file) = &self.file {
            let mut file = file.lock();
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file {
            file.lock().flush()?;
        }
        Ok(())
    }
}

/// One formatted log line, without the trailing newline.
pub fn format_line(level: log::Level, message: &str) -> String {
    format!(
        "[bridge]{} {:<5} {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        message
    )
}

/// Install the global logger. `RUST_LOG` overrides the default `info` level.
///
/// A log file that cannot be opened is reported once and logging continues
/// on stderr alone.
pub fn init_logging(log_file: Option<&Path>) {
    let (tee, open_error) = match log_file {
        Some(path) => match LogTee::open(path) {
            Ok(tee) => (tee, None),
            Err(e) => (LogTee::stderr_only(), Some(format!("{}: {}", path.display(), e))),
        },
        None => (LogTee::stderr_only(), None),
    };

    let installed = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "{}", format_line(record.level(), &record.args().to_string()))
        })
        .target(Target::Pipe(Box::new(tee)))
        .try_init()
        .is_ok();

    if installed {
        if let Some(error) = open_error {
            log::warn!("[log] cannot open log file {error}");
        }
    }
}
