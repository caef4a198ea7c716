use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn, Level};
use toprest_core::time::{format_file_stamp, format_trace_time, now, DateTime};
use toprest_core::{Error, ParameterSet, Result};

use crate::{ApiMethod, Payload, ResponseCodec, ResponseFormat};

/// Recorder persists the artifacts of one invocation.
///
/// Every artifact is named `<category>_<YYYY-MM-DD_HH-MM-SS>.<ext>` using the
/// invocation time. A name that is already taken gets a `_1`, `_2`, ...
/// suffix; existing files are never overwritten.
#[derive(Debug, Clone)]
pub struct Recorder {
    dir: PathBuf,
    method: ApiMethod,
    format: ResponseFormat,
    stamp: String,
}

impl Recorder {
    /// Create a recorder writing into `dir`.
    ///
    /// The directory is created on first write.
    pub fn new(
        dir: impl Into<PathBuf>,
        method: ApiMethod,
        format: ResponseFormat,
        at: DateTime,
    ) -> Self {
        Self {
            dir: dir.into(),
            method,
            format,
            stamp: format_file_stamp(at),
        }
    }

    /// The log directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the append-only trace file.
    pub fn trace_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.method.slug()))
    }

    /// Write `request_<ts>`.
    pub fn record_request(&self, redacted: &ParameterSet) -> Result<PathBuf> {
        let body = self.codec().render_request(redacted)?;
        self.write("request", &body)
    }

    /// Write `response_<ts>`.
    pub fn record_response(&self, payload: &Payload) -> Result<PathBuf> {
        let body = self.codec().render_response(payload)?;
        self.write("response", &body)
    }

    /// Write `<slug>_logs_<ts>`.
    pub fn record_combined(&self, redacted: &ParameterSet, payload: &Payload) -> Result<PathBuf> {
        let body = self.codec().render_combined(redacted, payload)?;
        self.write(&format!("{}_logs", self.method.slug()), &body)
    }

    /// Write `<slug>_error_<ts>` for a call that produced no usable reply.
    pub fn record_error(&self, redacted: &ParameterSet, description: &str) -> Result<PathBuf> {
        let body = self.codec().render_failure(redacted, description)?;
        self.write(&format!("{}_error", self.method.slug()), &body)
    }

    /// Write `error_response_<ts>` for a reply carrying an error envelope.
    pub fn record_api_error(&self, redacted: &ParameterSet, payload: &Payload) -> Result<PathBuf> {
        let body = self.codec().render_combined(redacted, payload)?;
        self.write("error_response", &body)
    }

    /// Append `<asctime> - <LEVEL> - <message>` to the trace file.
    pub fn trace(&self, level: Level, message: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.trace_path();

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| persistence(&path, e))?;
        writeln!(
            f,
            "{} - {} - {}",
            format_trace_time(now()),
            level_name(level),
            message
        )
        .map_err(|e| persistence(&path, e))
    }

    fn codec(&self) -> &'static dyn ResponseCodec {
        self.format.codec()
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::persistence(format!(
                "failed to create log directory {}",
                self.dir.display()
            ))
            .with_source(e)
        })
    }

    /// Write `contents` to a temp file in the log directory and move it
    /// into place without replacing anything.
    fn write(&self, category: &str, contents: &str) -> Result<PathBuf> {
        self.ensure_dir()?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".toprest-")
            .tempfile_in(&self.dir)
            .map_err(|e| persistence(&self.dir, e))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| persistence(tmp.path(), e))?;

        let base = format!("{category}_{}", self.stamp);
        let ext = self.format.extension();
        let mut path = self.dir.join(format!("{base}.{ext}"));
        let mut suffix = 0;
        loop {
            match tmp.persist_noclobber(&path) {
                Ok(_) => {
                    if suffix > 0 {
                        warn!("{base}.{ext} already exists, wrote {}", path.display());
                    }
                    debug!("wrote {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    tmp = e.file;
                    suffix += 1;
                    path = self.dir.join(format!("{base}_{suffix}.{ext}"));
                }
                Err(e) => return Err(persistence(&path, e.error)),
            }
        }
    }
}

fn persistence(path: &Path, err: io::Error) -> Error {
    Error::persistence(format!("failed to write {}", path.display())).with_source(err)
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
