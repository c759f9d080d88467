//! # Context Trace Log
//!
//! Append-only, best-effort side channel for diagnosing dependency
//! resolution: one line per dispatch decision or assembly event. Failures
//! are swallowed; tracing never affects the operations it records.

use std::io::Write;
use std::path::PathBuf;

/// Best-effort append-only trace sink.
pub struct TraceLog {
    path: Option<PathBuf>,
}

impl TraceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A sink that drops everything (tests, CLI one-shots).
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Append one line. Never fails.
    pub fn record(&self, line: &str) {
        let Some(path) = &self.path else {
            return;
        };
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{}", line.trim_end())
        })();
        if let Err(err) = result {
            tracing::debug!(error = %err, "context trace write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context_trace.log");
        let log = TraceLog::new(&path);

        log.record("[dispatch] action=ask_user");
        log.record("[prepare_input] skill=script_from_transcript ctx=transcript\n");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "[dispatch] action=ask_user\n[prepare_input] skill=script_from_transcript ctx=transcript\n"
        );
    }

    #[test]
    fn disabled_sink_is_silent() {
        TraceLog::disabled().record("nothing happens");
    }

    #[test]
    fn unwritable_path_is_swallowed() {
        let log = TraceLog::new("/proc/definitely/not/writable/trace.log");
        log.record("still no panic");
    }
}
