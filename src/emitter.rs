//! Output of converted SQL: stdout and/or a file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};

/// Writes a finished conversion. No transformation happens here.
#[derive(Debug, Clone)]
pub struct Emitter {
    stdout: bool,
    output: Option<PathBuf>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            stdout: true,
            output: None,
        }
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print to standard output (default on).
    pub fn stdout(mut self, enabled: bool) -> Self {
        self.stdout = enabled;
        self
    }

    /// Also write to this file, replacing its contents.
    ///
    /// The file is written to a sibling temporary and renamed into place, so
    /// an existing file is either fully replaced or left untouched.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Emit `sql` to every configured destination.
    ///
    /// The file comes first: when it cannot be written, nothing reaches
    /// stdout. I/O failures are reported, never retried.
    pub fn emit(&self, sql: &str) -> ConvertResult<()> {
        if let Some(path) = &self.output {
            Self::write_file(path, sql).map_err(|e| ConvertError::io(path, e))?;
            debug!(path = %path.display(), bytes = sql.len(), "wrote output file");
        }
        if self.stdout {
            let stdout = std::io::stdout();
            Self::write_to(&mut stdout.lock(), sql)
                .map_err(|e| ConvertError::io("<stdout>", e))?;
        }
        Ok(())
    }

    fn write_file(path: &Path, sql: &str) -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        Self::write_to(&mut tmp, sql)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Write `sql` plus a trailing newline and flush.
    pub fn write_to<W: Write>(writer: &mut W, sql: &str) -> std::io::Result<()> {
        writeln!(writer, "{}", sql)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_to_appends_newline() {
        let mut buf = Vec::new();
        Emitter::write_to(&mut buf, "SELECT 1").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "SELECT 1\n");
    }

    #[test]
    fn test_emit_to_file_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.sql");
        let emitter = Emitter::new().stdout(false).output(&path);
        emitter.emit("SELECT a FROM t").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "SELECT a FROM t\n");
    }

    #[test]
    fn test_emit_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.sql");
        std::fs::write(&path, "SELECT old FROM t\nSELECT longer_old FROM t\n").unwrap();
        Emitter::new().stdout(false).output(&path).emit("SELECT 1").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "SELECT 1\n");
        // no temporaries left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unwritable_destination_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("out.sql");
        let err = Emitter::new().stdout(false).output(&path).emit("SELECT 1").unwrap_err();
        match err {
            ConvertError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected IO error, got {other}"),
        }
        assert!(!path.exists());
    }
}
