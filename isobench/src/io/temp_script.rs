//! Scoped storage for generated scripts.

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::ExecuteError;

const SCRIPT_PREFIX: &str = "isobench-";

/// A generated script on disk, owned by exactly one execution.
///
/// The file name is unique within `dir`, so concurrent executions never share a
/// script. The file is removed by [`TemporaryScript::remove`] or, failing that,
/// when the value is dropped. Removal failures are logged, never returned.
#[derive(Debug)]
pub struct TemporaryScript {
    path: Option<TempPath>,
}

impl TemporaryScript {
    /// Create a uniquely named file in `dir` holding `contents`.
    pub fn create(dir: &Path, suffix: &str, contents: &str) -> Result<Self, ExecuteError> {
        let mut file = tempfile::Builder::new()
            .prefix(SCRIPT_PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)
            .map_err(|source| ExecuteError::ScriptWrite {
                path: dir.to_path_buf(),
                source,
            })?;

        let written = file
            .write_all(contents.as_bytes())
            .and_then(|()| file.flush());
        if let Err(source) = written {
            return Err(ExecuteError::ScriptWrite {
                path: file.path().to_path_buf(),
                source,
            });
        }

        let path = file.into_temp_path();
        debug!(script = %path.display(), bytes = contents.len(), "wrote script");
        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new(""))
    }

    /// Delete the script now, logging if that fails.
    pub fn remove(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let shown = path.to_path_buf();
        match path.close() {
            Ok(()) => debug!(script = %shown.display(), "removed script"),
            Err(err) => warn!(script = %shown.display(), err = %err, "failed to remove script"),
        }
    }
}

impl Drop for TemporaryScript {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn create_writes_contents_with_prefix_and_suffix() {
        let temp = tempfile::tempdir().expect("tempdir");
        let script = TemporaryScript::create(temp.path(), ".php", "<?php echo 1;").expect("create");

        let name = script
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .expect("file name")
            .to_string();
        assert!(name.starts_with(SCRIPT_PREFIX));
        assert!(name.ends_with(".php"));
        assert_eq!(fs::read_to_string(script.path()).expect("read"), "<?php echo 1;");
    }

    #[test]
    fn remove_deletes_the_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let script = TemporaryScript::create(temp.path(), ".sh", "exit 0").expect("create");
        let path = script.path().to_path_buf();

        script.remove();
        assert!(!path.exists());
    }

    #[test]
    fn drop_deletes_the_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = {
            let script = TemporaryScript::create(temp.path(), ".sh", "exit 0").expect("create");
            script.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn names_are_unique() {
        let temp = tempfile::tempdir().expect("tempdir");
        let first = TemporaryScript::create(temp.path(), ".sh", "a").expect("create");
        let second = TemporaryScript::create(temp.path(), ".sh", "b").expect("create");
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = TemporaryScript::create(&temp.path().join("absent"), ".sh", "a")
            .expect_err("no directory");
        assert!(matches!(err, ExecuteError::ScriptWrite { .. }));
    }
}
