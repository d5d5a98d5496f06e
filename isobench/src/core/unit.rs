//! The unit of code that owns a subject and its hooks.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A class or module exposing introspectable method names.
///
/// Implementations come from whatever discovers benchmarks; the harness only
/// reads from them.
pub trait BenchmarkUnit {
    /// Name the generated script uses to locate the unit.
    fn name(&self) -> &str;
    /// Source file that defines the unit.
    fn source_path(&self) -> &Path;
    /// Whether the unit defines a method called `name`.
    fn has_method(&self, name: &str) -> bool;
}

/// A unit whose method set is declared up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticUnit {
    name: String,
    source_path: PathBuf,
    methods: BTreeSet<String>,
}

impl StaticUnit {
    pub fn new<I, S>(name: impl Into<String>, source_path: impl Into<PathBuf>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.methods.insert(method.into());
        self
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }
}

impl BenchmarkUnit for StaticUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_path(&self) -> &Path {
        &self.source_path
    }

    fn has_method(&self, name: &str) -> bool {
        self.methods.contains(name)
    }
}
