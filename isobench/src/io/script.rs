//! Script generation from a minijinja template.
//!
//! Templates see a fixed set of placeholders. Every `{{ ... }}` expression goes
//! through [`literal_formatter`], so caller data lands in the script as an
//! escaped JSON literal instead of raw text.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use minijinja::{Environment, ErrorKind, Output, State, UndefinedBehavior, Value, context};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::core::literal;
use crate::core::types::ExecutionRequest;
use crate::core::unit::BenchmarkUnit;
use crate::error::ExecuteError;

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/runner.php.j2");
const TEMPLATE_NAME: &str = "runner";

/// Version of the `payload` envelope handed to templates.
pub const PAYLOAD_VERSION: u32 = 1;

/// Variables a template may reference.
pub const PLACEHOLDERS: [&str; 9] = [
    "bootstrap",
    "unit",
    "file",
    "subject",
    "revolutions",
    "before_hooks",
    "after_hooks",
    "parameters",
    "payload",
];

/// Global functions minijinja provides without a context entry.
const BUILTIN_GLOBALS: [&str; 4] = ["range", "dict", "debug", "namespace"];

/// Every execution parameter in one self-describing document.
#[derive(Debug, Serialize)]
struct Payload<'a> {
    version: u32,
    bootstrap: Option<String>,
    unit: &'a str,
    file: String,
    subject: &'a str,
    revolutions: u64,
    before_hooks: &'a [String],
    after_hooks: &'a [String],
    parameters: &'a BTreeMap<String, serde_json::Value>,
}

/// Renders execution requests into standalone scripts.
#[derive(Debug, Clone)]
pub struct ScriptGenerator {
    source: String,
}

impl ScriptGenerator {
    /// Generator for the bundled PHP runner template.
    pub fn builtin() -> Self {
        Self::from_source(BUILTIN_TEMPLATE).expect("builtin template should be valid")
    }

    /// Generator for a template given as text.
    ///
    /// Fails if the template does not parse or references a variable outside
    /// [`PLACEHOLDERS`].
    pub fn from_source(source: impl Into<String>) -> Result<Self, ExecuteError> {
        let source = source.into();
        {
            let env = environment(&source).map_err(render_error)?;
            let template = env.get_template(TEMPLATE_NAME).map_err(render_error)?;
            check_placeholders(template.undeclared_variables(false))?;
        }
        Ok(Self { source })
    }

    /// Generator for a template file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?;
        Self::from_source(source).with_context(|| format!("load template {}", path.display()))
    }

    /// Render the script for one execution of `request` against `unit`.
    #[instrument(skip_all, fields(unit = unit.name(), subject = request.subject()))]
    pub fn generate(
        &self,
        bootstrap: Option<&Path>,
        unit: &dyn BenchmarkUnit,
        request: &ExecutionRequest,
    ) -> Result<String, ExecuteError> {
        let payload = Payload {
            version: PAYLOAD_VERSION,
            bootstrap: bootstrap.map(|path| path.to_string_lossy().into_owned()),
            unit: unit.name(),
            file: unit.source_path().to_string_lossy().into_owned(),
            subject: request.subject(),
            revolutions: request.revolutions(),
            before_hooks: request.before_hooks(),
            after_hooks: request.after_hooks(),
            parameters: request.parameters(),
        };

        let env = environment(&self.source).map_err(render_error)?;
        let template = env.get_template(TEMPLATE_NAME).map_err(render_error)?;
        let rendered = template
            .render(context! {
                bootstrap => &payload.bootstrap,
                unit => payload.unit,
                file => &payload.file,
                subject => payload.subject,
                revolutions => payload.revolutions,
                before_hooks => payload.before_hooks,
                after_hooks => payload.after_hooks,
                parameters => payload.parameters,
                payload => &payload,
            })
            .map_err(render_error)?;

        ensure_resolved(&rendered)?;
        debug!(bytes = rendered.len(), "rendered script");
        Ok(rendered)
    }
}

impl Default for ScriptGenerator {
    fn default() -> Self {
        Self::builtin()
    }
}

fn environment(source: &str) -> Result<Environment<'_>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.set_formatter(literal_formatter);
    env.add_template(TEMPLATE_NAME, source)?;
    Ok(env)
}

/// Writes every printed value as an escaped JSON literal; `none` prints nothing.
fn literal_formatter(
    out: &mut Output<'_>,
    _state: &State<'_, '_>,
    value: &Value,
) -> Result<(), minijinja::Error> {
    if value.is_none() || value.is_undefined() {
        return Ok(());
    }
    let text = literal::to_literal_from(value)
        .map_err(|err| minijinja::Error::new(ErrorKind::BadSerialization, err.to_string()))?;
    out.write_str(&text)
        .map_err(|_| minijinja::Error::from(ErrorKind::WriteFailure))
}

fn check_placeholders(variables: HashSet<String>) -> Result<(), ExecuteError> {
    let mut unknown: Vec<String> = variables
        .into_iter()
        .filter(|name| !PLACEHOLDERS.contains(&name.as_str()))
        .filter(|name| !BUILTIN_GLOBALS.contains(&name.as_str()))
        .collect();
    unknown.sort();
    match unknown.into_iter().next() {
        Some(name) => Err(ExecuteError::UnknownPlaceholder { name }),
        None => Ok(()),
    }
}

/// Reject output that still carries template markers.
fn ensure_resolved(rendered: &str) -> Result<(), ExecuteError> {
    static MARKER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{\{.*?\}\}|\{%.*?%\}").unwrap());

    match MARKER_RE.find(rendered) {
        Some(marker) => Err(ExecuteError::Render {
            message: format!("unresolved marker `{}` in rendered script", marker.as_str()),
        }),
        None => Ok(()),
    }
}

fn render_error(err: minijinja::Error) -> ExecuteError {
    ExecuteError::Render {
        message: err.to_string(),
    }
}
