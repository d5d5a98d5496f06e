//! Isolated benchmark subject runner.
//!
//! Renders a script for one subject, runs it in its own process and prints the
//! decoded metrics as JSON on stdout. Diagnostics go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use isobench::io::config::{DEFAULT_CONFIG_FILE, absolute_config_path, load_config};
use isobench::{ExecuteError, ExecutionRequest, Executor, StaticUnit, exit_codes, logging};
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "isobench",
    version,
    about = "Run a benchmark subject in an isolated process"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute the subject once and print its metrics as JSON.
    Run(SubjectArgs),
    /// Print the generated script without running it.
    Render(SubjectArgs),
}

#[derive(Args, Debug)]
struct SubjectArgs {
    /// Harness config file (TOML, or JSON by extension). Defaults apply if missing.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Name of the benchmark unit (class or module).
    #[arg(long)]
    unit: String,
    /// Source file defining the unit.
    #[arg(long)]
    file: PathBuf,
    /// Methods the unit defines besides the subject. Repeatable.
    #[arg(long = "method")]
    methods: Vec<String>,
    /// Method to measure.
    #[arg(long)]
    subject: String,
    /// Number of times the subject is invoked inside the measured window.
    #[arg(long, default_value_t = 0)]
    revolutions: u64,
    /// Hook run before the revolutions. Repeatable, runs in order.
    #[arg(long = "before")]
    before: Vec<String>,
    /// Hook run after the revolutions. Repeatable, runs in order.
    #[arg(long = "after")]
    after: Vec<String>,
    /// Parameter as `name=value`; the value is parsed as JSON, else taken as a string.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,
    /// Kill the subject after this many seconds (overrides the config).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl SubjectArgs {
    fn unit(&self) -> StaticUnit {
        StaticUnit::new(&self.unit, &self.file, self.methods.iter().cloned())
            .with_method(&self.subject)
    }

    fn request(&self) -> ExecutionRequest {
        ExecutionRequest::new(&self.subject)
            .with_revolutions(self.revolutions)
            .with_before_hooks(self.before.iter().cloned())
            .with_after_hooks(self.after.iter().cloned())
            .with_parameters(self.params.iter().cloned().collect())
    }

    fn executor(&self) -> Result<Executor> {
        let config_path = absolute_config_path(&self.config)?;
        let mut config = load_config(&config_path)?;
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
            config.validate()?;
        }
        Executor::from_config(&config_path, &config)
    }
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            err.downcast_ref::<ExecuteError>()
                .map(exit_codes::for_error)
                .unwrap_or(exit_codes::INVALID)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => cmd_run(&args),
        Command::Render(args) => cmd_render(&args),
    }
}

fn cmd_run(args: &SubjectArgs) -> Result<()> {
    let executor = args.executor()?;
    let result = executor.execute(&args.unit(), &args.request())?;
    let payload = serde_json::to_string_pretty(&result).context("serialize result")?;
    println!("{payload}");
    Ok(())
}

fn cmd_render(args: &SubjectArgs) -> Result<()> {
    let executor = args.executor()?;
    let script = executor.render(&args.unit(), &args.request())?;
    print!("{script}");
    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got `{raw}`"))?;
    if name.is_empty() {
        return Err(anyhow!("parameter name must not be empty"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
