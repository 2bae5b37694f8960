use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use promcheck_config::LintConfig;
use promcheck_core::{Input, Validator, ValidatorOptions};
use promcheck_format::{OutputFormat, Report};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "PROMCHECK_LOG";

/// Exit code for malformed command lines.
const USAGE_EXIT_CODE: i32 = 4;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { USAGE_EXIT_CODE } else { 0 };
            err.print()?;
            return Ok(code);
        }
    };
    init_tracing();

    match cli.command {
        Command::Check(check) => match check.command {
            CheckCommand::Config(args) => handle_check_config(args),
            CheckCommand::Rules(args) => handle_check_rules(args),
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_check_config(args: CheckConfigArgs) -> Result<i32> {
    let CheckConfigArgs {
        syntax_only,
        lint,
        files,
    } = args;

    let validator = Validator::new(ValidatorOptions {
        syntax_only,
        lint: lint.config(),
    });
    let mut report = Report::default();
    for file in &files {
        debug!(file = %file.display(), "checking configuration");
        for file_report in validator.check_config_file(&Input::from_arg(file)) {
            report.push(file_report);
        }
    }
    finish(&report, lint.format)
}

fn handle_check_rules(args: CheckRulesArgs) -> Result<i32> {
    let CheckRulesArgs { lint, files } = args;

    let validator = Validator::new(ValidatorOptions {
        syntax_only: false,
        lint: lint.config(),
    });
    let mut report = Report::default();
    for file in &files {
        debug!(file = %file.display(), "checking rules");
        report.push(validator.check_rules_file(&Input::from_arg(file)));
    }
    finish(&report, lint.format)
}

fn finish(report: &Report, format: FormatValue) -> Result<i32> {
    let rendered = report
        .render(format.into())
        .context("Failed to render report")?;
    emit(&rendered)?;
    Ok(report.exit_code())
}

fn emit(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match handle.write_all(content.as_bytes()).and_then(|_| handle.flush()) {
        Ok(()) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(err).context("Failed to write report"),
    }
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Offline validator for Prometheus-style configuration and rule files",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate configuration or rule files
    Check(CheckArgs),
}

#[derive(Args)]
struct CheckArgs {
    #[command(subcommand)]
    command: CheckCommand,
}

#[derive(Subcommand)]
enum CheckCommand {
    /// Check configuration files and the rule files they reference
    Config(CheckConfigArgs),
    /// Check rule files
    Rules(CheckRulesArgs),
}

#[derive(Args)]
struct LintArgs {
    /// Comma-separated lint checks: all, duplicate-rules, none
    #[arg(long, value_name = "CHECKS", default_value = "duplicate-rules")]
    lint: String,
    /// Treat lint findings as failures (exit code 3)
    #[arg(long = "lint-fatal")]
    lint_fatal: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = FormatValue::Plain)]
    format: FormatValue,
}

impl LintArgs {
    fn config(&self) -> LintConfig {
        LintConfig::new(&self.lint, self.lint_fatal)
    }
}

#[derive(Args)]
struct CheckConfigArgs {
    /// Only check syntax; skip every filesystem lookup
    #[arg(long = "syntax-only")]
    syntax_only: bool,
    #[command(flatten)]
    lint: LintArgs,
    /// Configuration files to check (`-` reads standard input)
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

#[derive(Args)]
struct CheckRulesArgs {
    #[command(flatten)]
    lint: LintArgs,
    /// Rule files to check (`-` reads standard input)
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatValue {
    Plain,
    Json,
}

impl From<FormatValue> for OutputFormat {
    fn from(value: FormatValue) -> Self {
        match value {
            FormatValue::Plain => OutputFormat::Plain,
            FormatValue::Json => OutputFormat::Json,
        }
    }
}
