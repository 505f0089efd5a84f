//! Ruff Bridge CLI - Command-line interface for the ruff output adapter
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to domain operations
//! - Handles external concerns like file I/O, process exit codes, and terminal output
//! - Never spawns ruff itself: it consumes captured output, mirroring the
//!   contract the editor host has with this library

use clap::{Parser, Subcommand, ValueEnum};
use ruff_bridge::{
    BridgeError, BridgeResult, BridgeSettings, FileContext, OutputFormat, ReportFormatter,
    ReportOptions, RuffBridge, Severity, SettingsBuilder,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

/// Ruff Bridge - Adapter between editor linting hosts and ruff
#[derive(Parser)]
#[command(name = "ruff-bridge")]
#[command(version = "0.1.0")]
#[command(about = "Translate ruff JSON output into normalized editor diagnostics")]
#[command(
    long_about = "Ruff Bridge gates ruff invocations, translates ruff's JSON diagnostics \
                  into a normalized record format, and synthesizes fix and suppression edits. \
                  Process spawning stays with the caller: this tool reads captured output."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file path (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate captured ruff stdout into normalized records
    Translate {
        /// File holding ruff's captured stdout (defaults to stdin)
        stdout_file: Option<PathBuf>,

        /// File holding ruff's captured stderr
        #[arg(long)]
        stderr_file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,

        /// Minimum severity level to report
        #[arg(short, long, value_enum)]
        severity: Option<SeverityArg>,

        /// Maximum number of records to report
        #[arg(long)]
        max_records: Option<usize>,
    },

    /// Evaluate the invocation guard for a working directory
    Guard {
        /// Working directory to probe
        directory: PathBuf,

        /// Path of the file being linted
        #[arg(long)]
        file: Option<PathBuf>,

        /// Require a local ruff configuration file
        #[arg(long)]
        check_local_config: bool,

        /// Root of the editor's package-management area
        #[arg(long)]
        packages_root: Option<PathBuf>,
    },

    /// Synthesize a noqa suppression comment for a line of a file
    Suppress {
        /// File containing the line to suppress
        file: PathBuf,

        /// Rule code to suppress
        #[arg(long)]
        code: String,

        /// Line number (0-based)
        #[arg(long)]
        line: u32,

        /// Write the modified file back instead of printing the line
        #[arg(long)]
        write: bool,
    },

    /// Print the ruff invocation argv
    Command,
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SeverityArg {
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run_command(cli) {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> BridgeResult<i32> {
    let settings = load_settings(cli.config.as_deref())?;
    let use_colors = !cli.no_color;

    match cli.command {
        Commands::Translate { stdout_file, stderr_file, format, severity, max_records } => {
            run_translate(
                settings,
                stdout_file,
                stderr_file,
                format,
                severity,
                max_records,
                use_colors,
            )
        }
        Commands::Guard { directory, file, check_local_config, packages_root } => {
            run_guard(settings, directory, file, check_local_config, packages_root)
        }
        Commands::Suppress { file, code, line, write } => {
            run_suppress(file, code, line, write)
        }
        Commands::Command => {
            for arg in settings.command_line() {
                println!("{arg}");
            }
            Ok(0)
        }
    }
}

fn load_settings(config_path: Option<&Path>) -> BridgeResult<BridgeSettings> {
    match config_path {
        Some(path) => BridgeSettings::load_from_file(path),
        None => Ok(BridgeSettings::default()),
    }
}

fn run_translate(
    settings: BridgeSettings,
    stdout_file: Option<PathBuf>,
    stderr_file: Option<PathBuf>,
    format: OutputFormatArg,
    severity: Option<SeverityArg>,
    max_records: Option<usize>,
    use_colors: bool,
) -> BridgeResult<i32> {
    let stdout = match stdout_file {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let stderr = match stderr_file {
        Some(path) => std::fs::read_to_string(&path)?,
        None => String::new(),
    };

    let bridge = RuffBridge::with_settings(settings);
    let records: Vec<_> = bridge.parse(&stdout, &stderr).collect();

    let formatter = ReportFormatter::new(ReportOptions {
        use_colors,
        min_severity: severity.map(Into::into),
        max_records,
    });
    print!("{}", formatter.format(&records, format.into())?);

    let has_errors = records.iter().any(|r| r.severity == Severity::Error);
    Ok(if has_errors { 1 } else { 0 })
}

fn run_guard(
    settings: BridgeSettings,
    directory: PathBuf,
    file: Option<PathBuf>,
    check_local_config: bool,
    packages_root: Option<PathBuf>,
) -> BridgeResult<i32> {
    // CLI flags layer on top of the settings file
    let mut builder = SettingsBuilder::new()
        .check_for_local_configuration(
            check_local_config || settings.check_for_local_configuration,
        )
        .config_file_names(settings.config_file_names.clone())
        .type_comment_guard(settings.type_comment_guard);
    if let Some(root) = packages_root.or(settings.packages_root.clone()) {
        builder = builder.packages_root(root);
    }
    let settings = builder.build()?;

    let bridge = RuffBridge::with_settings(settings);
    let context = match file {
        Some(path) => FileContext::for_file(path),
        None => FileContext::unsaved(),
    };

    let decision = bridge.check_invocation(Some(&directory), &context);
    match decision.to_skip_reason() {
        None => {
            println!("proceed: {}", bridge.command_line().join(" "));
            Ok(0)
        }
        Some(reason) => {
            println!("skip: {reason}");
            Ok(2)
        }
    }
}

fn run_suppress(file: PathBuf, code: String, line: u32, write: bool) -> BridgeResult<i32> {
    let contents = std::fs::read_to_string(&file)?;
    let mut lines: Vec<String> = contents.lines().map(String::from).collect();

    let line_text = lines.get(line as usize).ok_or_else(|| {
        BridgeError::config(format!(
            "Line {} out of range for '{}' ({} lines)",
            line,
            file.display(),
            lines.len()
        ))
    })?;

    let replacement = match ruff_bridge::suppress::synthesize(line_text, line, &code)? {
        Some(replacement) => replacement,
        None => {
            // Code already suppressed on that line
            println!("{line_text}");
            return Ok(0);
        }
    };

    let updated = ruff_bridge::suppress::apply_to_line(line_text, &replacement);

    if write {
        lines[line as usize] = updated;
        let trailing_newline = contents.ends_with('\n');
        let mut output = lines.join("\n");
        if trailing_newline {
            output.push('\n');
        }
        std::fs::write(&file, output)?;
    } else {
        println!("{updated}");
    }

    Ok(0)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_translate_from_file() {
        let temp = TempDir::new().unwrap();
        let stdout_path = temp.path().join("stdout.json");
        fs::write(
            &stdout_path,
            r#"[{
                "code": "F401",
                "filename": "api.py",
                "message": "`os` imported but unused",
                "location": { "row": 1, "column": 8 },
                "end_location": { "row": 1, "column": 10 }
            }]"#,
        )
        .unwrap();

        let result = run_translate(
            BridgeSettings::default(),
            Some(stdout_path),
            None,
            OutputFormatArg::Json,
            None,
            None,
            false,
        );

        // F-code record present, so exit code 1
        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn test_translate_empty_output() {
        let temp = TempDir::new().unwrap();
        let stdout_path = temp.path().join("stdout.json");
        fs::write(&stdout_path, "").unwrap();

        let result = run_translate(
            BridgeSettings::default(),
            Some(stdout_path),
            None,
            OutputFormatArg::Human,
            None,
            None,
            false,
        );

        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_guard_skip_exit_code() {
        let temp = TempDir::new().unwrap();

        let result = run_guard(
            BridgeSettings::default(),
            temp.path().to_path_buf(),
            None,
            true,
            None,
        );
        assert_eq!(result.unwrap(), 2);

        fs::write(temp.path().join("ruff.toml"), "").unwrap();
        let result = run_guard(
            BridgeSettings::default(),
            temp.path().to_path_buf(),
            None,
            true,
            None,
        );
        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_suppress_writes_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("api.py");
        fs::write(&file, "import os\nprint(1)\n").unwrap();

        let result = run_suppress(file.clone(), "F401".to_string(), 0, true);
        assert_eq!(result.unwrap(), 0);

        let contents = fs::read_to_string(&file).unwrap();
        assert_eq!(contents, "import os  # noqa: F401\nprint(1)\n");
    }

    #[test]
    fn test_suppress_refuses_structural_code() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("api.py");
        fs::write(&file, "x = 1\n").unwrap();

        let result = run_suppress(file, "E999".to_string(), 0, false);
        assert!(result.is_err());
    }

    #[test]
    fn test_suppress_out_of_range_line() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("api.py");
        fs::write(&file, "x = 1\n").unwrap();

        let result = run_suppress(file, "E501".to_string(), 10, false);
        assert!(result.is_err());
    }
}
