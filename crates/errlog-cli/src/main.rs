//! errlog - render captured errors as self-contained HTML reports.

use clap::{Args, Parser, Subcommand};
use errlog_cli::exit_codes::ExitCode;
use errlog_cli::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use errlog_common::{severity_label, Severity, ThrowableRecord, Value};
use errlog_report::{ErrorLogger, FileSink, ReportConfig, ReportError, Sink, StdoutSink};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Render captured errors as HTML reports
#[derive(Parser)]
#[command(name = "errlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Diagnostic log format on stderr (human, jsonl)
    #[arg(long, global = true, env = "ERRLOG_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a throwable record (JSON) as an HTML report
    Render(RenderArgs),

    /// Print the label of a severity code
    Severity(SeverityArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Throwable record to render (JSON)
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Variables to dump after the error section (JSON)
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Track shared scalar slots in the dump
    #[arg(long, requires = "dump")]
    scalar_refs: bool,

    /// Write the report to stdout instead of a file
    #[arg(long, conflicts_with = "dir")]
    screen: bool,

    /// Directory for report files
    #[arg(long, env = "ERRLOG_DIR")]
    dir: Option<PathBuf>,

    /// Report configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SeverityArgs {
    /// Severity code, e.g. 2 or 8192
    #[arg(required_unless_present = "all", allow_negative_numbers = true)]
    code: Option<i64>,

    /// List every known code
    #[arg(long)]
    all: bool,
}

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let exit_code = match &cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Severity(args) => run_severity(args),
    };

    std::process::exit(exit_code.as_i32());
}

fn run_render(args: &RenderArgs) -> ExitCode {
    let config = match &args.config {
        Some(path) => match ReportConfig::load(path) {
            Ok(config) => config,
            Err(ReportError::IoError(e)) => return fail(ExitCode::IoError, path, &e),
            Err(e) => return fail(ExitCode::ArgsError, path, &e),
        },
        None => ReportConfig::default(),
    };

    let record = match ThrowableRecord::load(&args.input) {
        Ok(record) => record,
        Err(errlog_common::Error::Io(e)) => return fail(ExitCode::IoError, &args.input, &e),
        Err(e) => return fail(ExitCode::ArgsError, &args.input, &e),
    };
    debug!(
        type_name = %record.type_name,
        frames = record.frames.len(),
        causes = record.cause_depth(),
        "record loaded"
    );

    let dump = match args.dump.as_deref().map(load_dump).transpose() {
        Ok(dump) => dump,
        Err((code, path, message)) => return fail(code, &path, &message),
    };

    if args.screen {
        let mut logger = ErrorLogger::new(StdoutSink, config);
        render_with(&mut logger, &record, dump, args.scalar_refs)
    } else {
        let dir = args.dir.clone().unwrap_or_else(default_report_dir);
        let mut logger = ErrorLogger::new(FileSink::new(dir), config);
        let code = render_with(&mut logger, &record, dump, args.scalar_refs);
        if let Some(path) = logger.sink().last_path().filter(|_| code.is_success()) {
            println!("{}", path.display());
        }
        code
    }
}

fn render_with<S: Sink>(
    logger: &mut ErrorLogger<S>,
    record: &ThrowableRecord,
    dump: Option<Value>,
    scalar_refs: bool,
) -> ExitCode {
    if let Some(value) = dump {
        logger.dump_vars(value, scalar_refs);
    }
    match logger.try_log_error(record) {
        Ok(bytes) => {
            info!(bytes, "report rendered");
            ExitCode::Clean
        }
        Err(ReportError::DumpError(e)) => {
            eprintln!("errlog: dump rejected: {}", e);
            ExitCode::ArgsError
        }
        Err(e) => {
            eprintln!("errlog: {}", e);
            ExitCode::IoError
        }
    }
}

fn load_dump(path: &Path) -> Result<Value, (ExitCode, PathBuf, String)> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| (ExitCode::IoError, path.to_path_buf(), e.to_string()))?;
    let json: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| (ExitCode::ArgsError, path.to_path_buf(), e.to_string()))?;
    Ok(Value::from(json))
}

fn default_report_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("errlog")
}

fn run_severity(args: &SeverityArgs) -> ExitCode {
    if args.all {
        for severity in Severity::ALL {
            println!("{}\t{}", severity.code(), severity.label());
        }
        return ExitCode::Clean;
    }

    let Some(code) = args.code else {
        return ExitCode::ArgsError;
    };
    match severity_label(code) {
        Some(label) => {
            println!("{}", label);
            ExitCode::Clean
        }
        None => {
            eprintln!("errlog: unknown severity code {}", code);
            ExitCode::ArgsError
        }
    }
}

fn fail(code: ExitCode, path: &Path, error: &dyn std::fmt::Display) -> ExitCode {
    eprintln!("errlog: {}: {}", path.display(), error);
    code
}
