// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use mindmosaic::admin::{AdminAuth, AdminService, ExportFile, ExportType};
use mindmosaic::app_config::{self, Config};
use mindmosaic::database::{DatabaseConnection, DateRange, Repository, MAX_RANGE_DAYS};
use mindmosaic::providers::replicate::Replicate;
use mindmosaic::providers::together::Together;
use mindmosaic::providers::Provider;
use mindmosaic::server::{self, state};
use mindmosaic::validation::journal::{is_likely_spam, sanitize_content, validate_journal_content};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// What `export` writes
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportKind {
    /// Stored entries as CSV, in the layout given by --type
    Entries,
    /// Aggregated analytics as CSV
    Analytics,
    /// Feedback aggregates as CSV
    Feedback,
    /// Entries without their text, as JSON
    Anonymized,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on, overriding the configuration
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze one journal entry and print the result as JSON
    Analyze {
        /// Entry text; read from --file when omitted
        #[arg(value_name = "TEXT")]
        text: Option<String>,

        /// File holding the entry text
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Export stored data
    Export {
        #[arg(value_enum, default_value = "entries")]
        kind: ExportKind,

        /// Column layout of the entries export
        #[arg(short = 't', long = "type", default_value = "analytics")]
        export_type: String,

        /// Only the last N days (analytics and anonymized exports)
        #[arg(short, long)]
        days: Option<i64>,

        /// Output file; defaults to the generated file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the plain-text admin report
    Report {
        /// Output file; defaults to the generated file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete entries, sessions and feedback past the retention period
    Cleanup {
        /// Retention in days, overriding the configuration
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Check the connection to the configured AI vendors
    Check,

    /// Generate shell completions for mindmosaic
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// MindMosaic - anonymous journaling with emotional support
#[derive(Parser, Debug)]
#[command(name = "mindmosaic")]
#[command(version)]
#[command(about = "Anonymous mental-health journaling backend")]
#[command(long_about = "MindMosaic analyzes journal entries for emotions and risk, replies with \
supportive suggestions and keeps anonymous analytics for administrators.

EXAMPLES:
    mindmosaic serve                              # Run the API with conf.json
    mindmosaic serve -p 8080                      # Run the API on another port
    mindmosaic analyze \"Exams are stressing me out\"
    mindmosaic export entries -t dataset          # Training dataset CSV
    mindmosaic export analytics -d 7 -o week.csv  # Last week's analytics
    mindmosaic report                             # Plain-text admin report
    mindmosaic cleanup -d 90                      # Keep the last 90 days
    mindmosaic completions bash > mindmosaic.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. A default file is created
    when it does not exist. REPLICATE_API_TOKEN, TOGETHER_API_KEY, ADMIN_EMAIL,
    ADMIN_PASSWORD, MINDMOSAIC_PORT and MINDMOSAIC_DB override it.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Colored stderr logger
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set once config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "mindmosaic", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(&config).await
        }
        Commands::Analyze { text, file } => run_analyze(&config, text, file).await,
        Commands::Export {
            kind,
            export_type,
            days,
            output,
        } => run_export(&config, kind, &export_type, days, output).await,
        Commands::Report { output } => {
            let file = admin_service(&config)?.report().await?;
            write_export(file, output)
        }
        Commands::Cleanup { days } => {
            let repo = open_repository(&config)?;
            let admin = AdminService::new(repo.clone(), AdminAuth::new(&config.admin));
            let report = admin.cleanup(days.unwrap_or(config.retention_days)).await?;

            repo.connection().vacuum()?;
            info!("Database after cleanup: {}", repo.connection().stats()?);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Check => run_check(&config).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(config_path: &str, cli_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;
    config.apply_env_overrides();

    if let Some(level) = cli_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn open_repository(config: &Config) -> Result<Repository> {
    let connection = DatabaseConnection::open(config.database.explicit_path()).context("Failed to open database")?;
    Ok(Repository::new(connection))
}

fn admin_service(config: &Config) -> Result<AdminService> {
    Ok(AdminService::new(open_repository(config)?, AdminAuth::new(&config.admin)))
}

async fn run_analyze(config: &Config, text: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let raw = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read entry from {}", path.display()))?,
        (None, None) => return Err(anyhow!("Provide the entry text or --file")),
    };

    let content = sanitize_content(&raw);
    let validation = validate_journal_content(&content);
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid {
        for message in &validation.errors {
            error!("{}", message);
        }
        return Err(anyhow!("Entry rejected"));
    }
    if is_likely_spam(&content) {
        warn!("Entry looks like test input or spam");
    }

    let detector = state::build_detector(config);
    let responder = state::build_responder(config);

    let analysis = detector.detect(&content).await;
    let reply = responder.respond(&content, &analysis.emotion_names()).await;
    info!(
        "Detected {} emotions, risk {:?}",
        analysis.emotions.len(),
        analysis.risk_level
    );

    let output = serde_json::json!({
        "analysis": analysis,
        "response": reply,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_export(
    config: &Config,
    kind: ExportKind,
    export_type: &str,
    days: Option<i64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let admin = admin_service(config)?;
    let now = Utc::now();
    let range = days
        .map(|days| {
            DateRange::trailing_days(days, now)
                .ok_or_else(|| anyhow!("--days must be between 1 and {}", MAX_RANGE_DAYS))
        })
        .transpose()?;

    let file = match kind {
        ExportKind::Entries => admin.export_entries(export_type.parse::<ExportType>()?).await?,
        ExportKind::Analytics => admin.export_analytics(range).await?,
        ExportKind::Feedback => admin.export_feedback().await?,
        ExportKind::Anonymized => {
            let range = range.unwrap_or_else(|| DateRange::new(now - Duration::days(30), now));
            let entries = admin.anonymized_entries(range).await?;
            ExportFile {
                filename: format!("mindmosaic-anonymized-{}.json", now.timestamp_millis()),
                data: serde_json::to_string_pretty(&entries)?,
                mime_type: "application/json".to_string(),
            }
        }
    };

    write_export(file, output)
}

fn write_export(file: ExportFile, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(&file.filename));
    write_file(&path, &file.data)?;
    info!("Wrote {} ({} bytes)", path.display(), file.data.len());
    Ok(())
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

async fn run_check(config: &Config) -> Result<()> {
    let replicate = Replicate::new(&config.emotion);
    let together = Together::new(&config.generation);

    let (emotion, generation) = tokio::join!(replicate.test_connection(), together.test_connection());

    let mut healthy = true;
    for (name, result) in [("Emotion API", emotion), ("Generation API", generation)] {
        match result {
            Ok(()) => info!("{}: reachable", name),
            Err(e) => {
                healthy = false;
                error!("{}: {}", name, e);
            }
        }
    }

    if healthy {
        Ok(())
    } else {
        Err(anyhow!("One or more AI vendors are unavailable"))
    }
}
