//! Beacon CLI - post analytics digests to a chat channel
//!
//! Usage:
//!   beacon run [--kind <kind>]...
//!   beacon preview [--kind <kind>]...
//!   beacon serve
//!
//! Examples:
//!   beacon run
//!   beacon preview --kind single-day
//!   beacon --config ./beacon.toml serve

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use beacon::config::Settings;
use beacon::delivery::{ChannelId, ConsoleSink, DeliverySink, DiscordSink};
use beacon::logging::init_tracing;
use beacon::pipeline::Pipeline;
use beacon::query::HttpQueryExecutor;
use beacon::report::{ReportFormatter, ReportKind, RequestBuilder};
use beacon::schedule::{Schedule, Scheduler};

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Beacon - scheduled web-analytics digests for a chat channel")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to BEACON_CONFIG, ./beacon.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level or filter directive (overrides --verbose)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the digest once and post it to the configured channel
    Run {
        /// Report kinds to include (defaults to report.kinds from config)
        #[arg(short, long = "kind")]
        kinds: Vec<KindArg>,
    },

    /// Generate the digest once and print it instead of posting
    Preview {
        /// Report kinds to include (defaults to report.kinds from config)
        #[arg(short, long = "kind")]
        kinds: Vec<KindArg>,
    },

    /// Post the digest at the configured times until interrupted
    Serve,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    /// Yesterday's totals
    SingleDay,
    /// Seven-day breakdown
    MultiMetricWindow,
}

impl From<KindArg> for ReportKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::SingleDay => ReportKind::SingleDay,
            KindArg::MultiMetricWindow => ReportKind::MultiMetricWindow,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    let settings = match Settings::load(cli.config.as_deref()).and_then(|s| {
        s.validate()?;
        Ok(s)
    }) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Run { kinds } => cmd_run(&settings, kinds).await,
        Commands::Preview { kinds } => cmd_preview(&settings, kinds).await,
        Commands::Serve => cmd_serve(&settings).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn resolve_kinds(settings: &Settings, args: Vec<KindArg>) -> Vec<ReportKind> {
    if args.is_empty() {
        settings.report.kinds.clone()
    } else {
        args.into_iter().map(Into::into).collect()
    }
}

/// Assemble the pipeline around `sink` from settings.
fn build_pipeline(
    settings: &Settings,
    sink: Arc<dyn DeliverySink>,
    channel: ChannelId,
) -> Result<Pipeline, Box<dyn Error>> {
    let property_id = settings.analytics.resolved_property_id()?;
    let token = settings.analytics.resolved_access_token()?;
    let executor = HttpQueryExecutor::from_settings(&settings.analytics, token)?;

    Ok(Pipeline::new(
        RequestBuilder::new(property_id),
        Arc::new(executor),
        sink,
        channel,
    )
    .with_formatter(ReportFormatter::new(settings.report.label.clone()))
    .with_error_prefix(settings.report.error_prefix.clone()))
}

fn discord_pipeline(settings: &Settings) -> Result<Pipeline, Box<dyn Error>> {
    let channel = ChannelId::new(settings.chat.resolved_channel_id()?);
    let bot_token = settings.chat.resolved_bot_token()?;
    let sink = DiscordSink::from_settings(&settings.chat, bot_token)?;
    build_pipeline(settings, Arc::new(sink), channel)
}

async fn cmd_run(settings: &Settings, kinds: Vec<KindArg>) -> Result<ExitCode, Box<dyn Error>> {
    let pipeline = discord_pipeline(settings)?;
    let kinds = resolve_kinds(settings, kinds);

    let report = pipeline.run(&kinds).await;
    if report.generated && report.segments_failed == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn cmd_preview(settings: &Settings, kinds: Vec<KindArg>) -> Result<ExitCode, Box<dyn Error>> {
    let channel = settings
        .chat
        .resolved_channel_id()
        .unwrap_or_else(|_| "preview".to_string());
    let sink = ConsoleSink::new(settings.chat.limit());
    let pipeline = build_pipeline(settings, Arc::new(sink), ChannelId::new(channel))?;
    let kinds = resolve_kinds(settings, kinds);

    let report = pipeline.run(&kinds).await;
    Ok(if report.generated {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn cmd_serve(settings: &Settings) -> Result<ExitCode, Box<dyn Error>> {
    let schedule = Schedule::from_settings(&settings.schedule)?;
    let pipeline = discord_pipeline(settings)?;
    let kinds = settings.report.kinds.clone();

    info!(times = ?schedule.times(), kinds = ?kinds, "starting scheduler");
    let scheduler = Scheduler::new(Arc::new(pipeline), schedule, kinds);
    let runs = scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!(runs, "scheduler stopped");
    Ok(ExitCode::SUCCESS)
}
