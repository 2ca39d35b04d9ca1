use {
    anyhow::{Context as _, Result},
    clap::{Parser, Subcommand},
    std::{
        path::{Path, PathBuf},
        sync::Arc,
        time::Duration,
    },
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
    verwatch_config::{Severity, ValidationResult, VerwatchConfig},
    verwatch_watcher::{CycleOutcome, FileStore, IntervalTicker, LogSink, WatchTarget, Watcher},
};

#[derive(Parser)]
#[command(
    name = "verwatch",
    about = "Watches a remote version endpoint and announces changes on Discord"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file (skips discovery).
    #[arg(long, global = true, env = "VERWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch for changes and announce them on Discord (default when no
    /// subcommand is provided).
    Run,
    /// Run a single watch cycle without Discord and print the outcome.
    Once,
    /// Validate the configuration file and report problems.
    CheckConfig,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "verwatch starting");

    match cli.command {
        None | Some(Commands::Run) => run(cli.config.as_deref()).await,
        Some(Commands::Once) => once(cli.config.as_deref()).await,
        Some(Commands::CheckConfig) => check_config(cli.config.as_deref()),
    }
}

/// Watch loop plus the Discord bot, until either exits or ctrl-c.
async fn run(config_path: Option<&Path>) -> Result<()> {
    let report = verwatch_config::validate::validate(config_path);
    log_diagnostics(&report);
    if report.has_errors() {
        anyhow::bail!("configuration has errors; run `verwatch check-config` for details");
    }

    let config = load_config(config_path)?;
    let store = Arc::new(open_store(&config)?);
    info!(path = %store.path().display(), "watermark store ready");

    let mut discord = verwatch_discord::build_client(&config, store.clone()).await?;
    let sink = Arc::new(verwatch_discord::ChannelSink::new(
        discord.http.clone(),
        &config.discord,
    )?);

    let watcher = Watcher::new(http_client(&config)?, watch_target(&config), store, sink);
    let ticker = IntervalTicker::new(Duration::from_secs(config.watch.interval_secs));

    info!(
        endpoint = %config.watch.endpoint,
        interval_secs = config.watch.interval_secs,
        "watch loop starting"
    );

    tokio::select! {
        result = discord.start() => result.context("discord client exited"),
        () = watcher.run(ticker) => Ok(()),
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for shutdown signal")?;
            info!("shutting down");
            Ok(())
        },
    }
}

/// One cycle against the configured endpoint, logging instead of Discord.
async fn once(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = Arc::new(open_store(&config)?);
    let watcher = Watcher::new(
        http_client(&config)?,
        watch_target(&config),
        store,
        Arc::new(LogSink),
    );

    match watcher.cycle().await? {
        CycleOutcome::Changed(record) => {
            println!("changed: {} ({})", record.platform_version, record.version_date);
        },
        CycleOutcome::Unchanged => println!("unchanged"),
    }
    Ok(())
}

fn check_config(config_path: Option<&Path>) -> Result<()> {
    let report = verwatch_config::validate::validate(config_path);

    match &report.config_path {
        Some(path) => println!("checking {}", path.display()),
        None => println!("no config file found; defaults apply"),
    }
    for d in &report.diagnostics {
        if d.path.is_empty() {
            println!("  {} [{}] {}", d.severity, d.category, d.message);
        } else {
            println!("  {} [{}] {}: {}", d.severity, d.category, d.path, d.message);
        }
    }

    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    if errors > 0 {
        anyhow::bail!("{errors} error(s), {warnings} warning(s)");
    }
    if warnings > 0 {
        println!("configuration OK with {warnings} warning(s)");
    } else {
        println!("configuration OK");
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<VerwatchConfig> {
    match path {
        Some(path) => verwatch_config::load_config(path),
        None => Ok(verwatch_config::discover_and_load()),
    }
}

fn log_diagnostics(report: &ValidationResult) {
    for d in &report.diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
            Severity::Info => info!(path = %d.path, "{}", d.message),
        }
    }
}

fn watch_target(config: &VerwatchConfig) -> WatchTarget {
    WatchTarget {
        endpoint: config.watch.endpoint.clone(),
        platform: config.watch.platform.clone(),
        version_field: config.watch.version_field.clone(),
        date_field: config.watch.date_field.clone(),
    }
}

fn http_client(config: &VerwatchConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.watch.request_timeout_secs))
        .build()
        .context("failed to build http client")
}

fn open_store(config: &VerwatchConfig) -> Result<FileStore> {
    match &config.watch.state_file {
        Some(path) => Ok(FileStore::new(path.clone())),
        None => FileStore::open_default(),
    }
}
