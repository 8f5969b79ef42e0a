mod cli;
mod commands;
mod error_fmt;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use battcal_config::{Config, Logging};
use battcal_core::{Calibrator, ClosedFormFallback};
use battcal_store::CsvSampleStore;
use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE};

fn main() {
    if let Err(e) = run() {
        let json = JSON_MODE.get().copied().unwrap_or(false);
        if json {
            eprintln!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn run() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = load_config(cli.config.as_deref())?;
    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    // Held until return; dropping it flushes the file sink
    let _guard = init_tracing(cli.json, &level, &cfg.logging)?;

    let store_path = cli.store.clone().unwrap_or_else(|| cfg.store.path.clone());
    tracing::debug!(store = %store_path.display(), "opening sample store");
    let store = CsvSampleStore::open(&store_path)
        .wrap_err_with(|| format!("open sample store {}", store_path.display()))?;
    let fallback = ClosedFormFallback::from(&cfg.fallback);

    let stdout = io::stdout();
    match cli.cmd {
        Commands::Add {
            voltage,
            percentage,
        } => commands::run_add(&store, voltage, percentage, cli.json, &mut stdout.lock()),
        Commands::Update {
            id,
            voltage,
            percentage,
        } => commands::run_update(&store, id, voltage, percentage, cli.json, &mut stdout.lock()),
        Commands::List => commands::run_list(&store, cli.json, &mut stdout.lock()),
        Commands::Import { csv } => {
            commands::run_import(&store, &csv, cli.json, &mut stdout.lock())
        }
        Commands::Estimate { voltage } => {
            let cal = Calibrator::new(&store).with_fallback(fallback);
            commands::run_estimate(&cal, voltage, cli.json, &mut stdout.lock())
        }
        Commands::Annotate { input, output } => {
            let cal = Calibrator::new(&store).with_fallback(fallback);
            match output {
                Some(path) => {
                    let f = File::create(&path)
                        .wrap_err_with(|| format!("create output CSV {}", path.display()))?;
                    commands::run_annotate(&cal, &input, BufWriter::new(f)).map(|_| ())
                }
                None => commands::run_annotate(&cal, &input, stdout.lock()).map(|_| ()),
            }
        }
    }
}

/// `--config` must exist when given; otherwise the default path is optional.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path: PathBuf = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG);
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let text = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = battcal_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    Ok(cfg)
}

fn init_tracing(
    json: bool,
    level: &str,
    logging: &Logging,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let console: Box<dyn Layer<Registry> + Send + Sync> = if json {
        fmt::layer().json().with_writer(io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .boxed()
    };
    let mut layers = vec![console];
    let mut guard = None;

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("create log directory {}", dir.display()))?;
        let rotation = logging.rotation.as_deref().map(str::to_ascii_lowercase);
        let appender = match rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;
    Ok(guard)
}
