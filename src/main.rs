use anyhow::{anyhow, Context, Result};
use clap::Parser;
use songplay_warehouse::config::{AppConfig, CliConfig, FileConfig};
use songplay_warehouse::events::{SongplayIdStrategy, TimeZoneMode};
use songplay_warehouse::output::{MemorySink, ParquetCompression, ParquetTableWriter, TableSink};
use songplay_warehouse::source::{log_source, song_source};
use songplay_warehouse::{run_batch, verify_output};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(about = "Rebuilds the songplays star schema from song and log data")]
struct CliArgs {
    /// Base directory holding `song_data/` and `log-data/`.
    #[clap(value_parser = parse_path)]
    pub input_data: Option<PathBuf>,

    /// Directory the five tables are written under.
    #[clap(value_parser = parse_path)]
    pub output_data: Option<PathBuf>,

    /// Path to a TOML config file. Values there override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Zone used to turn event timestamps into start times.
    #[clap(long, default_value = "local")]
    pub timezone: TimeZoneMode,

    /// How songplay ids are assigned.
    #[clap(long, default_value = "sequence")]
    pub songplay_ids: SongplayIdStrategy,

    /// Compression codec of the written Parquet files.
    #[clap(long, default_value = "snappy")]
    pub compression: ParquetCompression,

    /// Seconds a played track's length may differ from the catalog duration.
    /// Durations must match exactly when unset.
    #[clap(long)]
    pub duration_tolerance: Option<f64>,

    /// Build every table but keep it in memory instead of writing it.
    #[clap(long)]
    pub dry_run: bool,

    /// Read the written tables back and check their row counts.
    #[clap(long, conflicts_with = "dry_run")]
    pub verify: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            input_data: self.input_data.clone(),
            output_data: self.output_data.clone(),
            timezone: self.timezone,
            songplay_ids: self.songplay_ids,
            compression: self.compression,
            duration_tolerance: self.duration_tolerance,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    if let Some(credentials) = &config.credentials {
        info!("Exporting object store credentials to the environment");
        for (key, value) in credentials.env_vars() {
            std::env::set_var(key, value);
        }
    }

    info!("Input data: {:?}", config.input_data);
    info!("Output data: {:?}", config.output_data);
    info!(
        "Timezone: {:?}, songplay ids: {:?}, compression: {:?}",
        config.timezone, config.songplay_ids, config.compression
    );
    if let Some(tolerance) = config.join.duration_tolerance {
        info!("Matching durations within {} seconds", tolerance);
    }

    let songs = song_source(&config.input_data)?;
    let logs = log_source(&config.input_data)?;

    let sink: Box<dyn TableSink> = if cli_args.dry_run {
        warn!("Dry run: tables are built but not written");
        Box::new(MemorySink::new())
    } else {
        std::fs::create_dir_all(&config.output_data).with_context(|| {
            format!("Failed to create output directory {:?}", config.output_data)
        })?;
        Box::new(ParquetTableWriter::new(
            config.output_data.clone(),
            config.compression,
        ))
    };

    let summary = run_batch(&songs, &logs, sink.as_ref(), &config.event_options())?;
    summary.log();

    if cli_args.verify {
        verify_output(&config.output_data, &summary)?;
    }

    Ok(())
}
