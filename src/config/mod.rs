mod file_config;

pub use file_config::{AwsCredsConfig, FileConfig, JoinConfig, ParquetConfig, SongplaysConfig};

use crate::events::{EventOptions, JoinPolicy, SongplayIdStrategy, TimeZoneMode};
use crate::output::ParquetCompression;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub input_data: Option<PathBuf>,
    pub output_data: Option<PathBuf>,
    pub timezone: TimeZoneMode,
    pub songplay_ids: SongplayIdStrategy,
    pub compression: ParquetCompression,
    pub duration_tolerance: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub input_data: PathBuf,
    pub output_data: PathBuf,

    // Transform settings
    pub timezone: TimeZoneMode,
    pub join: JoinPolicy,
    pub songplay_ids: SongplayIdStrategy,

    // Output settings
    pub compression: ParquetCompression,

    pub credentials: Option<StorageCredentials>,
}

/// Object store credentials. Handed to the process environment by the binary,
/// never read by the pipelines themselves.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StorageCredentials {
    pub const ACCESS_KEY_ID_VAR: &'static str = "AWS_ACCESS_KEY_ID";
    pub const SECRET_ACCESS_KEY_VAR: &'static str = "AWS_SECRET_ACCESS_KEY";

    /// Environment variable assignments for these credentials.
    pub fn env_vars(&self) -> [(&'static str, &str); 2] {
        [
            (Self::ACCESS_KEY_ID_VAR, self.access_key_id.as_str()),
            (Self::SECRET_ACCESS_KEY_VAR, self.secret_access_key.as_str()),
        ]
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let input_data = file
            .input_data
            .map(PathBuf::from)
            .or_else(|| cli.input_data.clone())
            .ok_or_else(|| {
                anyhow!("input_data must be specified on the command line or in config file")
            })?;

        if !input_data.exists() {
            bail!("Input directory does not exist: {:?}", input_data);
        }
        if !input_data.is_dir() {
            bail!("input_data is not a directory: {:?}", input_data);
        }

        let output_data = file
            .output_data
            .map(PathBuf::from)
            .or_else(|| cli.output_data.clone())
            .ok_or_else(|| {
                anyhow!("output_data must be specified on the command line or in config file")
            })?;

        if output_data.is_file() {
            bail!("output_data is a file, expected a directory: {:?}", output_data);
        }

        let timezone = match file.timezone {
            Some(s) => parse_value_enum("timezone", &s)?,
            None => cli.timezone,
        };

        let join_file = file.join.unwrap_or_default();
        let duration_tolerance = join_file.duration_tolerance.or(cli.duration_tolerance);
        if let Some(tolerance) = duration_tolerance {
            if tolerance.is_nan() || tolerance < 0.0 {
                bail!("duration_tolerance must be a non-negative number of seconds, got {tolerance}");
            }
        }
        let join = JoinPolicy { duration_tolerance };

        let songplay_ids = match file.songplays.and_then(|s| s.id_strategy) {
            Some(s) => parse_value_enum("songplays.id_strategy", &s)?,
            None => cli.songplay_ids,
        };

        let compression = match file.parquet.and_then(|p| p.compression) {
            Some(s) => parse_value_enum("parquet.compression", &s)?,
            None => cli.compression,
        };

        let credentials = match file.aws_creds {
            None => None,
            Some(AwsCredsConfig {
                aws_access_key_id: Some(access_key_id),
                aws_secret_access_key: Some(secret_access_key),
            }) => Some(StorageCredentials {
                access_key_id,
                secret_access_key,
            }),
            Some(AwsCredsConfig {
                aws_access_key_id: None,
                aws_secret_access_key: None,
            }) => None,
            Some(_) => {
                bail!("Both aws_access_key_id and aws_secret_access_key must be provided together")
            }
        };

        Ok(Self {
            input_data,
            output_data,
            timezone,
            join,
            songplay_ids,
            compression,
            credentials,
        })
    }

    pub fn event_options(&self) -> EventOptions {
        EventOptions {
            timezone: self.timezone,
            join: self.join,
            songplay_ids: self.songplay_ids,
        }
    }
}

/// Parses a config string into one of the CLI value enums.
/// Uses clap's ValueEnum trait for parsing, ignoring case.
fn parse_value_enum<T: ValueEnum>(key: &str, s: &str) -> Result<T> {
    T::from_str(s, true).map_err(|_| {
        let allowed: Vec<String> = T::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        anyhow!("Invalid value {:?} for {}, expected one of {:?}", s, key, allowed)
    })
}
