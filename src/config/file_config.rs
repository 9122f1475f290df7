use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub input_data: Option<String>,
    pub output_data: Option<String>,
    pub timezone: Option<String>,

    // Feature configs
    pub join: Option<JoinConfig>,
    pub songplays: Option<SongplaysConfig>,
    pub parquet: Option<ParquetConfig>,

    #[serde(alias = "AWS CREDS")]
    pub aws_creds: Option<AwsCredsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct JoinConfig {
    /// Absolute difference in seconds tolerated between a played track's
    /// length and the catalog duration. Unset means exact equality.
    pub duration_tolerance: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SongplaysConfig {
    /// "sequence" or "hashed"
    pub id_strategy: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ParquetConfig {
    /// "snappy", "zstd" or "none"
    pub compression: Option<String>,
}

#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct AwsCredsConfig {
    #[serde(alias = "AWS_ACCESS_KEY_ID")]
    pub aws_access_key_id: Option<String>,
    #[serde(alias = "AWS_SECRET_ACCESS_KEY")]
    pub aws_secret_access_key: Option<String>,
}

impl std::fmt::Debug for AwsCredsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredsConfig")
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field(
                "aws_secret_access_key",
                &self.aws_secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        // Editors on Windows like to prepend a BOM.
        Ok(toml::from_str(content.trim_start_matches('\u{feff}'))?)
    }
}
