use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::Result;
use regex::Regex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server_config: ServerConfig,
    #[serde(default)]
    pub aws_config: AwsConfig,
    #[serde(default)]
    pub image_config: ImageConfig,
    #[serde(default)]
    pub vision_config: VisionConfig,
    #[serde(default)]
    pub translation_config: TranslationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// AWS settings shared by the Rekognition and Translate clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Overrides the region resolved from the environment chain
    #[serde(default)]
    pub region: Option<String>,
}

/// How the body returned by the image URL is turned into image bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    #[default]
    Base64,
    Raw,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub payload_encoding: PayloadEncoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Labels at or below this confidence are dropped
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// English word used to join label names before translation
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_min_confidence() -> f32 {
    80.0
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_delimiter() -> String {
    "and".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            delimiter: default_delimiter(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = substitute_env_vars(&read_text_file(path)?);
        Self::parse(path, &content)
    }

    /// Parse config text, choosing the format by file extension
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".jsonld") || path_lower.ends_with(".json") {
            let config: Config = serde_json::from_str(content)?;
            Ok(config)
        } else {
            let config: Config = serde_yaml::from_str(content)?;
            Ok(config)
        }
    }
}

/// Read a text file as UTF-8, dropping a leading BOM if present
fn read_text_file(path: &str) -> Result<String> {
    let bytes = fs::read(path)?;
    let (cow, _) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
    Ok(cow.into_owned())
}

/// Replace `${VAR_NAME}` with the environment value; unknown variables are left as-is
pub fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static regex");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
