use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Only malformed values fail startup; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Missing key is tolerated at startup; AI endpoints answer 500 until it is set.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub database_url: Option<String>,
    pub secret_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub demo_fallback: bool,
    pub demo_username: String,
    pub demo_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            database_url: optional_env("DATABASE_URL"),
            secret_key: optional_env("SECRET_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            upload_dir: optional_env("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("resume-uploads")),
            static_dir: optional_env("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))),
            demo_fallback: parse_flag("DEMO_FALLBACK", optional_env("DEMO_FALLBACK"), true)?,
            demo_username: optional_env("DEMO_USERNAME").unwrap_or_else(|| "demo".to_string()),
            demo_password: optional_env("DEMO_PASSWORD").unwrap_or_else(|| "demo123".to_string()),
        })
    }
}

/// Reads a variable, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(key: &str, value: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
    }
}
