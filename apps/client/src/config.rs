use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8081";

/// Client configuration loaded from environment variables.
/// Every value has a default; CLI flags override the API base URL and export dir.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub export_dir: PathBuf,
    /// TTF/OTF font embedded by the PDF backend instead of the built-in Helvetica.
    pub pdf_font: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let pdf_font = optional_env("RESUME_PDF_FONT").map(PathBuf::from);
        if let Some(path) = &pdf_font {
            if !path.is_file() {
                anyhow::bail!(
                    "RESUME_PDF_FONT points to '{}', which is not a readable file",
                    path.display()
                );
            }
        }

        Ok(Config {
            api_base_url: optional_env("RESUME_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            export_dir: optional_env("RESUME_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            pdf_font,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn endpoints(&self) -> Result<Endpoints> {
        Endpoints::from_base(&self.api_base_url)
    }
}

/// The analysis service routes, resolved against one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub upload: String,
    pub analyze: String,
    pub sample: String,
    pub test: String,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Result<Self> {
        let base = base.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            anyhow::bail!("API base URL must start with http:// or https://, got '{base}'");
        }
        reqwest::Url::parse(base).with_context(|| format!("Invalid API base URL '{base}'"))?;

        Ok(Endpoints {
            upload: format!("{base}/api/resume/upload"),
            analyze: format!("{base}/api/resume/analyze"),
            sample: format!("{base}/api/resume/sample"),
            test: format!("{base}/api/resume/test"),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
