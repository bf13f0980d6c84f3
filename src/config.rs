//! Gateway configuration.
//!
//! Everything is read from the environment (after `.env` has been loaded).
//! Only `PORT` is part of the public contract; the rest have defaults that
//! match the behaviour of a bare deployment.

use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue, Method};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024 * 1024; // 100MB
const DEFAULT_ALLOWED_HEADERS: &[&str] = &["X-Requested-With", "Content-Type"];

/// Top-level configuration for the gateway process.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    pub max_body_bytes: usize,
    /// Directory for scratch files. `None` means the OS temp dir.
    pub scratch_dir: Option<PathBuf>,
    pub textract_bin: String,
    pub tesseract_bin: String,
    /// Per-invocation limit for the external tools. `None` waits forever.
    pub extraction_timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors: CorsConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            scratch_dir: None,
            textract_bin: "textract".to_string(),
            tesseract_bin: "tesseract".to_string(),
            extraction_timeout: None,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => defaults.port,
        };

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_BODY_BYTES must be a byte count, got {:?}", raw))?,
            None => defaults.max_body_bytes,
        };

        let extraction_timeout = match get("EXTRACTION_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().with_context(|| {
                    format!("EXTRACTION_TIMEOUT_SECS must be whole seconds, got {:?}", raw)
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let cors = CorsConfig {
            allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors.allowed_origins),
            allowed_headers: get("CORS_ALLOWED_HEADERS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors.allowed_headers),
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            cors,
            max_body_bytes,
            scratch_dir: get("SCRATCH_DIR").map(PathBuf::from),
            textract_bin: get("TEXTRACT_BIN").unwrap_or(defaults.textract_bin),
            tesseract_bin: get("TESSERACT_BIN").unwrap_or(defaults.tesseract_bin),
            extraction_timeout,
        })
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .with_context(|| format!("HOST must be an IP address, got {:?}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Cross-origin policy applied to every route.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; a single `*` allows any origin.
    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_headers: DEFAULT_ALLOWED_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl CorsConfig {
    /// Build the tower-http layer for this policy.
    pub fn layer(&self) -> Result<CorsLayer> {
        let origin = if self.allowed_origins.iter().any(|o| o == "*") {
            AllowOrigin::any()
        } else {
            let origins = self
                .allowed_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {}", o))
                })
                .collect::<Result<Vec<_>>>()?;
            AllowOrigin::list(origins)
        };

        let headers = self
            .allowed_headers
            .iter()
            .map(|h| {
                HeaderName::from_bytes(h.as_bytes())
                    .with_context(|| format!("Invalid CORS header: {}", h))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_headers(headers)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS]))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
