//! HTTP-layer settings loaded from environment variables.
//!
//! - `API_ADDRESS`  = bind address, default `0.0.0.0:5000`
//! - `CORS_ORIGINS` = comma-separated allowed origins for `/ask-ai`, or `*` (default)

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{core::http::request_id::REQUEST_ID_HEADER, error_handler::AppError};

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:5000";

/// Origins allowed to call `/ask-ai` from a browser.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Parses `*` or a comma-separated origin list.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::Any);
        }
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                HeaderValue::from_str(s).map_err(|_| AppError::InvalidEnv {
                    var: "CORS_ORIGINS",
                    reason: "origins must be valid header values",
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }

    pub fn layer(&self) -> CorsLayer {
        let allow_origin = match self {
            Self::Any => AllowOrigin::any(),
            Self::List(list) => AllowOrigin::list(list.iter().cloned()),
        };
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, REQUEST_ID_HEADER])
            .expose_headers([REQUEST_ID_HEADER])
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub address: String,
    pub cors_origins: CorsOrigins,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let address = std::env::var("API_ADDRESS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.into());
        let cors_origins = CorsOrigins::parse(&std::env::var("CORS_ORIGINS").unwrap_or_default())?;
        Ok(Self {
            address,
            cors_origins,
        })
    }
}
