use axum::{
    extract::{Request, State},
    http::{header::ORIGIN, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::{ApiError, AppState};

/// Front-end origins allowed to post submissions. Empty allows everyone.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    origins: Vec<HeaderValue>,
}

impl AllowedOrigins {
    pub fn new(origins: &[String]) -> anyhow::Result<AllowedOrigins> {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(HeaderValue::from_str)
            .collect::<Result<_, _>>()?;
        Ok(AllowedOrigins { origins })
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn values(&self) -> &[HeaderValue] {
        &self.origins
    }

    /// Exact match; requests without an `Origin` header are not browsers and pass.
    pub fn allows(&self, origin: Option<&HeaderValue>) -> bool {
        match origin {
            Some(origin) => self.origins.is_empty() || self.origins.contains(origin),
            None => true,
        }
    }
}

pub async fn require_allowed_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let origin = request.headers().get(ORIGIN);
    if !state.origins.allows(origin) {
        warn!("Rejected request from origin {origin:?}");
        return Err(ApiError::Forbidden("Origin not allowed".to_string()));
    }

    Ok(next.run(request).await)
}
