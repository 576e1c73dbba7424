use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures of a single proxied GitHub round trip.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Owner and repo parameters are required")]
    MissingParameter,

    #[error("Invalid owner or repo parameter")]
    InvalidParameter(String),

    #[error("GitHub API error: {status}")]
    Upstream { status: u16, message: String },

    #[error("Failed to fetch {resource} data")]
    Transport {
        resource: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParameter | GatewayError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            GatewayError::MissingParameter => "Missing owner or repo query parameter".to_string(),
            GatewayError::InvalidParameter(value) => {
                format!("'{}' is not a valid GitHub owner or repository name", value)
            }
            GatewayError::Upstream { message, .. } => message.clone(),
            GatewayError::Transport { source, .. } => source.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.to_string(),
            "message": self.message(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Reasons the text-generation call did not produce a summary.
///
/// None of these reach the user; every variant routes to the fallback paragraph.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("text generation is not configured")]
    Disabled,

    #[error("text generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("text generation API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("text generation API key is not a valid header value")]
    InvalidApiKey,

    #[error("text generation returned no text")]
    EmptyResponse,

    #[error("text generation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("text generation task aborted: {0}")]
    Aborted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(GatewayError::MissingParameter.status(), StatusCode::BAD_REQUEST);

        let upstream = GatewayError::Upstream {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(upstream.status(), StatusCode::NOT_FOUND);
        assert_eq!(upstream.to_string(), "GitHub API error: 404");
        assert_eq!(upstream.message(), "Not Found");

        let invalid = GatewayError::InvalidParameter("..".to_string());
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "Invalid owner or repo parameter");
    }

    #[test]
    fn invalid_upstream_status_maps_to_bad_gateway() {
        let odd = GatewayError::Upstream {
            status: 42,
            message: String::new(),
        };
        assert_eq!(odd.status(), StatusCode::BAD_GATEWAY);
    }
}
