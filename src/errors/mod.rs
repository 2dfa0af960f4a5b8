use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the upstream news APIs, classified the way the store reports
/// them to the presentation layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Authentication failed: Please check that your API key is correct and that you've subscribed to the {api}")]
    Unauthorized { api: &'static str },

    #[error("Access forbidden: Your API key doesn't have permission to use the {api}")]
    Forbidden { api: &'static str },

    #[error("Rate limit exceeded for {api}. Please try again later.")]
    RateLimited { api: &'static str },

    #[error("No response from NYT servers. Please check your internet connection.")]
    Unreachable { api: &'static str },

    #[error("Invalid response from NYT {api}")]
    MalformedResponse { api: &'static str, reason: String },

    #[error("{api} error: {message}")]
    Unknown { api: &'static str, message: String },
}

impl ApiError {
    /// Classify a non-success HTTP response.
    pub fn from_status(api: &'static str, status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { api },
            StatusCode::FORBIDDEN => ApiError::Forbidden { api },
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { api },
            _ => ApiError::Unknown {
                api,
                message: fault_string(body).unwrap_or_else(|| {
                    format!("Request failed with status code {}", status.as_u16())
                }),
            },
        }
    }

    /// Classify a failure where no usable response came back.
    pub fn from_transport(api: &'static str, err: &reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Unknown {
                api,
                message: err.to_string(),
            }
        } else {
            ApiError::Unreachable { api }
        }
    }

    pub fn malformed(api: &'static str, reason: impl Into<String>) -> Self {
        ApiError::MalformedResponse {
            api,
            reason: reason.into(),
        }
    }

    /// Name of the API that produced the error
    pub fn api(&self) -> &'static str {
        match self {
            ApiError::Unauthorized { api }
            | ApiError::Forbidden { api }
            | ApiError::RateLimited { api }
            | ApiError::Unreachable { api }
            | ApiError::MalformedResponse { api, .. }
            | ApiError::Unknown { api, .. } => api,
        }
    }
}

/// Extract `fault.faultstring` from an API gateway error body.
fn fault_string(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("fault")?
        .get("faultstring")?
        .as_str()
        .map(|s| s.to_string())
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum StarfieldError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Upstream errors
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type StarfieldResult<T> = Result<T, StarfieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = "Newswire API";

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ApiError::from_status(API, StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized { api: API }
        );
        assert_eq!(
            ApiError::from_status(API, StatusCode::FORBIDDEN, ""),
            ApiError::Forbidden { api: API }
        );
        assert_eq!(
            ApiError::from_status(API, StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited { api: API }
        );
    }

    #[test]
    fn test_unknown_uses_fault_string() {
        let body = r#"{"fault":{"faultstring":"Invalid ApiKey for given resource"}}"#;
        let err = ApiError::from_status(API, StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err.to_string(),
            "Newswire API error: Invalid ApiKey for given resource"
        );
    }

    #[test]
    fn test_unknown_without_body() {
        let err = ApiError::from_status(API, StatusCode::INTERNAL_SERVER_ERROR, "<html>");
        assert_eq!(
            err,
            ApiError::Unknown {
                api: API,
                message: "Request failed with status code 500".to_string(),
            }
        );
    }

    #[test]
    fn test_messages_name_the_api() {
        let err = ApiError::RateLimited { api: "Most Popular API" };
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded for Most Popular API. Please try again later."
        );
        assert_eq!(err.api(), "Most Popular API");

        let err = ApiError::malformed("Article Search API", "missing field `response`");
        assert_eq!(err.to_string(), "Invalid response from NYT Article Search API");
    }
}
