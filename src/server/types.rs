//! Request/response types for the dashboard HTTP API.
//!
//! These types define the wire format for every JSON endpoint. They are
//! deliberately small and mirror what the sidebar frontend expects.

use serde::{Deserialize, Serialize};

/// Title recorded when `POST /open_url` does not provide one.
pub const DEFAULT_WINDOW_TITLE: &str = "External Content";

/// Response from `GET /refresh_sidebar`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshResponse {
    /// Always "success"; the transform itself cannot fail.
    pub status: String,
    /// Freshly rendered sidebar markup.
    pub content: String,
}

impl RefreshResponse {
    pub fn new(content: String) -> Self {
        Self {
            status: "success".to_string(),
            content,
        }
    }
}

/// Body of `POST /open_url`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OpenUrlRequest {
    #[serde(default)]
    pub url: Option<String>,

    /// Display title for the window; defaults to [`DEFAULT_WINDOW_TITLE`].
    #[serde(default)]
    pub title: Option<String>,
}

/// Generic status acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// The window last recorded via `POST /open_url`; both fields null until
/// the first record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowInfo {
    pub url: Option<String>,
    pub title: Option<String>,
}

/// Response from `GET /api/dashboards`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardsResponse {
    pub success: bool,
    pub dashboards: Vec<String>,
    pub error: String,
}

/// Error body for rejected API requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code for programmatic handling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: Some(code.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod refresh_response_tests {
        use super::*;

        #[test]
        fn serializes_status_and_content() {
            let resp = RefreshResponse::new("<div>markup</div>".to_string());
            let json = serde_json::to_string(&resp).unwrap();
            assert!(json.contains("\"status\":\"success\""));
            assert!(json.contains("markup"));
        }
    }

    mod open_url_request_tests {
        use super::*;

        #[test]
        fn deserializes_empty_body() {
            let req: OpenUrlRequest = serde_json::from_str("{}").unwrap();
            assert!(req.url.is_none());
            assert!(req.title.is_none());
        }

        #[test]
        fn deserializes_full_body() {
            let req: OpenUrlRequest =
                serde_json::from_str(r#"{"url":"https://a.com","title":"A"}"#).unwrap();
            assert_eq!(req.url.as_deref(), Some("https://a.com"));
            assert_eq!(req.title.as_deref(), Some("A"));
        }
    }

    mod status_response_tests {
        use super::*;

        #[test]
        fn success_and_error_set_status() {
            assert_eq!(StatusResponse::success("ok").status, "success");
            assert_eq!(StatusResponse::error("nope").status, "error");
        }
    }

    mod window_info_tests {
        use super::*;

        #[test]
        fn default_serializes_to_nulls() {
            let json = serde_json::to_string(&WindowInfo::default()).unwrap();
            assert_eq!(json, r#"{"url":null,"title":null}"#);
        }

        #[test]
        fn round_trips() {
            let info = WindowInfo {
                url: Some("https://a.com".to_string()),
                title: Some("A".to_string()),
            };
            let json = serde_json::to_string(&info).unwrap();
            let back: WindowInfo = serde_json::from_str(&json).unwrap();
            assert_eq!(back, info);
        }
    }

    mod error_response_tests {
        use super::*;

        #[test]
        fn serializes_with_code() {
            let err = ErrorResponse::with_code("bad name", "INVALID_DASHBOARD");
            let json = serde_json::to_string(&err).unwrap();
            assert!(json.contains("\"code\":\"INVALID_DASHBOARD\""));
            assert!(json.contains("\"error\":\"bad name\""));
        }
    }
}
