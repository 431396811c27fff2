// src/orchestrator/error.rs
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Pipeline stages, named upper-case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    Parse,
    Rank,
    Search,
    Draft,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "PARSE",
            Stage::Rank => "RANK",
            Stage::Search => "SEARCH",
            Stage::Draft => "DRAFT",
        };
        f.write_str(name)
    }
}

/// Failure of a collaborating service, passed through without reinterpretation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageError {
    #[error("{service} unreachable at {url}: {message}")]
    UpstreamUnavailable {
        service: String,
        url: String,
        message: String,
    },

    /// Non-2xx answer, or a 2xx body that did not decode. `body` holds the
    /// upstream payload as received (JSON when it parsed, a string otherwise).
    #[error("{service} at {url} answered {status}")]
    UpstreamError {
        service: String,
        url: String,
        status: u16,
        body: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_names_are_uppercase() {
        assert_eq!(serde_json::to_value(Stage::Search).unwrap(), json!("SEARCH"));
        assert_eq!(Stage::Draft.to_string(), "DRAFT");
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let error = StageError::UpstreamError {
            service: "job_search".to_string(),
            url: "http://127.0.0.1:9100/job_search".to_string(),
            status: 503,
            body: json!({"detail": "down"}),
            detail: None,
        };

        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({
                "kind": "upstream_error",
                "service": "job_search",
                "url": "http://127.0.0.1:9100/job_search",
                "status": 503,
                "body": {"detail": "down"}
            })
        );
    }
}
