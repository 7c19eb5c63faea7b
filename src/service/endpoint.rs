//! Request boundary for typo checking
//!
//! Transport-free: requests and responses are JSON values and errors carry
//! the status code a server would answer with.

use super::correction::{CorrectionResponse, CorrectionService};
use crate::config::{ServiceConfig, DEFAULT_TOP_K};
use crate::error::SpellfixError;
use serde_json::Value;
use thiserror::Error;

/// Failures surfaced to callers of the endpoint
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Model unavailable.")]
    Unavailable,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] SpellfixError),
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unavailable => 503,
            ServiceError::BadRequest(_) => 400,
            ServiceError::Internal(_) => 500,
        }
    }

    /// `{"error": "..."}` body
    pub fn to_json(&self) -> Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

/// Health check body
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub model_name: String,
}

impl HealthStatus {
    pub fn status_code(&self) -> u16 {
        if self.model_loaded {
            200
        } else {
            500
        }
    }
}

/// Holds the service once loaded; answers `unavailable` otherwise
pub struct TypoEndpoint {
    service: Option<CorrectionService>,
    model_name: String,
    /// `top_k` for requests that omit it
    default_top_k: usize,
}

impl TypoEndpoint {
    pub fn with_service(service: CorrectionService) -> Self {
        let model_name = service.model_name().to_string();
        TypoEndpoint {
            service: Some(service),
            model_name,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn unavailable(model_name: impl Into<String>) -> Self {
        TypoEndpoint {
            service: None,
            model_name: model_name.into(),
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    /// Load once at start-up; a failed load leaves the endpoint unavailable
    pub fn load(config: &ServiceConfig) -> Self {
        let endpoint = match CorrectionService::load(config) {
            Ok(service) => {
                log::info!("model init: success");
                Self::with_service(service)
            }
            Err(e) => {
                log::error!("model init: FAILED ({})", e);
                Self::unavailable(config.model_name.clone())
            }
        };
        endpoint.with_default_top_k(config.top_k)
    }

    pub fn is_ready(&self) -> bool {
        self.service.is_some()
    }

    pub fn health(&self) -> HealthStatus {
        let loaded = self.is_ready();
        HealthStatus {
            status: if loaded { "healthy" } else { "unhealthy" }.to_string(),
            model_loaded: loaded,
            model_name: self.model_name.clone(),
        }
    }

    /// Handle `{"sentence": str, "top_k": int?}`; a missing sentence is empty
    pub fn check_typos(&self, request: &Value) -> Result<CorrectionResponse, ServiceError> {
        let service = self.service.as_ref().ok_or(ServiceError::Unavailable)?;

        let sentence = match request.get("sentence") {
            None => "",
            Some(Value::String(s)) => s.as_str(),
            Some(_) => {
                return Err(ServiceError::BadRequest(
                    "'sentence' must be a string".to_string(),
                ))
            }
        };
        let top_k = parse_top_k(request.get("top_k"), self.default_top_k)?;

        Ok(service.correct(sentence, top_k)?)
    }
}

/// Integer, float (truncated) or numeric string; negatives clamp later
fn parse_top_k(value: Option<&Value>, default: usize) -> Result<usize, ServiceError> {
    let invalid = || ServiceError::BadRequest("'top_k' must be an integer".to_string());
    let k = match value {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(invalid)?,
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };
    Ok(k.max(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::scripted_service;
    use serde_json::json;

    #[test]
    fn test_unavailable_without_model() {
        let endpoint = TypoEndpoint::unavailable("missing");
        let err = endpoint.check_typos(&json!({"sentence": "teh"})).unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_json(), json!({"error": "Model unavailable."}));

        let health = endpoint.health();
        assert_eq!(health.status, "unhealthy");
        assert!(!health.model_loaded);
        assert_eq!(health.status_code(), 500);
    }

    #[test]
    fn test_health_when_loaded() {
        let endpoint = TypoEndpoint::with_service(scripted_service());
        let health = endpoint.health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.model_name, "stub-tagger");
        assert_eq!(health.status_code(), 200);
    }

    #[test]
    fn test_non_string_sentence_is_bad_request() {
        let endpoint = TypoEndpoint::with_service(scripted_service());
        let err = endpoint.check_typos(&json!({"sentence": 42})).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "'sentence' must be a string");
    }

    #[test]
    fn test_null_sentence_is_bad_request() {
        let endpoint = TypoEndpoint::with_service(scripted_service());
        let err = endpoint.check_typos(&json!({"sentence": null})).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_missing_sentence_is_empty_response() {
        let endpoint = TypoEndpoint::with_service(scripted_service());
        let response = endpoint.check_typos(&json!({})).unwrap();
        assert_eq!(response.corrected_sentence, "");
        assert!(!response.corrections_made);
        assert!(response.token_details.is_empty());
    }

    #[test]
    fn test_default_top_k() {
        let endpoint = TypoEndpoint::with_service(scripted_service());
        let response = endpoint.check_typos(&json!({"sentence": "teh cat"})).unwrap();
        assert_eq!(response.corrected_sentence, "the cat");
        assert_eq!(response.token_details[0].top_probs.len(), DEFAULT_TOP_K);

        let response = endpoint
            .check_typos(&json!({"sentence": "teh", "top_k": "2"}))
            .unwrap();
        assert_eq!(response.token_details[0].top_probs.len(), 2);
    }

    #[test]
    fn test_configured_default_top_k() {
        let endpoint = TypoEndpoint::with_service(scripted_service()).with_default_top_k(2);
        let response = endpoint.check_typos(&json!({"sentence": "teh cat"})).unwrap();
        assert!(response.token_details.iter().all(|d| d.top_probs.len() == 2));

        let response = endpoint
            .check_typos(&json!({"sentence": "teh", "top_k": null}))
            .unwrap();
        assert_eq!(response.token_details[0].top_probs.len(), 2);

        let response = endpoint
            .check_typos(&json!({"sentence": "teh", "top_k": 4}))
            .unwrap();
        assert_eq!(response.token_details[0].top_probs.len(), 4);
    }

    #[test]
    fn test_parse_top_k() {
        assert_eq!(parse_top_k(None, 3).unwrap(), 3);
        assert_eq!(parse_top_k(Some(&json!(null)), 5).unwrap(), 5);
        assert_eq!(parse_top_k(Some(&json!(5)), 3).unwrap(), 5);
        assert_eq!(parse_top_k(Some(&json!(2.9)), 3).unwrap(), 2);
        assert_eq!(parse_top_k(Some(&json!(-4)), 3).unwrap(), 0);
        assert_eq!(parse_top_k(Some(&json!([1])), 3).unwrap_err().status_code(), 400);
        assert!(parse_top_k(Some(&json!("many")), 3).is_err());
    }

    #[test]
    fn test_load_failure_leaves_endpoint_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = TypoEndpoint::load(&ServiceConfig::from_model_dir(dir.path()));
        assert!(!endpoint.is_ready());
        assert_eq!(endpoint.health().model_name, crate::config::DEFAULT_MODEL_NAME);

        let config = ServiceConfig::from_model_dir(dir.path()).with_top_k(1);
        assert_eq!(TypoEndpoint::load(&config).default_top_k, 1);
    }
}
