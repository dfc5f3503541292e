//! Bot verification (reCAPTCHA v3).
//!
//! The contact page obtains a token from the widget and posts it with the
//! form. The service exchanges it for a verdict at `siteverify`:
//!
//! ```text
//! POST {endpoint}   secret=<secret>&response=<token>   (form-encoded)
//! → {"success": true, "score": 0.9, "action": "contact_form", ...}
//! → {"success": false, "error-codes": ["timeout-or-duplicate"]}
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::error::ContactError;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("verification service answered HTTP {0}")]
    Status(u16),
}

/// The verification service's answer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Verdict {
    pub success: bool,
    /// v3 only: 0.0 (bot) to 1.0 (human).
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

impl Verdict {
    /// Accept or reject a verdict.
    ///
    /// A verdict without a score (v2 keys) passes on `success` alone.
    pub fn assess(&self, threshold: f64) -> Result<(), ContactError> {
        if !self.success {
            let codes = if self.error_codes.is_empty() {
                "Unknown error".to_string()
            } else {
                self.error_codes.join(", ")
            };
            return Err(ContactError::Rejected(codes));
        }
        match self.score {
            Some(score) if score < threshold => Err(ContactError::LowScore(score)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
pub trait BotVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Verdict, VerifyError>;
}

pub struct RecaptchaVerifier {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl RecaptchaVerifier {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl BotVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<Verdict, VerifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(VerifyError::Status(response.status().as_u16()));
        }
        Ok(response.json::<Verdict>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passed(score: Option<f64>) -> Verdict {
        Verdict {
            success: true,
            score,
            ..Verdict::default()
        }
    }

    #[test]
    fn good_score_passes() {
        assert!(passed(Some(0.9)).assess(0.5).is_ok());
        assert!(passed(Some(0.5)).assess(0.5).is_ok());
    }

    #[test]
    fn low_score_is_suspicious() {
        assert!(matches!(
            passed(Some(0.3)).assess(0.5),
            Err(ContactError::LowScore(s)) if s == 0.3
        ));
    }

    #[test]
    fn missing_score_passes() {
        assert!(passed(None).assess(0.5).is_ok());
    }

    #[test]
    fn failure_joins_error_codes() {
        let verdict = Verdict {
            success: false,
            error_codes: vec!["invalid-input-response".into(), "timeout-or-duplicate".into()],
            ..Verdict::default()
        };
        let err = verdict.assess(0.5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "reCAPTCHA verification failed: invalid-input-response, timeout-or-duplicate"
        );
    }

    #[test]
    fn failure_without_codes_is_unknown() {
        let err = Verdict::default().assess(0.5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "reCAPTCHA verification failed: Unknown error"
        );
    }

    #[test]
    fn verdict_parses_service_json() {
        let verdict: Verdict = serde_json::from_str(
            r#"{"success":false,"error-codes":["bad-request"],"hostname":"lumalima.com"}"#,
        )
        .unwrap();
        assert!(!verdict.success);
        assert_eq!(verdict.error_codes, vec!["bad-request"]);
        assert_eq!(verdict.score, None);
    }
}
