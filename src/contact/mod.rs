//! Contact form service.
//!
//! A small axum application behind the site's contact form:
//!
//! | Route | |
//! |-------|--|
//! | `POST /api/contact` | validate → verify token → notify studio → confirm to submitter |
//! | `GET /health` | `{"status":"ok"}` |
//!
//! One submission is one sequential chain of outbound calls. There are no
//! retries and nothing is stored. Status mapping:
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | malformed JSON | 500 | `Internal server error` |
//! | missing field | 400 | `Missing required fields` |
//! | verifier unreachable | 400 | `reCAPTCHA service unavailable` |
//! | token rejected / low score | 400 | `reCAPTCHA verification failed: …` |
//! | notification not sent | 500 | `Failed to send email` |
//! | confirmation not sent | 200 | logged only |
//! | accepted | 200 | `{"message":"Email sent successfully","id":…}` |
//!
//! The verifier and mailer sit behind the [`BotVerifier`] and [`Mailer`]
//! traits so the router can be driven in tests without network access.

pub mod error;
pub mod mail;
pub mod settings;
pub mod submission;
pub mod verify;

pub use error::ContactError;
pub use mail::{Email, Letterhead, Mailer, ResendMailer};
pub use settings::ServerConfig;
pub use submission::{ContactRequest, Submission};
pub use verify::{BotVerifier, RecaptchaVerifier, Verdict};

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::SiteIdentity;
use crate::i18n::Catalog;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("config error: {0}")]
    Config(#[from] confique::Error),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared per-request dependencies.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn BotVerifier>,
    pub mailer: Arc<dyn Mailer>,
    pub catalog: &'static Catalog,
    pub letterhead: Arc<Letterhead>,
    pub score_threshold: f64,
}

impl AppState {
    /// Production wiring: reCAPTCHA and Resend over one pooled client.
    pub fn from_config(config: &ServerConfig, site: &SiteIdentity) -> Result<Self, ServeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            verifier: Arc::new(RecaptchaVerifier::new(
                client.clone(),
                &config.verify_url,
                &config.recaptcha_secret_key,
            )),
            mailer: Arc::new(ResendMailer::new(
                client,
                &config.resend_url,
                &config.resend_api_key,
            )),
            catalog: Catalog::builtin(),
            letterhead: Arc::new(Letterhead {
                contact_email: config.contact_email.clone(),
                sender: config.sender.clone(),
                site_name: site.name.clone(),
                tagline: site.tagline.clone(),
                site_url: site.url.clone(),
            }),
            score_threshold: config.score_threshold,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/contact", post(submit))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<Value>, ContactError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(%rejection, "unreadable contact body");
        ContactError::UnreadableBody
    })?;
    let submission = request.validate()?;

    let verdict = state
        .verifier
        .verify(&submission.token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "reCAPTCHA verification error");
            ContactError::VerifierUnavailable(e)
        })?;
    tracing::debug!(score = ?verdict.score, action = ?verdict.action, "reCAPTCHA verdict");
    if let Err(e) = verdict.assess(state.score_threshold) {
        tracing::warn!(error = %e, codes = ?verdict.error_codes, "submission rejected");
        return Err(e);
    }

    let notice = mail::notification(&submission, state.catalog, &state.letterhead);
    let id = state.mailer.send(&notice).await.map_err(|e| {
        tracing::error!(error = %e, "notification email failed");
        ContactError::Delivery(e)
    })?;

    let confirm = mail::confirmation(&submission, state.catalog, &state.letterhead);
    if let Err(e) = state.mailer.send(&confirm).await {
        tracing::warn!(error = %e, "confirmation email failed");
    }

    tracing::info!(
        id = %id,
        language = %submission.language,
        project_type = %submission.project_type,
        "contact submission delivered"
    );
    Ok(Json(json!({ "message": "Email sent successfully", "id": id })))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ServerConfig, site: &SiteIdentity) -> Result<(), ServeError> {
    let state = AppState::from_config(&config, site)?;
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("Contact service listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    tracing::info!("Shutting down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::mail::MailError;
    use crate::contact::verify::VerifyError;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use parking_lot::Mutex;
    use tower::ServiceExt;

    enum Verification {
        Pass(f64),
        Reject(Vec<String>),
        Unreachable,
    }

    struct FakeVerifier(Verification);

    #[async_trait]
    impl BotVerifier for FakeVerifier {
        async fn verify(&self, _token: &str) -> Result<Verdict, VerifyError> {
            match &self.0 {
                Verification::Pass(score) => Ok(Verdict {
                    success: true,
                    score: Some(*score),
                    ..Verdict::default()
                }),
                Verification::Reject(codes) => Ok(Verdict {
                    success: false,
                    error_codes: codes.clone(),
                    ..Verdict::default()
                }),
                Verification::Unreachable => Err(VerifyError::Status(503)),
            }
        }
    }

    /// Records sent mail; fails the `fail_at`-th send (0-based) if set.
    #[derive(Default)]
    struct FakeMailer {
        sent: Mutex<Vec<Email>>,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl Mailer for FakeMailer {
        async fn send(&self, email: &Email) -> Result<String, MailError> {
            let mut sent = self.sent.lock();
            let n = sent.len();
            sent.push(email.clone());
            if self.fail_at == Some(n) {
                return Err(MailError::Rejected {
                    status: 500,
                    message: "down".into(),
                });
            }
            Ok(format!("msg-{n}"))
        }
    }

    fn state(verification: Verification, mailer: Arc<FakeMailer>) -> AppState {
        AppState {
            verifier: Arc::new(FakeVerifier(verification)),
            mailer,
            catalog: Catalog::builtin(),
            letterhead: Arc::new(Letterhead {
                contact_email: "studio@lumalima.com".into(),
                sender: "noreply@lumalima.com".into(),
                site_name: "Lumalima".into(),
                tagline: "Illumination Atelier".into(),
                site_url: "https://lumalima.com".into(),
            }),
            score_threshold: 0.5,
        }
    }

    const VALID: &str = r#"{"name":"Ana","email":"ana@example.com","projectType":"housing","message":"Hi","recaptchaToken":"tok","language":"de"}"#;

    async fn post_contact(state: AppState, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn accepted_submission_sends_two_emails() {
        let mailer = Arc::new(FakeMailer::default());
        let (status, body) = post_contact(state(Verification::Pass(0.9), mailer.clone()), VALID).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Email sent successfully", "id": "msg-0"}));

        let sent = mailer.sent.lock();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["studio@lumalima.com"]);
        assert_eq!(sent[0].subject, "New Contact Form Submission - Wohnen");
        assert_eq!(sent[1].to, vec!["ana@example.com"]);
        assert_eq!(sent[1].subject, "Nachricht Erhalten - Lumalima");
    }

    #[tokio::test]
    async fn unreadable_body_is_a_server_error() {
        let mailer = Arc::new(FakeMailer::default());
        for raw in ["{not json", "null"] {
            let (status, body) =
                post_contact(state(Verification::Pass(0.9), mailer.clone()), raw).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{raw}");
            assert_eq!(body["error"], "Internal server error");
        }
        assert!(mailer.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn missing_field_is_rejected_before_verification() {
        let mailer = Arc::new(FakeMailer::default());
        let (status, body) = post_contact(
            state(Verification::Unreachable, mailer.clone()),
            r#"{"name":"Ana","email":"ana@example.com","message":"","recaptchaToken":"tok"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn unreachable_verifier_is_bad_request() {
        let mailer = Arc::new(FakeMailer::default());
        let (status, body) = post_contact(state(Verification::Unreachable, mailer.clone()), VALID).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "reCAPTCHA service unavailable");
        assert!(mailer.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn rejected_token_reports_codes() {
        let mailer = Arc::new(FakeMailer::default());
        let (status, body) = post_contact(
            state(
                Verification::Reject(vec!["timeout-or-duplicate".into()]),
                mailer.clone(),
            ),
            VALID,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "reCAPTCHA verification failed: timeout-or-duplicate"
        );
    }

    #[tokio::test]
    async fn low_score_is_suspicious() {
        let mailer = Arc::new(FakeMailer::default());
        let (status, body) = post_contact(state(Verification::Pass(0.2), mailer.clone()), VALID).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "reCAPTCHA verification failed: suspicious activity detected"
        );
        assert!(mailer.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn notification_failure_is_server_error() {
        let mailer = Arc::new(FakeMailer {
            fail_at: Some(0),
            ..FakeMailer::default()
        });
        let (status, body) = post_contact(state(Verification::Pass(0.9), mailer.clone()), VALID).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send email");
        // No confirmation once the studio was not told
        assert_eq!(mailer.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn confirmation_failure_still_succeeds() {
        let mailer = Arc::new(FakeMailer {
            fail_at: Some(1),
            ..FakeMailer::default()
        });
        let (status, body) = post_contact(state(Verification::Pass(0.9), mailer.clone()), VALID).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "msg-0");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let mailer = Arc::new(FakeMailer::default());
        let response = router(state(Verification::Pass(1.0), mailer))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }
}
