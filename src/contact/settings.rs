//! Contact service configuration.
//!
//! Layered with confique: environment variables win over an optional TOML
//! file, which wins over the defaults below. The three secrets have no
//! default and must come from somewhere, normally the environment:
//!
//! ```text
//! RESEND_API_KEY         email delivery API key
//! RECAPTCHA_SECRET_KEY   reCAPTCHA secret (the site key is public and build-time)
//! CONTACT_EMAIL          studio mailbox receiving submissions
//! LUMALIMA_BIND          listen address, default 127.0.0.1:3000
//! ```

use confique::Config;
use std::path::Path;

#[derive(Config, Debug, Clone)]
pub struct ServerConfig {
    /// Address the service listens on.
    #[config(env = "LUMALIMA_BIND", default = "127.0.0.1:3000")]
    pub bind: String,

    /// Resend API key.
    #[config(env = "RESEND_API_KEY")]
    pub resend_api_key: String,

    /// reCAPTCHA secret key.
    #[config(env = "RECAPTCHA_SECRET_KEY")]
    pub recaptcha_secret_key: String,

    /// Mailbox that receives submission notifications.
    #[config(env = "CONTACT_EMAIL")]
    pub contact_email: String,

    /// Sender address for both messages.
    #[config(env = "LUMALIMA_SENDER", default = "noreply@lumalima.com")]
    pub sender: String,

    /// Lowest acceptable reCAPTCHA v3 score.
    #[config(default = 0.5)]
    pub score_threshold: f64,

    /// Timeout for each outbound request, in seconds.
    #[config(default = 10)]
    pub timeout_secs: u64,

    #[config(default = "https://www.google.com/recaptcha/api/siteverify")]
    pub verify_url: String,

    #[config(default = "https://api.resend.com/emails")]
    pub resend_url: String,
}

impl ServerConfig {
    /// Load from the environment, over `file` if given, over defaults.
    pub fn load(file: Option<&Path>) -> Result<Self, confique::Error> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder.load()
    }
}
