//! The contact form payload.

use serde::Deserialize;

use super::error::ContactError;
use crate::i18n::Locale;

/// Raw JSON body as posted by the contact page (camelCase keys).
///
/// Every field is optional at this level so a missing field and an empty
/// one are reported the same way.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub project_type: Option<String>,
    pub message: Option<String>,
    pub recaptcha_token: Option<String>,
    pub language: Option<String>,
}

/// A submission with all required fields present. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    /// Category slug (`housing`, `comercial`, …) or empty.
    pub project_type: String,
    pub message: String,
    pub token: String,
    /// Language code as sent, `en` when absent.
    pub language: String,
}

impl ContactRequest {
    pub fn validate(self) -> Result<Submission, ContactError> {
        fn required(field: Option<String>) -> Result<String, ContactError> {
            field
                .filter(|value| !value.is_empty())
                .ok_or(ContactError::MissingFields)
        }

        Ok(Submission {
            name: required(self.name)?,
            email: required(self.email)?,
            message: required(self.message)?,
            token: required(self.recaptcha_token)?,
            project_type: self.project_type.unwrap_or_default(),
            language: self
                .language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| Locale::En.as_str().to_string()),
        })
    }
}

impl Submission {
    /// Locale for the confirmation email. Unknown codes fall back to English.
    pub fn locale(&self) -> Locale {
        Locale::parse(&self.language).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ContactRequest {
        ContactRequest {
            name: Some("Ana".into()),
            email: Some("ana@example.com".into()),
            project_type: Some("urban".into()),
            message: Some("Hello".into()),
            recaptcha_token: Some("tok".into()),
            language: Some("pt".into()),
        }
    }

    #[test]
    fn complete_request_validates() {
        let submission = complete().validate().unwrap();
        assert_eq!(submission.name, "Ana");
        assert_eq!(submission.token, "tok");
        assert_eq!(submission.locale(), Locale::Pt);
    }

    #[test]
    fn each_required_field_is_checked() {
        let cases: [fn(&mut ContactRequest); 4] = [
            |r| r.name = None,
            |r| r.email = Some(String::new()),
            |r| r.message = None,
            |r| r.recaptcha_token = Some(String::new()),
        ];
        for clear in cases {
            let mut request = complete();
            clear(&mut request);
            assert!(matches!(
                request.validate(),
                Err(ContactError::MissingFields)
            ));
        }
    }

    #[test]
    fn optional_fields_default() {
        let mut request = complete();
        request.project_type = None;
        request.language = None;
        let submission = request.validate().unwrap();
        assert_eq!(submission.project_type, "");
        assert_eq!(submission.language, "en");
    }

    #[test]
    fn unknown_language_localizes_as_english() {
        let mut request = complete();
        request.language = Some("fr".into());
        let submission = request.validate().unwrap();
        assert_eq!(submission.language, "fr");
        assert_eq!(submission.locale(), Locale::En);
    }

    #[test]
    fn deserializes_camel_case() {
        let request: ContactRequest = serde_json::from_str(
            r#"{"name":"Ana","email":"a@b.c","projectType":"housing","message":"Hi","recaptchaToken":"t"}"#,
        )
        .unwrap();
        assert_eq!(request.project_type.as_deref(), Some("housing"));
        assert_eq!(request.recaptcha_token.as_deref(), Some("t"));
    }
}
