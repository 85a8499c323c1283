//! Login page parsing
//!
//! The portal gives no authoritative signal for a successful login. The
//! outcome is inferred from the landing URL and, failing that, from phrases
//! seen on the returned page. Keep every heuristic in this file so it can be
//! retuned when the portal markup changes.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::error::{PortalError, Result};

use super::selector;

/// Name of the hidden anti-forgery input on the login form
pub const CSRF_FIELD: &str = "__RequestVerificationToken";

/// Path of the authenticated landing page
pub const MENU_PATH: &str = "/Home/Menu";

const SUCCESS_INDICATORS: [&str; 7] = [
    "main menu",
    "profile",
    "logout",
    "welcome",
    "continuous assessment",
    "ca marks",
    "breadcrumb",
];

const FAILURE_INDICATORS: [&str; 11] = [
    "student login",
    "rollno",
    "password",
    "forgot password",
    "invalid",
    "incorrect",
    "error",
    "login failed",
    "terms & conditions",
    "staff",
    "parent",
];

/// Verdict of the login heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginOutcome {
    Success,
    Failure,
    /// Indicators tied; callers treat this as a failure
    Ambiguous,
}

/// Extract the anti-forgery token from the login page.
///
/// # Errors
/// `PortalError::TokenNotFound` if the hidden input is missing or empty.
///
/// # Examples
/// ```
/// use studzone_core::parser::extract_csrf_token;
///
/// let html = r#"<form><input name="__RequestVerificationToken" type="hidden" value="abc123"></form>"#;
/// assert_eq!(extract_csrf_token(html).unwrap(), "abc123");
/// assert!(extract_csrf_token("<form></form>").is_err());
/// ```
pub fn extract_csrf_token(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let token_selector = selector(&format!("input[name=\"{}\"]", CSRF_FIELD))?;

    document
        .select(&token_selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(PortalError::TokenNotFound)
}

/// True if `html` is the login form, i.e. the session is gone.
pub fn is_login_page(html: &str) -> bool {
    let document = Html::parse_document(html);
    selector("input[name=\"rollno\"]")
        .map(|roll_field| document.select(&roll_field).next().is_some())
        .unwrap_or(false)
}

/// Count (success, failure) indicators in a page body, case-insensitively.
pub(crate) fn indicator_counts(body: &str) -> (usize, usize) {
    let body = body.to_lowercase();
    let success = SUCCESS_INDICATORS
        .iter()
        .filter(|phrase| body.contains(*phrase))
        .count();
    let failure = FAILURE_INDICATORS
        .iter()
        .filter(|phrase| body.contains(*phrase))
        .count();
    (success, failure)
}

/// Decide whether a login POST succeeded.
///
/// Landing on the menu path is success regardless of the body. Otherwise the
/// side with more indicator phrases wins; a tie is `Ambiguous`.
///
/// # Examples
/// ```
/// use studzone_core::parser::{classify_login_outcome, LoginOutcome};
///
/// let outcome = classify_login_outcome("https://portal/studzone/Home/Menu", "");
/// assert_eq!(outcome, LoginOutcome::Success);
/// ```
pub fn classify_login_outcome(url: &str, body: &str) -> LoginOutcome {
    if url.contains(MENU_PATH) {
        return LoginOutcome::Success;
    }

    let (success, failure) = indicator_counts(body);
    if success > failure {
        LoginOutcome::Success
    } else if failure > success {
        LoginOutcome::Failure
    } else {
        LoginOutcome::Ambiguous
    }
}
