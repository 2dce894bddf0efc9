//! Declarative form validation.
//!
//! A [`RuleSet`] is an ordered list of [`FieldRule`] chains. Each chain
//! names one form field, sanitises its value (trim, HTML-escape), decides
//! whether the field may be left out, and runs an ordered list of checks,
//! each paired with the message shown when it fails.
//!
//! Every check of every chain runs. A value that is both too long and not
//! alphabetic yields two errors, and a bad first name does not hide a bad
//! email. The caller gets either the sanitised values or the complete list
//! of failures plus what was originally submitted, ready to re-render.
//!
//! ```rust
//! use rollcall::FormData;
//! use rollcall::validation::user_rules;
//!
//! let form: FormData = [("firstName", "Jo3"), ("lastName", "Lin"),
//!     ("email", "jo@example.com"), ("age", "30")].into_iter().collect();
//! let failure = user_rules().validate(&form).unwrap_err();
//! assert_eq!(failure.errors[0].message, "First name Must contain only letters");
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;

use crate::form::FormData;
use crate::store::{SearchQuery, UserFields};

const ALPHA_ERR: &str = "Must contain only letters";
const LENGTH_ERR: &str = "Must be between 1 and 10 characters";
const EMAIL_ERR: &str = "Enter a valid email address";
// The rule below is numeric-only; the 18-120 range in the message is not enforced.
const AGE_ERR: &str = "You must be between 18-120";
const SEARCH_NAME_ERR: &str = "A name only contains letters";
const SEARCH_MAIL_ERR: &str = "Must enter a valid email";

pub const NAME_MIN: usize = 1;
pub const NAME_MAX: usize = 10;

// ── Rule vocabulary ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Sanitizer {
    Trim,
    Escape,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Check {
    Alpha,
    /// Letters, with single words separated by spaces.
    AlphaWords,
    Length { min: usize, max: usize },
    Email,
    Numeric,
}

impl Check {
    fn passes(self, value: &str) -> bool {
        match self {
            Self::Alpha => is_alpha(value),
            Self::AlphaWords => value.split(' ').filter(|w| !w.is_empty()).all(is_alpha)
                && value.chars().any(|c| c.is_ascii_alphabetic()),
            Self::Length { min, max } => (min..=max).contains(&value.chars().count()),
            Self::Email => is_email(value),
            Self::Numeric => is_numeric(value),
        }
    }
}

/// One field's validation chain.
#[derive(Clone, Debug)]
pub struct FieldRule {
    field: &'static str,
    sanitizers: Vec<Sanitizer>,
    optional: bool,
    checks: Vec<(Check, String)>,
}

impl FieldRule {
    pub fn new(field: &'static str) -> Self {
        Self { field, sanitizers: Vec::new(), optional: false, checks: Vec::new() }
    }

    pub fn trim(mut self) -> Self {
        self.sanitizers.push(Sanitizer::Trim);
        self
    }

    pub fn escape(mut self) -> Self {
        self.sanitizers.push(Sanitizer::Escape);
        self
    }

    /// A missing value, or one that is empty once sanitised, skips every
    /// check and is reported as absent.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn alpha(self, message: impl Into<String>) -> Self {
        self.check(Check::Alpha, message)
    }

    pub fn alpha_words(self, message: impl Into<String>) -> Self {
        self.check(Check::AlphaWords, message)
    }

    pub fn length(self, min: usize, max: usize, message: impl Into<String>) -> Self {
        self.check(Check::Length { min, max }, message)
    }

    pub fn email(self, message: impl Into<String>) -> Self {
        self.check(Check::Email, message)
    }

    pub fn numeric(self, message: impl Into<String>) -> Self {
        self.check(Check::Numeric, message)
    }

    fn check(mut self, check: Check, message: impl Into<String>) -> Self {
        self.checks.push((check, message.into()));
        self
    }

    fn sanitize(&self, raw: &str) -> String {
        self.sanitizers.iter().fold(raw.to_owned(), |value, s| match s {
            Sanitizer::Trim => value.trim().to_owned(),
            Sanitizer::Escape => escape_html(&value),
        })
    }

    /// Runs the chain, pushing one error per failed check.
    fn apply(&self, raw: Option<&str>, errors: &mut Vec<FieldError>) -> Option<String> {
        let value = self.sanitize(raw.unwrap_or_default());
        if self.optional && value.is_empty() {
            return None;
        }
        for (check, message) in &self.checks {
            if !check.passes(&value) {
                errors.push(FieldError { field: self.field, message: message.clone() });
            }
        }
        Some(value)
    }
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// A single failed check.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every failure of one form submission, with the raw input for re-display.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{} validation error(s)", .errors.len())]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
    pub submitted: FormData,
}

/// Sanitised values of a form that passed. Optional fields left empty are absent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Validated {
    values: HashMap<&'static str, String>,
}

impl Validated {
    fn take(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }

    /// The create/update field set. Fields the rule set did not cover read
    /// as empty.
    pub fn into_user_fields(mut self) -> UserFields {
        UserFields {
            first_name: self.take("firstName").unwrap_or_default(),
            last_name: self.take("lastName").unwrap_or_default(),
            email: self.take("email").unwrap_or_default(),
            age: self.take("age").unwrap_or_default(),
            bio: self.take("bio"),
        }
    }

    pub fn into_search_query(mut self) -> SearchQuery {
        SearchQuery {
            username: self.take("username"),
            mail: self.take("mail"),
        }
    }
}

// ── RuleSet ───────────────────────────────────────────────────────────────────

/// An ordered collection of field chains applied to one form.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn validate(&self, form: &FormData) -> Result<Validated, ValidationFailure> {
        let mut errors = Vec::new();
        let mut values = HashMap::new();
        for rule in &self.rules {
            if let Some(value) = rule.apply(form.get(rule.field), &mut errors) {
                values.insert(rule.field, value);
            }
        }
        if errors.is_empty() {
            Ok(Validated { values })
        } else {
            Err(ValidationFailure { errors, submitted: form.clone() })
        }
    }
}

/// Rules for the create and update forms.
pub fn user_rules() -> &'static RuleSet {
    static RULES: OnceLock<RuleSet> = OnceLock::new();
    RULES.get_or_init(|| {
        let name = |field, label: &str| {
            FieldRule::new(field)
                .trim()
                .alpha(format!("{label} {ALPHA_ERR}"))
                .length(NAME_MIN, NAME_MAX, format!("{label} {LENGTH_ERR}"))
        };
        RuleSet::new()
            .field(name("firstName", "First name"))
            .field(name("lastName", "Last name"))
            .field(FieldRule::new("email").trim().email(EMAIL_ERR))
            .field(FieldRule::new("age").trim().numeric(AGE_ERR))
            .field(FieldRule::new("bio").trim().escape().optional())
    })
}

/// Rules for the search query. Both fields are optional.
pub fn search_rules() -> &'static RuleSet {
    static RULES: OnceLock<RuleSet> = OnceLock::new();
    RULES.get_or_init(|| {
        RuleSet::new()
            .field(FieldRule::new("username").trim().optional().alpha_words(SEARCH_NAME_ERR))
            .field(FieldRule::new("mail").trim().optional().email(SEARCH_MAIL_ERR))
    })
}

// ── Checks and sanitisers ─────────────────────────────────────────────────────

fn is_alpha(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}

/// Optional sign, digits, at most one decimal point with digits after it.
fn is_numeric(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match unsigned.split_once('.') {
        Some((int, frac)) => all_digits(int) && !frac.is_empty() && all_digits(frac),
        None => !unsigned.is_empty() && all_digits(unsigned),
    }
}

const LOCAL_MAX: usize = 64;
const DOMAIN_MAX: usize = 253;
const LABEL_MAX: usize = 63;

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    is_email_local(local) && is_email_domain(domain)
}

fn is_email_local(local: &str) -> bool {
    const ATEXT_SYMBOLS: &str = "!#$%&'*+-/=?^_`{|}~";
    !local.is_empty()
        && local.len() <= LOCAL_MAX
        && local.split('.').all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_alphanumeric() || ATEXT_SYMBOLS.contains(c))
        })
}

fn is_email_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > DOMAIN_MAX {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    let Some(tld) = labels.last() else {
        return false;
    };
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= LABEL_MAX
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Replaces the characters that are unsafe inside HTML text or attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            other => out.push(other),
        }
    }
    out
}
