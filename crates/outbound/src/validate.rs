//! Field-level checks run before a message is encoded.

/// A constraint a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    E164,
    Url,
    /// Length in characters, inclusive bounds. Also used for item counts.
    Length { min: usize, max: usize },
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "cannot be blank"),
            Self::E164 => write!(f, "must be a valid E.164 phone number"),
            Self::Url => write!(f, "must be a valid URL"),
            Self::Length { min, max } => write!(f, "the length must be between {min} and {max}"),
        }
    }
}

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {rule}")]
pub struct ValidationError {
    /// Field path, e.g. `destination` or `items[0].options[1].title`.
    pub field: String,
    pub rule: Rule,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, rule: Rule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }
}

pub(crate) type Check = Result<(), ValidationError>;

/// Only the empty string is missing; whitespace counts as a value.
pub(crate) fn required(field: &str, value: &str) -> Check {
    if value.is_empty() {
        return Err(ValidationError::new(field, Rule::Required));
    }
    Ok(())
}

pub(crate) fn length(field: &str, value: &str, min: usize, max: usize) -> Check {
    required(field, value)?;
    count(field, value.chars().count(), min, max)
}

pub(crate) fn count(field: &str, n: usize, min: usize, max: usize) -> Check {
    if n < min || n > max {
        return Err(ValidationError::new(field, Rule::Length { min, max }));
    }
    Ok(())
}

pub(crate) fn e164(field: &str, value: &str) -> Check {
    required(field, value)?;
    if !is_e164(value) {
        return Err(ValidationError::new(field, Rule::E164));
    }
    Ok(())
}

pub(crate) fn url(field: &str, value: &str) -> Check {
    required(field, value)?;
    if !is_url(value) {
        return Err(ValidationError::new(field, Rule::Url));
    }
    Ok(())
}

/// `+` optional, then 2 to 15 digits not starting with 0.
#[must_use]
pub fn is_e164(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (2..=15).contains(&digits.len())
        && !digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Absolute URL with a host. A bare `host.tld/path` is accepted as http.
#[must_use]
pub fn is_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => parsed.has_host(),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            url::Url::parse(&format!("http://{value}"))
                .ok()
                .and_then(|parsed| parsed.host_str().map(|h| h.contains('.')))
                .unwrap_or(false)
        },
        Err(_) => false,
    }
}
