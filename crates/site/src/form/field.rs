use std::sync::LazyLock;

use regex::Regex;

use crate::config::ValidationMessages;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\-\(\)\+\s]+$").expect("phone pattern compiles"));

/// Minimum length accepted by strict telephone validation.
pub const STRICT_PHONE_MIN_LEN: usize = 10;

/// Declared input kind, taken from the control's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tel,
}

impl FieldKind {
    pub fn from_input_type(input_type: &str) -> Self {
        match input_type.trim().to_ascii_lowercase().as_str() {
            "email" => Self::Email,
            "tel" => Self::Tel,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            required: false,
            kind: FieldKind::Text,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn trimmed_value(&self) -> &str {
        self.value.trim()
    }
}

/// Which rule rejected a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    Email,
    Phone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldVerdict {
    pub valid: bool,
    pub rule: Option<FieldRule>,
    pub message: String,
}

impl FieldVerdict {
    fn pass() -> Self {
        Self {
            valid: true,
            rule: None,
            message: String::new(),
        }
    }

    fn fail(rule: FieldRule, message: &str) -> Self {
        Self {
            valid: false,
            rule: Some(rule),
            message: message.to_string(),
        }
    }
}

/// Per-field failures of a whole-form check, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormReport {
    pub failures: Vec<(String, FieldVerdict)>,
}

impl FormReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_names(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldValidator {
    messages: ValidationMessages,
    strict_phone: bool,
}

impl FieldValidator {
    pub fn new(messages: ValidationMessages, strict_phone: bool) -> Self {
        Self {
            messages,
            strict_phone,
        }
    }

    /// Ordered rules, first failure wins: required, email format, phone format.
    pub fn validate(&self, field: &FormField) -> FieldVerdict {
        let value = field.trimmed_value();

        if field.required && value.is_empty() {
            return FieldVerdict::fail(FieldRule::Required, &self.messages.required);
        }
        if value.is_empty() {
            return FieldVerdict::pass();
        }

        match field.kind {
            FieldKind::Email if !is_valid_email(value) => {
                FieldVerdict::fail(FieldRule::Email, &self.messages.invalid_email)
            }
            FieldKind::Tel if !is_valid_phone(value, self.strict_phone) => {
                FieldVerdict::fail(FieldRule::Phone, &self.messages.invalid_phone)
            }
            FieldKind::Text | FieldKind::Email | FieldKind::Tel => FieldVerdict::pass(),
        }
    }

    /// Checks every field; one failure never hides another field's error.
    pub fn validate_form(&self, fields: &[FormField]) -> FormReport {
        let failures = fields
            .iter()
            .map(|field| (field, self.validate(field)))
            .filter(|(_, verdict)| !verdict.valid)
            .map(|(field, verdict)| (field.name.clone(), verdict))
            .collect();

        FormReport { failures }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

pub fn is_valid_phone(value: &str, strict: bool) -> bool {
    if !PHONE_PATTERN.is_match(value) {
        return false;
    }
    !strict || value.chars().count() >= STRICT_PHONE_MIN_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn validator() -> FieldValidator {
        FieldValidator::default()
    }

    #[test]
    fn required_blank_fails_with_required_message() {
        for blank in ["", "   ", "\t\n"] {
            let field = FormField::new("company", blank).required();
            let verdict = validator().validate(&field);
            assert!(!verdict.valid);
            assert_eq!(verdict.rule, Some(FieldRule::Required));
            assert_eq!(verdict.message, "この項目は必須です");
        }
    }

    #[test]
    fn required_check_wins_over_format_check() {
        let field = FormField::new("email", " ").required().with_kind(FieldKind::Email);
        assert_eq!(validator().validate(&field).rule, Some(FieldRule::Required));
    }

    #[test]
    fn email_validity_matches_pattern() {
        for valid in ["a@b.co", "info@example.co.jp", "x.y+z@sub.domain.org"] {
            assert!(is_valid_email(valid), "{valid}");
        }
        for invalid in ["plain", "a@b", "@b.co", "a@.co.", "a b@c.d", "a@b c.d", "a@@b.co"] {
            assert!(!is_valid_email(invalid), "{invalid}");
        }
    }

    #[test]
    fn optional_empty_email_passes_but_malformed_fails() {
        let empty = FormField::new("email", "").with_kind(FieldKind::Email);
        assert!(validator().validate(&empty).valid);

        let bad = FormField::new("email", "foo@bar").with_kind(FieldKind::Email);
        let verdict = validator().validate(&bad);
        assert_eq!(verdict.rule, Some(FieldRule::Email));
        assert_eq!(verdict.message, "メールアドレスの形式が正しくありません");
    }

    #[test]
    fn phone_pattern_is_permissive_and_strict_mode_adds_length() {
        assert!(is_valid_phone("03-1234-5678", false));
        assert!(is_valid_phone("+81 (3) 1234 5678", false));
        assert!(is_valid_phone("123", false));
        assert!(!is_valid_phone("03-1234-abcd", false));
        assert!(!is_valid_phone("123", true));
        assert!(is_valid_phone("0312345678", true));

        let strict = FieldValidator::new(ValidationMessages::default(), true);
        let short = FormField::new("phone", "03-123").with_kind(FieldKind::Tel);
        assert_eq!(strict.validate(&short).rule, Some(FieldRule::Phone));
        assert!(validator().validate(&short).valid);
    }

    #[test]
    fn whole_form_reports_every_failing_field() {
        let fields = vec![
            FormField::new("company", "").required(),
            FormField::new("name", "山田").required(),
            FormField::new("email", "broken").required().with_kind(FieldKind::Email),
            FormField::new("phone", "abc").with_kind(FieldKind::Tel),
            FormField::new("industry", ""),
        ];

        let report = validator().validate_form(&fields);
        assert!(!report.is_valid());
        assert_eq!(
            report.failed_names().collect::<Vec<_>>(),
            vec!["company", "email", "phone"]
        );
    }

    #[test]
    fn input_type_maps_to_kind() {
        assert_eq!(FieldKind::from_input_type("EMAIL"), FieldKind::Email);
        assert_eq!(FieldKind::from_input_type("tel"), FieldKind::Tel);
        assert_eq!(FieldKind::from_input_type("textarea"), FieldKind::Text);
    }
}
