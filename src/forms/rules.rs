//! Field rules and the per-field validation decision, independent of the page.

use regex::Regex;

pub const REQUIRED_MESSAGE: &str = "Dieses Feld ist erforderlich";
pub const PRIVACY_MESSAGE: &str = "Sie müssen die Datenschutzerklärung akzeptieren";

const NAME_PATTERN: &str = r"^[a-zA-ZÀ-ÿ\s'-]{2,50}$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^[0-9\s+()-]{10,20}$";
const MESSAGE_MIN_LENGTH: usize = 10;

#[derive(Debug, Clone)]
pub enum Check {
    Pattern(Regex),
    /// Minimum number of characters in the trimmed value.
    MinLength(usize),
}

#[derive(Debug, Clone)]
pub struct ValidatorRule {
    pub check: Check,
    pub message: &'static str,
}

impl ValidatorRule {
    fn accepts(&self, value: &str) -> bool {
        match &self.check {
            Check::Pattern(re) => re.is_match(value),
            Check::MinLength(min) => value.chars().count() >= *min,
        }
    }
}

/// What the validator needs to know about a form control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldInput {
    pub name: Option<String>,
    pub id: Option<String>,
    pub value: String,
    pub required: bool,
}

impl FieldInput {
    /// `name` wins over `id` when both are set.
    pub fn identity(&self) -> Option<&str> {
        [self.name.as_deref(), self.id.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidation {
    Valid,
    Invalid(&'static str),
}

impl FieldValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldValidation::Valid)
    }
}

/// The fixed rule set, keyed by field identity.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<(&'static str, ValidatorRule)>,
}

impl RuleTable {
    pub fn new() -> Self {
        // constant patterns
        let pattern = |p: &str| Check::Pattern(Regex::new(p).expect("built-in pattern"));
        let rules = vec![
            (
                "firstName",
                ValidatorRule {
                    check: pattern(NAME_PATTERN),
                    message: "Bitte geben Sie einen gültigen Vornamen ein (2-50 Zeichen, nur Buchstaben)",
                },
            ),
            (
                "lastName",
                ValidatorRule {
                    check: pattern(NAME_PATTERN),
                    message: "Bitte geben Sie einen gültigen Nachnamen ein (2-50 Zeichen, nur Buchstaben)",
                },
            ),
            (
                "email",
                ValidatorRule {
                    check: pattern(EMAIL_PATTERN),
                    message: "Bitte geben Sie eine gültige E-Mail-Adresse ein",
                },
            ),
            (
                "phone",
                ValidatorRule {
                    check: pattern(PHONE_PATTERN),
                    message: "Bitte geben Sie eine gültige Telefonnummer ein (10-20 Zeichen)",
                },
            ),
            (
                "message",
                ValidatorRule {
                    check: Check::MinLength(MESSAGE_MIN_LENGTH),
                    message: "Die Nachricht muss mindestens 10 Zeichen lang sein",
                },
            ),
        ];
        Self { rules }
    }

    pub fn get(&self, identity: &str) -> Option<&ValidatorRule> {
        self.rules
            .iter()
            .find(|(key, _)| *key == identity)
            .map(|(_, rule)| rule)
    }

    pub fn validate(&self, field: &FieldInput) -> FieldValidation {
        let value = field.value.trim();
        if field.required && value.is_empty() {
            return FieldValidation::Invalid(REQUIRED_MESSAGE);
        }
        if value.is_empty() {
            return FieldValidation::Valid;
        }
        match field.identity().and_then(|id| self.get(id)) {
            Some(rule) if !rule.accepts(value) => FieldValidation::Invalid(rule.message),
            _ => FieldValidation::Valid,
        }
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}
