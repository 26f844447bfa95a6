//! Fragment classification.
//!
//! A classifier is an ordered table of `(role, pattern)` rules. The first rule
//! whose pattern occurs anywhere in the text decides the role; text no rule
//! matches is [`FieldRole::Other`].

use std::sync::LazyLock;

use regex::Regex;

use super::types::FieldRole;

static DEFAULT_CLASSIFIER: LazyLock<FieldClassifier> = LazyLock::new(FieldClassifier::default);

/// Default rule table, tuned for Canadian retail locator pages.
const DEFAULT_RULES: [(FieldRole, &str); 6] = [
    // North-American 3-3-4 phone shape.
    (FieldRole::Phone, r"\d{3}[-.\s]?\d{3}[-.\s]?\d{4}"),
    // Canadian postal code, e.g. V5K 0A1.
    (FieldRole::Postal, r"(?i)[A-Z]\d[A-Z] ?\d[A-Z]\d"),
    (
        FieldRole::Street,
        r"(?i)\d{1,5} .+ (?:Street|St|Ave|Road|Rd|Drive|Dr)",
    ),
    (
        FieldRole::City,
        r"(?i)vancouver|calgary|edmonton|richmond|surrey|regina",
    ),
    // Case-sensitive: "bc" inside prose must not count.
    (FieldRole::Region, r"\bBC\b|\bAB\b|\bMB\b|\bSK\b"),
    (FieldRole::Name, r"(?i)store|location"),
];

/// One row of a classifier's rule table.
#[derive(Debug, Clone)]
pub struct ClassifierRule {
    role: FieldRole,
    pattern: Regex,
}

impl ClassifierRule {
    /// # Errors
    ///
    /// Returns the regex compile error when `pattern` is not a valid regex.
    pub fn new(role: FieldRole, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            role,
            pattern: Regex::new(pattern)?,
        })
    }

    #[must_use]
    pub fn role(&self) -> FieldRole {
        self.role
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered, first-match-wins fragment classifier.
#[derive(Debug, Clone)]
pub struct FieldClassifier {
    rules: Vec<ClassifierRule>,
}

impl FieldClassifier {
    /// Build a classifier from an explicit rule table. Order is precedence.
    #[must_use]
    pub fn new(rules: Vec<ClassifierRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    #[must_use]
    pub fn classify(&self, text: &str) -> FieldRole {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map_or(FieldRole::Other, ClassifierRule::role)
    }
}

impl Default for FieldClassifier {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(role, pattern)| ClassifierRule::new(*role, pattern).expect("valid regex"))
            .collect();
        Self::new(rules)
    }
}

/// Shared instance of the default rule table.
#[must_use]
pub fn default_classifier() -> &'static FieldClassifier {
    &DEFAULT_CLASSIFIER
}

/// Classify `text` with the default rule table.
#[must_use]
pub fn classify(text: &str) -> FieldRole {
    DEFAULT_CLASSIFIER.classify(text)
}
