//! Validation outcomes and the shared field-check helpers.

use std::fmt::Display;

use serde::Serialize;

use crate::config::BaseConfig;

/// Severity of a validation error.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    #[default]
    Error,
    Critical,
}

/// A single blocking problem with a configuration field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted field path, e.g. `cloudStorage.buckets[2].name`
    pub field: String,
    pub message: String,
    pub severity: ValidationSeverity,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    pub fn critical(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Critical,
            ..Self::new(field, message)
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A non-blocking observation about a configuration field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationWarning {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Result of validating one service, or all of them.
///
/// `is_valid()` is true exactly when no error has been recorded.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    is_valid: bool,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationOutcome {
    /// An outcome with no errors and no warnings.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Record the error returned by a helper, if any.
    pub fn check(&mut self, error: Option<ValidationError>) {
        if let Some(error) = error {
            self.add_error(error);
        }
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: ValidationOutcome) {
        for error in other.errors {
            self.add_error(error);
        }
        self.warnings.extend(other.warnings);
    }

    /// Prefix every error and warning field with `"<prefix>."`.
    pub fn prefixed(mut self, prefix: &str) -> Self {
        for error in &mut self.errors {
            error.field = format!("{}.{}", prefix, error.field);
        }
        for warning in &mut self.warnings {
            warning.field = format!("{}.{}", prefix, warning.field);
        }
        self
    }

    /// All error messages rendered as `field: message`.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn into_parts(self) -> (Vec<ValidationError>, Vec<ValidationWarning>) {
        (self.errors, self.warnings)
    }
}

/// Error when `value` is empty or only whitespace.
pub fn validate_required(value: &str, field: &str) -> Option<ValidationError> {
    if value.trim().is_empty() {
        Some(ValidationError::new(field, format!("{} is required", field)))
    } else {
        None
    }
}

/// Error when `value` is not one of `allowed`.
pub fn validate_enum(value: &str, allowed: &[&str], field: &str) -> Option<ValidationError> {
    if allowed.contains(&value) {
        None
    } else {
        Some(ValidationError::new(
            field,
            format!(
                "{} must be one of: {} (got '{}')",
                field,
                allowed.join(", "),
                value
            ),
        ))
    }
}

/// Error when `value` falls outside `[min, max]`.
pub fn validate_range<T>(value: T, min: T, max: T, field: &str) -> Option<ValidationError>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        Some(ValidationError::new(
            field,
            format!("{} must be between {} and {} (got {})", field, min, max, value),
        ))
    } else {
        None
    }
}

/// Checks every service runs before its own domain rules.
pub fn validate_base(base: &BaseConfig) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::valid();
    outcome.check(validate_required(&base.project_id, "projectId"));
    outcome.check(validate_required(&base.region, "region"));
    outcome
}
