//! Task record schema: field constraints and the validation pass.
//!
//! Validation runs in two passes:
//! 1. Presence: every missing required field is collected, in field order.
//!    If any are missing, that list is the result.
//! 2. Content: types, emptiness, lengths, date format, priority rule,
//!    location allow-list and (in strict mode) unexpected keys. Either all
//!    failures or only the first are reported, per `report_all_errors`.

use chrono::NaiveDate;
use serde::Serialize;

use super::draft::{
    Field, PriorityInput, TaskDraft, DESCRIPTION, DUE_DATE, LOCATION, PRIORITY, TITLE, USER_NAME,
};
use super::task::{NewTask, Priority};

/// The only accepted textual date form.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    Missing,
    Empty,
    TooLong,
    InvalidType,
    InvalidFormat,
    OutOfRange,
    InvalidChoice,
    UnexpectedField,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, field: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(
            ValidationErrorKind::Missing,
            field,
            format!("{} is required", field),
        )
    }

    fn empty(field: &str) -> Self {
        Self::new(
            ValidationErrorKind::Empty,
            field,
            format!("{} must not be empty", field),
        )
    }

    fn invalid_type(field: &str, expected: &str) -> Self {
        let article = if expected.starts_with(|c: char| "aeiou".contains(c)) {
            "an"
        } else {
            "a"
        };
        Self::new(
            ValidationErrorKind::InvalidType,
            field,
            format!("{} must be {} {}", field, article, expected),
        )
    }
}

/// Non-empty, ordered list of validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// # Precondition
    /// `errors` is non-empty.
    fn from_vec(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn single(error: ValidationError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    /// Names of the offending fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// How `priority` values are constrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityRule {
    /// Integer in `min..=max`.
    Range { min: i64, max: i64 },
    /// One of a fixed set of labels, matched case-insensitively.
    Labels(Vec<String>),
}

impl Default for PriorityRule {
    fn default() -> Self {
        Self::Range { min: 1, max: 5 }
    }
}

/// Field constraints for task creation.
#[derive(Debug, Clone)]
pub struct TaskSchema {
    pub title_max_len: usize,
    pub description_max_len: usize,
    pub description_required: bool,
    pub priority_required: bool,
    pub priority_rule: PriorityRule,
    pub user_name_max_len: usize,
    /// Empty means any location is accepted.
    pub allowed_locations: Vec<String>,
    /// Reject keys outside the schema.
    pub strict_fields: bool,
    /// Report every content failure instead of only the first.
    pub report_all_errors: bool,
}

impl Default for TaskSchema {
    fn default() -> Self {
        Self {
            title_max_len: 100,
            description_max_len: 1000,
            description_required: true,
            priority_required: true,
            priority_rule: PriorityRule::default(),
            user_name_max_len: 50,
            allowed_locations: Vec::new(),
            strict_fields: false,
            report_all_errors: true,
        }
    }
}

impl TaskSchema {
    /// Validate a draft, producing a task ready for the store.
    pub fn validate(&self, draft: &TaskDraft) -> Result<NewTask, ValidationErrors> {
        let missing = self.missing_fields(draft);
        if !missing.is_empty() {
            return Err(ValidationErrors::from_vec(missing));
        }

        let title = required_text(TITLE, &draft.title, self.title_max_len);
        let description = optional_text(DESCRIPTION, &draft.description, self.description_max_len);
        let priority = self.check_priority(&draft.priority);
        let due_date = check_due_date(&draft.due_date);
        let user_name = required_text(USER_NAME, &draft.user_name, self.user_name_max_len);
        let location = self.check_location(&draft.location);
        let unexpected = self.unexpected_fields(draft);

        match (title, description, priority, due_date, user_name, location) {
            (Ok(title), Ok(description), Ok(priority), Ok(due_date), Ok(user_name), Ok(location))
                if unexpected.is_empty() =>
            {
                Ok(NewTask {
                    title,
                    description,
                    priority,
                    due_date,
                    user_name,
                    location,
                })
            }
            (title, description, priority, due_date, user_name, location) => {
                let mut errors: Vec<ValidationError> = [
                    title.err(),
                    description.err(),
                    priority.err(),
                    due_date.err(),
                    user_name.err(),
                    location.err(),
                ]
                .into_iter()
                .flatten()
                .chain(unexpected)
                .collect();
                if !self.report_all_errors {
                    errors.truncate(1);
                }
                Err(ValidationErrors::from_vec(errors))
            }
        }
    }

    fn missing_fields(&self, draft: &TaskDraft) -> Vec<ValidationError> {
        let required = [
            (TITLE, draft.title.is_missing(), true),
            (DESCRIPTION, draft.description.is_missing(), self.description_required),
            (PRIORITY, draft.priority.is_missing(), self.priority_required),
            (DUE_DATE, draft.due_date.is_missing(), true),
            (USER_NAME, draft.user_name.is_missing(), true),
        ];
        required
            .into_iter()
            .filter(|(_, missing, required)| *missing && *required)
            .map(|(field, _, _)| ValidationError::missing(field))
            .collect()
    }

    fn unexpected_fields(&self, draft: &TaskDraft) -> Vec<ValidationError> {
        if !self.strict_fields {
            return Vec::new();
        }
        draft
            .unexpected
            .iter()
            .map(|key| {
                ValidationError::new(
                    ValidationErrorKind::UnexpectedField,
                    key,
                    format!("unexpected field: {}", key),
                )
            })
            .collect()
    }

    fn check_priority(
        &self,
        field: &Field<PriorityInput>,
    ) -> Result<Option<Priority>, ValidationError> {
        let input = match field {
            Field::Missing => return Ok(None),
            Field::Invalid { expected } => {
                return Err(ValidationError::invalid_type(PRIORITY, expected))
            }
            Field::Present(input) => input,
        };

        match &self.priority_rule {
            PriorityRule::Range { min, max } => {
                let level = match input {
                    PriorityInput::Number(n) => *n,
                    PriorityInput::Text(s) => s
                        .parse::<i64>()
                        .map_err(|_| ValidationError::invalid_type(PRIORITY, "integer"))?,
                };
                if level < *min || level > *max {
                    return Err(ValidationError::new(
                        ValidationErrorKind::OutOfRange,
                        PRIORITY,
                        format!("priority must be between {} and {}", min, max),
                    ));
                }
                Ok(Some(Priority::Level(level)))
            }
            PriorityRule::Labels(labels) => {
                let matched = match input {
                    PriorityInput::Text(s) => match_choice(labels, s),
                    PriorityInput::Number(_) => None,
                };
                match matched {
                    Some(label) => Ok(Some(Priority::Label(label.to_string()))),
                    None => Err(ValidationError::new(
                        ValidationErrorKind::InvalidChoice,
                        PRIORITY,
                        format!("priority must be one of: {}", labels.join(", ")),
                    )),
                }
            }
        }
    }

    fn check_location(&self, field: &Field<String>) -> Result<Option<String>, ValidationError> {
        match field {
            Field::Missing => Ok(None),
            Field::Invalid { expected } => Err(ValidationError::invalid_type(LOCATION, expected)),
            Field::Present(value) if self.allowed_locations.is_empty() => Ok(Some(value.clone())),
            Field::Present(value) => match match_choice(&self.allowed_locations, value) {
                Some(location) => Ok(Some(location.to_string())),
                None => Err(ValidationError::new(
                    ValidationErrorKind::InvalidChoice,
                    LOCATION,
                    format!(
                        "location must be one of: {}",
                        self.allowed_locations.join(", ")
                    ),
                )),
            },
        }
    }
}

/// Case-insensitive lookup returning the canonical spelling.
fn match_choice<'a>(choices: &'a [String], value: &str) -> Option<&'a str> {
    let wanted = value.to_lowercase();
    choices
        .iter()
        .find(|choice| choice.to_lowercase() == wanted)
        .map(String::as_str)
}

fn check_text_content(field: &str, value: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty(field));
    }
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            ValidationErrorKind::TooLong,
            field,
            format!("{} must be at most {} characters", field, max_len),
        ));
    }
    Ok(())
}

fn required_text(
    field: &str,
    value: &Field<String>,
    max_len: usize,
) -> Result<String, ValidationError> {
    match value {
        Field::Missing => Err(ValidationError::missing(field)),
        Field::Invalid { expected } => Err(ValidationError::invalid_type(field, expected)),
        Field::Present(s) => {
            check_text_content(field, s, max_len)?;
            Ok(s.clone())
        }
    }
}

fn optional_text(
    field: &str,
    value: &Field<String>,
    max_len: usize,
) -> Result<Option<String>, ValidationError> {
    match value {
        Field::Missing => Ok(None),
        _ => required_text(field, value, max_len).map(Some),
    }
}

fn check_due_date(value: &Field<String>) -> Result<NaiveDate, ValidationError> {
    let raw = match value {
        Field::Missing => return Err(ValidationError::missing(DUE_DATE)),
        Field::Invalid { .. } => {
            return Err(ValidationError::invalid_type(
                DUE_DATE,
                "string in YYYY-MM-DD format",
            ))
        }
        Field::Present(raw) => raw,
    };

    parse_due_date(raw).ok_or_else(|| {
        ValidationError::new(
            ValidationErrorKind::InvalidFormat,
            DUE_DATE,
            "due_date must be a valid date in YYYY-MM-DD format",
        )
    })
}

/// Parse `YYYY-MM-DD` strictly: zero padded, four-digit year, real date.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT).ok()?;
    (date.format(DUE_DATE_FORMAT).to_string() == raw).then_some(date)
}
