//! Unvalidated task submissions.
//!
//! A `TaskDraft` is what a caller hands to the service: every field may be
//! missing or carry the wrong JSON type. Decoding never fails on field
//! content; the schema decides what is acceptable.

use serde_json::{Map, Value};

/// Field names in declaration order.
pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const PRIORITY: &str = "priority";
pub const DUE_DATE: &str = "due_date";
pub const USER_NAME: &str = "user_name";
pub const LOCATION: &str = "location";

const KNOWN_FIELDS: [&str; 6] = [TITLE, DESCRIPTION, PRIORITY, DUE_DATE, USER_NAME, LOCATION];

/// A single submitted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Absent from the payload, or explicitly `null`.
    Missing,
    Present(T),
    /// Present with a JSON type that cannot be coerced.
    Invalid { expected: &'static str },
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<T> Field<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// Raw priority as submitted, before the configured rule resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityInput {
    Number(i64),
    Text(String),
}

/// Why a payload could not be turned into a draft at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftDecodeError {
    /// The payload is valid JSON but not an object.
    NotAnObject,
}

/// A task submission that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: Field<String>,
    pub description: Field<String>,
    pub priority: Field<PriorityInput>,
    pub due_date: Field<String>,
    pub user_name: Field<String>,
    pub location: Field<String>,
    /// Keys outside the task schema.
    pub unexpected: Vec<String>,
}

impl TaskDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON payload.
    ///
    /// Returns `Ok(None)` for a JSON `null` body (no usable input at all).
    pub fn from_json(value: Value) -> Result<Option<Self>, DraftDecodeError> {
        match value {
            Value::Null => Ok(None),
            Value::Object(map) => Ok(Some(Self::from_object(map))),
            _ => Err(DraftDecodeError::NotAnObject),
        }
    }

    fn from_object(mut map: Map<String, Value>) -> Self {
        let unexpected = map
            .keys()
            .filter(|key| !KNOWN_FIELDS.contains(&key.as_str()))
            .cloned()
            .collect();

        Self {
            title: text_field(map.remove(TITLE)),
            description: text_field(map.remove(DESCRIPTION)),
            priority: priority_field(map.remove(PRIORITY)),
            due_date: text_field(map.remove(DUE_DATE)),
            user_name: text_field(map.remove(USER_NAME)),
            location: text_field(map.remove(LOCATION)),
            unexpected,
        }
    }

    /// The submitted user name, if it is a string. Used for logging before
    /// validation has run.
    pub fn user_name_hint(&self) -> Option<&str> {
        self.user_name.as_present().map(String::as_str)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Field::Present(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Field::Present(description.into());
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = Field::Present(PriorityInput::Number(priority));
        self
    }

    pub fn priority_label(mut self, label: impl Into<String>) -> Self {
        self.priority = Field::Present(PriorityInput::Text(label.into()));
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Field::Present(due_date.into());
        self
    }

    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Field::Present(user_name.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Field::Present(location.into());
        self
    }
}

fn text_field(value: Option<Value>) -> Field<String> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(s)) => Field::Present(s),
        Some(_) => Field::Invalid { expected: "string" },
    }
}

fn priority_field(value: Option<Value>) -> Field<PriorityInput> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(s)) => Field::Present(PriorityInput::Text(s)),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Field::Present(PriorityInput::Number(i))
            } else if n.is_u64() {
                // Above i64::MAX: saturate so the range rule rejects it.
                Field::Present(PriorityInput::Number(i64::MAX))
            } else {
                // Integral floats (3.0, 1e20) coerce; `as` saturates out of range.
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 => Field::Present(PriorityInput::Number(f as i64)),
                    _ => Field::Invalid { expected: "integer" },
                }
            }
        }
        Some(_) => Field::Invalid { expected: "integer" },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_payload_is_no_input() {
        assert_eq!(TaskDraft::from_json(Value::Null), Ok(None));
    }

    #[test]
    fn test_array_payload_rejected() {
        assert_eq!(
            TaskDraft::from_json(json!(["not", "a", "task"])),
            Err(DraftDecodeError::NotAnObject)
        );
    }

    #[test]
    fn test_decode_full_payload() {
        let draft = TaskDraft::from_json(json!({
            "title": "Buy milk",
            "description": "2% milk",
            "priority": 3,
            "due_date": "2024-07-01",
            "user_name": "alice"
        }))
        .unwrap()
        .unwrap();

        let expected = TaskDraft::new()
            .title("Buy milk")
            .description("2% milk")
            .priority(3)
            .due_date("2024-07-01")
            .user_name("alice");
        assert_eq!(draft, expected);
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let draft = TaskDraft::from_json(json!({ "title": null }))
            .unwrap()
            .unwrap();
        assert!(draft.title.is_missing());
    }

    #[test]
    fn test_wrong_types_are_recorded() {
        let draft = TaskDraft::from_json(json!({
            "title": 42,
            "priority": [1],
            "user_name": true
        }))
        .unwrap()
        .unwrap();
        assert_eq!(draft.title, Field::Invalid { expected: "string" });
        assert_eq!(draft.priority, Field::Invalid { expected: "integer" });
        assert_eq!(draft.user_name, Field::Invalid { expected: "string" });
        assert_eq!(draft.user_name_hint(), None);
    }

    #[test]
    fn test_priority_coercion() {
        let integral = TaskDraft::from_json(json!({ "priority": 4.0 }))
            .unwrap()
            .unwrap();
        assert_eq!(integral.priority, Field::Present(PriorityInput::Number(4)));

        let fractional = TaskDraft::from_json(json!({ "priority": 2.5 }))
            .unwrap()
            .unwrap();
        assert_eq!(fractional.priority, Field::Invalid { expected: "integer" });

        let huge = TaskDraft::from_json(json!({ "priority": u64::MAX }))
            .unwrap()
            .unwrap();
        assert_eq!(huge.priority, Field::Present(PriorityInput::Number(i64::MAX)));

        let huge_float = TaskDraft::from_json(json!({ "priority": 1e20 }))
            .unwrap()
            .unwrap();
        assert_eq!(
            huge_float.priority,
            Field::Present(PriorityInput::Number(i64::MAX))
        );

        let negative_float = TaskDraft::from_json(json!({ "priority": -1e20 }))
            .unwrap()
            .unwrap();
        assert_eq!(
            negative_float.priority,
            Field::Present(PriorityInput::Number(i64::MIN))
        );

        let text = TaskDraft::from_json(json!({ "priority": "high" }))
            .unwrap()
            .unwrap();
        assert_eq!(
            text.priority,
            Field::Present(PriorityInput::Text("high".to_string()))
        );
    }

    #[test]
    fn test_unknown_keys_collected() {
        let draft = TaskDraft::from_json(json!({
            "title": "x",
            "Title": "y",
            "extra": 1
        }))
        .unwrap()
        .unwrap();
        let mut unexpected = draft.unexpected.clone();
        unexpected.sort();
        assert_eq!(unexpected, vec!["Title".to_string(), "extra".to_string()]);
    }
}
