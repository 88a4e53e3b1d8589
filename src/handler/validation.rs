//! Request input parsing: item ids from the path, item fields from the body

use serde_json::Value;

use super::error::ApiError;
use crate::store::ItemFields;

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

const BODY_REQUIRED: &str = "Request body is required";

/// One required, trimmed, length-limited string field
struct FieldRule {
    key: &'static str,
    label: &'static str,
    max_chars: usize,
}

const NAME: FieldRule = FieldRule {
    key: "name",
    label: "Name",
    max_chars: NAME_MAX_CHARS,
};

const DESCRIPTION: FieldRule = FieldRule {
    key: "description",
    label: "Description",
    max_chars: DESCRIPTION_MAX_CHARS,
};

impl FieldRule {
    /// The trimmed value, or the first violated rule pushed onto `errors`
    fn check(&self, body: &Value, errors: &mut Vec<String>) -> Option<String> {
        let problem = match body.get(self.key) {
            None | Some(Value::Null) => "is required".to_string(),
            Some(Value::String(raw)) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    "cannot be empty".to_string()
                } else if trimmed.chars().count() > self.max_chars {
                    format!("must be {} characters or less", self.max_chars)
                } else {
                    return Some(trimmed.to_string());
                }
            }
            Some(_) => "must be a string".to_string(),
        };
        errors.push(format!("{} {problem}", self.label));
        None
    }
}

/// Parse the `:id` path segment
pub fn parse_item_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::InvalidId)
}

/// Parse and validate a create/update body
pub fn parse_item_body(body: &[u8]) -> Result<ItemFields, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Validation(vec![BODY_REQUIRED.to_string()]));
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
    validate_item(&value).map_err(ApiError::Validation)
}

/// Check every field rule, collecting all violations
pub fn validate_item(body: &Value) -> Result<ItemFields, Vec<String>> {
    if body.is_null() {
        return Err(vec![BODY_REQUIRED.to_string()]);
    }

    let mut errors = Vec::new();
    let name = NAME.check(body, &mut errors);
    let description = DESCRIPTION.check(body, &mut errors);

    match (name, description) {
        (Some(name), Some(description)) => Ok(ItemFields { name, description }),
        _ => Err(errors),
    }
}
