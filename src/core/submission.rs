use crate::models::{Gender, ProfileDraft, SubmitRequest};
use serde_json::Value;
use thiserror::Error;

pub const NICKNAME_MAX_CHARS: usize = 50;
pub const CONTACT_HANDLE_MAX_CHARS: usize = 64;
pub const AGE_MIN: i64 = 18;
pub const AGE_MAX: i64 = 50;

/// Rejected submission, naming every offending field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid field(s): {}", .fields.join(", "))]
pub struct ValidationError {
    pub fields: Vec<&'static str>,
}

/// Validate and normalize a raw submission into a profile draft.
///
/// All rules must hold; the error lists every field that failed, not just
/// the first one. String fields are trimmed before their length is checked,
/// so the trimmed form is what gets persisted.
pub fn validate_submission(raw: &SubmitRequest) -> Result<ProfileDraft, ValidationError> {
    let mut fields = Vec::new();

    let nickname = raw.nickname.as_deref().map(str::trim).unwrap_or("");
    if nickname.is_empty() || nickname.chars().count() > NICKNAME_MAX_CHARS {
        fields.push("nickname");
    }

    let age = match coerce_age(raw.age.as_ref()) {
        Some(age) if (AGE_MIN..=AGE_MAX).contains(&age) => age,
        _ => {
            fields.push("age");
            0
        }
    };

    let gender = match raw.gender.as_deref().and_then(|g| g.parse::<Gender>().ok()) {
        Some(gender) => gender,
        None => {
            fields.push("gender");
            Gender::Male
        }
    };

    let contact_handle = raw.contact_handle.as_deref().map(str::trim).unwrap_or("");
    if contact_handle.is_empty() || contact_handle.chars().count() > CONTACT_HANDLE_MAX_CHARS {
        fields.push("contact_handle");
    }

    if !fields.is_empty() {
        return Err(ValidationError { fields });
    }

    Ok(ProfileDraft {
        nickname: nickname.to_string(),
        age: age as i16,
        gender,
        contact_handle: contact_handle.to_string(),
    })
}

/// Coerce a JSON value to an integer age.
///
/// Accepts integers, floats with a zero fraction, and numeric strings;
/// everything else is rejected.
fn coerce_age(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
