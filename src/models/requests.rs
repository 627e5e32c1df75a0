use serde::Deserialize;

/// Raw profile submission payload.
///
/// Fields stay optional and loosely typed here so that a schema violation
/// reports `INVALID_BODY` from the validator instead of failing JSON
/// extraction; only an unparseable body is a `BAD_JSON`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub age: Option<serde_json::Value>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub contact_handle: Option<String>,
}

/// Request to draw one match
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrawRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}
