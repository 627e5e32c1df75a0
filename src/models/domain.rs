use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Binary gender used to partition the matching pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The gender a requester is matched against.
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user profile, as persisted in the profiles table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub nickname: String,
    pub age: i16,
    pub gender: Gender,
    pub contact_handle: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Normalized profile draft produced by the submission validator.
///
/// The store assigns `id` and `created_at` at insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub nickname: String,
    pub age: i16,
    pub gender: Gender,
    pub contact_handle: String,
}

/// One append-only record of a draw attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawLogEntry {
    pub id: i64,
    pub requesting_user_id: Uuid,
    pub matched_user_id: Uuid,
    pub requester_fingerprint: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Draw success payload.
///
/// Deliberately omits the matched profile's id and the requester
/// relationship; callers only ever see these three fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedProfile {
    pub nickname: String,
    pub age: i16,
    pub contact_handle: String,
}

impl From<UserProfile> for MatchedProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            nickname: profile.nickname,
            age: profile.age,
            contact_handle: profile.contact_handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_opposite() {
        assert_eq!(Gender::Male.opposite(), Gender::Female);
        assert_eq!(Gender::Female.opposite(), Gender::Male);
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!("male".parse(), Ok(Gender::Male));
        assert_eq!("female".parse(), Ok(Gender::Female));
        assert!("other".parse::<Gender>().is_err());
        assert!("Male".parse::<Gender>().is_err());
    }

    #[test]
    fn test_gender_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"male\"");
        let parsed: Gender = serde_json::from_str("\"female\"").unwrap();
        assert_eq!(parsed, Gender::Female);
    }

    #[test]
    fn test_matched_profile_hides_id() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            nickname: "Ana".to_string(),
            age: 24,
            gender: Gender::Female,
            contact_handle: "wx_ana".to_string(),
            created_at: chrono::Utc::now(),
        };

        let matched = MatchedProfile::from(profile);
        let json = serde_json::to_value(&matched).unwrap();

        assert!(json.get("id").is_none());
        assert_eq!(json["nickname"], "Ana");
        assert_eq!(json["age"], 24);
        assert_eq!(json["contact_handle"], "wx_ana");
    }
}
