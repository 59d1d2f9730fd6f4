use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct App {
    #[serde(deserialize_with = "super::lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    #[serde(deserialize_with = "super::lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(deserialize_with = "super::lenient::id")]
    pub id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub emails: Vec<Contact>,
    #[serde(default)]
    pub phone_numbers: Vec<Contact>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
}

/// An email address or phone number attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Contact {
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_requires_id() {
        assert!(serde_json::from_str::<User>(r#"{"UserName":"x"}"#).is_err());
        let user: User =
            serde_json::from_str(r#"{"Id":"u1","FirstName":"Ada","Emails":[{"Address":"a@x.io","Verified":true}]}"#)
                .unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert_eq!(user.emails[0].verified, Some(true));
    }
}
