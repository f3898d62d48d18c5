use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use validator::Validate;

use crate::domain::catalog::{AddressInput, EntityStatus};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserType {
    Admin,
    Seller,
    Customer,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Banned,
}

impl EntityStatus for UserStatus {
    const ACTIVE: Self = UserStatus::Active;
    // Suspended accounts are neither side of the toggle.
    const NOT_ACTIVE: &'static [Self] = &[UserStatus::Inactive, UserStatus::Banned];
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub user_type: UserType,
    pub status: UserStatus,
    pub profile_picture: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    pub user_type: UserType,
    #[serde(default)]
    pub status: UserStatus,
    pub profile_picture: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(min = 1, max = 20))]
    pub phone_number: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub addresses: Vec<AddressInput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::TernaryFilter;

    fn input() -> UserInput {
        UserInput {
            name: "Siti".to_string(),
            email: "siti@example.com".to_string(),
            user_type: UserType::Seller,
            status: UserStatus::Active,
            profile_picture: None,
            gender: Some(Gender::Female),
            date_of_birth: None,
            phone_number: Some("0812000111".to_string()),
            addresses: Vec::new(),
        }
    }

    #[test]
    fn test_user_not_active_filter_includes_banned() {
        let statuses = TernaryFilter::NotActive.statuses::<UserStatus>().unwrap();
        assert_eq!(statuses, vec!["inactive", "banned"]);
        assert!(!statuses.contains(&"suspended"));
    }

    #[test]
    fn test_user_input_validation() {
        assert!(input().validate().is_ok());

        let mut bad_email = input();
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());

        let mut long_phone = input();
        long_phone.phone_number = Some("0".repeat(21));
        assert!(long_phone.validate().is_err());
    }
}
