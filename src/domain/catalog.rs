use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString, IntoStaticStr};
use validator::Validate;

/// Closed status set of one entity. Each entity keeps its own enumeration;
/// the sets differ (users can be banned, sellers suspended) and are not unified.
pub trait EntityStatus: Copy + Into<&'static str> + FromStr + 'static {
    const ACTIVE: Self;
    /// Statuses selected by the "not active" side of the list filter.
    const NOT_ACTIVE: &'static [Self];
}

/// Three-state status filter used by the admin list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TernaryFilter {
    #[default]
    All,
    Active,
    NotActive,
}

impl TernaryFilter {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => TernaryFilter::All,
            Some(true) => TernaryFilter::Active,
            Some(false) => TernaryFilter::NotActive,
        }
    }

    /// Status values to match, or `None` when every row qualifies.
    pub fn statuses<S: EntityStatus>(self) -> Option<Vec<&'static str>> {
        match self {
            TernaryFilter::All => None,
            TernaryFilter::Active => Some(vec![S::ACTIVE.into()]),
            TernaryFilter::NotActive => Some(S::NOT_ACTIVE.iter().map(|s| (*s).into()).collect()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BrandStatus {
    #[default]
    Active,
    Inactive,
}

impl EntityStatus for BrandStatus {
    const ACTIVE: Self = BrandStatus::Active;
    const NOT_ACTIVE: &'static [Self] = &[BrandStatus::Inactive];
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CategoryStatus {
    #[default]
    Active,
    Inactive,
}

impl EntityStatus for CategoryStatus {
    const ACTIVE: Self = CategoryStatus::Active;
    const NOT_ACTIVE: &'static [Self] = &[CategoryStatus::Inactive];
}

/// New stores start inactive until an admin enables them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SellerStatus {
    Active,
    #[default]
    Inactive,
    Suspended,
}

impl EntityStatus for SellerStatus {
    const ACTIVE: Self = SellerStatus::Active;
    const NOT_ACTIVE: &'static [Self] = &[SellerStatus::Inactive];
}

static SLUG_STRIP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s_-]+").unwrap());
static SLUG_SEPARATOR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").unwrap());

/// Derives a URL slug from a display name: lowercased, punctuation dropped,
/// words joined by `-`. Case changes inside a word do not split it.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = SLUG_STRIP_PATTERN.replace_all(&lowered, "");
    SLUG_SEPARATOR_PATTERN
        .replace_all(&stripped, "-")
        .trim_matches('-')
        .to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub logo_path: Option<String>,
    pub description: Option<String>,
    pub status: BrandStatus,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BrandInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    pub logo_path: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: BrandStatus,
    #[validate(length(max = 255))]
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub parent_id: Option<i64>,
    pub status: CategoryStatus,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub status: CategoryStatus,
    #[validate(length(max = 255))]
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Seller {
    pub id: i64,
    pub user_id: i64,
    pub store_name: String,
    pub store_slug: String,
    pub store_description: Option<String>,
    pub store_logo_path: Option<String>,
    pub status: SellerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SellerInput {
    pub user_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub store_name: String,
    #[validate(length(min = 1, max = 255))]
    pub store_slug: Option<String>,
    pub store_description: Option<String>,
    pub store_logo_path: Option<String>,
    #[serde(default)]
    pub status: SellerStatus,
    #[serde(default)]
    #[validate(nested)]
    pub addresses: Vec<AddressInput>,
}

/// Owner of a polymorphic address row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AddressOwner {
    User,
    Seller,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Address {
    pub id: i64,
    pub owner_kind: AddressOwner,
    pub owner_id: i64,
    pub label: String,
    pub recipient_name: String,
    pub phone_number: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub village: Option<String>,
    pub detail_address: String,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddressInput {
    #[validate(length(min = 1, max = 255))]
    pub label: String,
    #[validate(length(min = 1, max = 255))]
    pub recipient_name: String,
    #[validate(length(min = 1, max = 20))]
    pub phone_number: String,
    #[validate(length(min = 1))]
    pub province: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub district: String,
    pub village: Option<String>,
    #[validate(length(min = 1))]
    pub detail_address: String,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
}
