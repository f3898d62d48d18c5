use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// One level of the administrative region tree.
///
/// Levels are recognised purely by code length. The canonical dump writes
/// codes dotted (`11`, `11.01`, `11.01.01`, `11.01.01.2001`), so a child's
/// parent code is always a fixed-length prefix of its own code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RegionLevel {
    Province,
    Regency,
    District,
    Village,
}

impl RegionLevel {
    /// Child-to-parent order, used when clearing the tree.
    pub const CLEAR_ORDER: [RegionLevel; 4] = [
        RegionLevel::Village,
        RegionLevel::District,
        RegionLevel::Regency,
        RegionLevel::Province,
    ];

    pub fn code_len(self) -> usize {
        match self {
            RegionLevel::Province => 2,
            RegionLevel::Regency => 5,
            RegionLevel::District => 8,
            RegionLevel::Village => 13,
        }
    }

    pub fn parent(self) -> Option<RegionLevel> {
        match self {
            RegionLevel::Province => None,
            RegionLevel::Regency => Some(RegionLevel::Province),
            RegionLevel::District => Some(RegionLevel::Regency),
            RegionLevel::Village => Some(RegionLevel::District),
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            RegionLevel::Province => "provinces",
            RegionLevel::Regency => "regencies",
            RegionLevel::District => "districts",
            RegionLevel::Village => "villages",
        }
    }

    /// Foreign key column pointing at the parent level, if any.
    pub fn parent_column(self) -> Option<&'static str> {
        match self {
            RegionLevel::Province => None,
            RegionLevel::Regency => Some("province_id"),
            RegionLevel::District => Some("regency_id"),
            RegionLevel::Village => Some("district_id"),
        }
    }

    pub fn classify(code: &str) -> Option<RegionLevel> {
        if !code.is_ascii() {
            return None;
        }
        match code.len() {
            2 => Some(RegionLevel::Province),
            5 => Some(RegionLevel::Regency),
            8 => Some(RegionLevel::District),
            13 => Some(RegionLevel::Village),
            _ => None,
        }
    }

    /// Derives the parent code of `code`, assuming `code` belongs to this level.
    pub fn parent_code(self, code: &str) -> Option<&str> {
        let parent = self.parent()?;
        code.get(..parent.code_len())
    }
}

/// A `(code, name)` pair extracted from a region dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTuple {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Region {
    pub id: i64,
    pub level: RegionLevel,
    pub code: String,
    pub name: String,
    pub parent_id: Option<i64>,
    /// Code of the direct parent, resolved through the parent link.
    pub parent_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_length() {
        assert_eq!(RegionLevel::classify("11"), Some(RegionLevel::Province));
        assert_eq!(RegionLevel::classify("11.01"), Some(RegionLevel::Regency));
        assert_eq!(RegionLevel::classify("11.01.01"), Some(RegionLevel::District));
        assert_eq!(
            RegionLevel::classify("11.01.01.2001"),
            Some(RegionLevel::Village)
        );
        assert_eq!(RegionLevel::classify("1101"), None);
        assert_eq!(RegionLevel::classify("110101"), None);
        assert_eq!(RegionLevel::classify(""), None);
    }

    #[test]
    fn test_non_ascii_code_is_unrecognized() {
        // Five bytes, but not a valid code.
        assert_eq!(RegionLevel::classify("1é.0"), None);
    }

    #[test]
    fn test_parent_code_prefix() {
        assert_eq!(RegionLevel::Province.parent_code("11"), None);
        assert_eq!(RegionLevel::Regency.parent_code("11.01"), Some("11"));
        assert_eq!(RegionLevel::District.parent_code("11.01.01"), Some("11.01"));
        assert_eq!(
            RegionLevel::Village.parent_code("11.01.01.2001"),
            Some("11.01.01")
        );
    }

    #[test]
    fn test_level_names_round_trip_through_strum() {
        assert_eq!(RegionLevel::Regency.to_string(), "regency");
        assert_eq!("village".parse::<RegionLevel>().ok(), Some(RegionLevel::Village));
        assert!("kelurahan".parse::<RegionLevel>().is_err());
    }
}
