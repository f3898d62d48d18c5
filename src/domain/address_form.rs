//! Cascading address selects.
//!
//! The address form has four dependent selects: province, city, district,
//! village. Each select's options are filtered by the value of the field it
//! depends on, so changing a field clears every field downstream of it.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::domain::region::RegionLevel;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AddressField {
    Province,
    City,
    District,
    Village,
}

impl AddressField {
    pub const ALL: [AddressField; 4] = [
        AddressField::Province,
        AddressField::City,
        AddressField::District,
        AddressField::Village,
    ];

    /// Region level whose names populate this select.
    pub fn level(self) -> RegionLevel {
        match self {
            AddressField::Province => RegionLevel::Province,
            AddressField::City => RegionLevel::Regency,
            AddressField::District => RegionLevel::District,
            AddressField::Village => RegionLevel::Village,
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, AddressField::Village)
    }
}

/// Directed "depends on" graph between form fields.
#[derive(Debug, Clone)]
pub struct FieldDependencyGraph<F> {
    dependents: HashMap<F, Vec<F>>,
    sources: HashMap<F, F>,
}

impl<F> FieldDependencyGraph<F>
where
    F: Copy + Eq + std::hash::Hash,
{
    pub fn new() -> Self {
        Self {
            dependents: HashMap::new(),
            sources: HashMap::new(),
        }
    }

    /// Declares that `field`'s options are derived from `source`'s value.
    pub fn depends_on(mut self, field: F, source: F) -> Self {
        self.dependents.entry(source).or_default().push(field);
        self.sources.insert(field, source);
        self
    }

    pub fn source_of(&self, field: F) -> Option<F> {
        self.sources.get(&field).copied()
    }

    /// Every field that must be reset when `changed` changes, nearest first.
    pub fn reset_set(&self, changed: F) -> Vec<F> {
        let mut reset = Vec::new();
        let mut seen = HashSet::from([changed]);
        let mut queue = VecDeque::from([changed]);

        while let Some(field) = queue.pop_front() {
            for dependent in self.dependents.get(&field).into_iter().flatten() {
                if seen.insert(*dependent) {
                    reset.push(*dependent);
                    queue.push_back(*dependent);
                }
            }
        }

        reset
    }
}

pub fn address_dependencies() -> FieldDependencyGraph<AddressField> {
    FieldDependencyGraph::new()
        .depends_on(AddressField::City, AddressField::Province)
        .depends_on(AddressField::District, AddressField::City)
        .depends_on(AddressField::Village, AddressField::District)
}

/// Current selection of one address form.
#[derive(Debug, Clone)]
pub struct AddressFormState {
    graph: FieldDependencyGraph<AddressField>,
    values: BTreeMap<AddressField, String>,
}

impl Default for AddressFormState {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressFormState {
    pub fn new() -> Self {
        Self {
            graph: address_dependencies(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: AddressField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Sets `field` and clears everything downstream of it. Returns the
    /// fields that held a value and were cleared.
    pub fn set(&mut self, field: AddressField, value: Option<String>) -> Vec<AddressField> {
        let unchanged = self.values.get(&field) == value.as_ref();
        match value {
            Some(value) => {
                self.values.insert(field, value);
            }
            None => {
                self.values.remove(&field);
            }
        }
        if unchanged {
            return Vec::new();
        }

        self.graph
            .reset_set(field)
            .into_iter()
            .filter(|dependent| self.values.remove(dependent).is_some())
            .collect()
    }

    /// Value that filters `field`'s options. `None` for the root field;
    /// `Some(None)` when the parent has not been chosen yet.
    pub fn filter_value(&self, field: AddressField) -> Option<Option<&str>> {
        self.graph.source_of(field).map(|source| self.get(source))
    }

    pub fn missing_required(&self) -> Vec<AddressField> {
        AddressField::ALL
            .into_iter()
            .filter(|field| field.is_required() && self.get(*field).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> AddressFormState {
        let mut form = AddressFormState::new();
        form.set(AddressField::Province, Some("Aceh".to_string()));
        form.set(AddressField::City, Some("Kab. Simeulue".to_string()));
        form.set(AddressField::District, Some("Teupah Selatan".to_string()));
        form.set(AddressField::Village, Some("Latiung".to_string()));
        form
    }

    #[test]
    fn test_reset_set_is_transitive() {
        let graph = address_dependencies();
        assert_eq!(
            graph.reset_set(AddressField::Province),
            vec![AddressField::City, AddressField::District, AddressField::Village]
        );
        assert_eq!(graph.reset_set(AddressField::District), vec![AddressField::Village]);
        assert!(graph.reset_set(AddressField::Village).is_empty());
    }

    #[test]
    fn test_changing_province_clears_downstream() {
        let mut form = filled();
        let cleared = form.set(AddressField::Province, Some("Sumatera Utara".to_string()));

        assert_eq!(
            cleared,
            vec![AddressField::City, AddressField::District, AddressField::Village]
        );
        assert_eq!(form.get(AddressField::Province), Some("Sumatera Utara"));
        assert_eq!(form.get(AddressField::City), None);
        assert_eq!(form.get(AddressField::Village), None);
    }

    #[test]
    fn test_changing_city_keeps_province() {
        let mut form = filled();
        let cleared = form.set(AddressField::City, Some("Kab. Aceh Singkil".to_string()));

        assert_eq!(cleared, vec![AddressField::District, AddressField::Village]);
        assert_eq!(form.get(AddressField::Province), Some("Aceh"));
    }

    #[test]
    fn test_setting_same_value_clears_nothing() {
        let mut form = filled();
        let cleared = form.set(AddressField::Province, Some("Aceh".to_string()));
        assert!(cleared.is_empty());
        assert_eq!(form.get(AddressField::Village), Some("Latiung"));
    }

    #[test]
    fn test_filter_value_and_required_fields() {
        let mut form = AddressFormState::new();
        assert_eq!(form.filter_value(AddressField::Province), None);
        assert_eq!(form.filter_value(AddressField::City), Some(None));
        assert_eq!(
            form.missing_required(),
            vec![AddressField::Province, AddressField::City, AddressField::District]
        );

        form.set(AddressField::Province, Some("Aceh".to_string()));
        assert_eq!(form.filter_value(AddressField::City), Some(Some("Aceh")));
    }
}
