//! Breadcrumb labels for hierarchical select options.
//!
//! Records arrive flat, each with an optional parent key. A record's label is
//! its own name prefixed by its ancestors' names, root first. The upward walk
//! only follows parents present in the given set, so nothing is fetched
//! lazily, and it never visits a node twice, so corrupted parent chains that
//! loop back on themselves still terminate.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

use crate::domain::catalog::Category;
use crate::domain::region::Region;

pub const PATH_SEPARATOR: &str = " > ";
pub const NO_PARENT_LABEL: &str = "No Parent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode<K> {
    pub key: K,
    pub parent: Option<K>,
    pub name: String,
}

impl From<&Category> for PathNode<i64> {
    fn from(category: &Category) -> Self {
        Self {
            key: category.id,
            parent: category.parent_id,
            name: category.name.clone(),
        }
    }
}

/// Regions are keyed by code; codes are unique across levels.
impl From<&Region> for PathNode<String> {
    fn from(region: &Region) -> Self {
        Self {
            key: region.code.clone(),
            parent: region.parent_code.clone(),
            name: region.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption<K> {
    pub value: Option<K>,
    pub label: String,
}

/// Breadcrumb for every node, sorted by path (ties broken by key).
pub fn build_paths<K>(nodes: &[PathNode<K>]) -> Vec<(K, String)>
where
    K: Clone + Eq + Hash + Ord,
{
    let index: HashMap<&K, &PathNode<K>> = nodes.iter().map(|node| (&node.key, node)).collect();

    let mut paths: Vec<(K, String)> = nodes
        .iter()
        .map(|node| (node.key.clone(), breadcrumb(node, &index)))
        .collect();

    paths.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    paths
}

fn breadcrumb<K>(node: &PathNode<K>, index: &HashMap<&K, &PathNode<K>>) -> String
where
    K: Eq + Hash,
{
    let mut names = vec![node.name.as_str()];
    let mut visited: HashSet<&K> = HashSet::from([&node.key]);
    let mut current = node;

    while let Some(parent) = current.parent.as_ref().and_then(|key| index.get(key).copied()) {
        if !visited.insert(&parent.key) {
            break;
        }
        names.push(parent.name.as_str());
        current = parent;
    }

    names.reverse();
    names.join(PATH_SEPARATOR)
}

pub fn path_options<K>(nodes: &[PathNode<K>]) -> Vec<SelectOption<K>>
where
    K: Clone + Eq + Hash + Ord,
{
    build_paths(nodes)
        .into_iter()
        .map(|(key, label)| SelectOption {
            value: Some(key),
            label,
        })
        .collect()
}

/// Options for a "parent" select: a leading `No Parent` entry, then every
/// node except the one being edited.
pub fn parent_select_options<K>(nodes: &[PathNode<K>], exclude: Option<&K>) -> Vec<SelectOption<K>>
where
    K: Clone + Eq + Hash + Ord,
{
    let mut options = vec![SelectOption {
        value: None,
        label: NO_PARENT_LABEL.to_string(),
    }];
    options.extend(
        path_options(nodes)
            .into_iter()
            .filter(|option| option.value.as_ref() != exclude),
    );
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(key: &str, parent: Option<&str>, name: &str) -> PathNode<String> {
        PathNode {
            key: key.to_string(),
            parent: parent.map(str::to_string),
            name: name.to_string(),
        }
    }

    fn label_of<'a>(paths: &'a [(String, String)], key: &str) -> &'a str {
        paths
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, label)| label.as_str())
            .unwrap()
    }

    #[test]
    fn test_province_and_regency_paths() {
        let nodes = vec![node("11", None, "Aceh"), node("1101", Some("11"), "Kab. X")];
        let paths = build_paths(&nodes);

        assert_eq!(label_of(&paths, "11"), "Aceh");
        assert_eq!(label_of(&paths, "1101"), "Aceh > Kab. X");
    }

    #[test]
    fn test_paths_sorted_by_label() {
        let nodes = vec![
            node("2", None, "Fashion"),
            node("3", Some("1"), "Laptop"),
            node("1", None, "Elektronik"),
        ];
        let labels: Vec<String> = build_paths(&nodes).into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels, vec!["Elektronik", "Elektronik > Laptop", "Fashion"]);
    }

    #[test]
    fn test_unresolved_parent_stops_walk() {
        let nodes = vec![node("5", Some("404"), "Sepatu")];
        assert_eq!(label_of(&build_paths(&nodes), "5"), "Sepatu");
    }

    #[test]
    fn test_cycle_terminates_visiting_each_node_once() {
        let nodes = vec![
            node("a", Some("c"), "A"),
            node("b", Some("a"), "B"),
            node("c", Some("b"), "C"),
        ];
        let paths = build_paths(&nodes);
        assert_eq!(label_of(&paths, "a"), "B > C > A");
        assert_eq!(label_of(&paths, "c"), "A > B > C");
    }

    #[test]
    fn test_self_parent_terminates() {
        let nodes = vec![node("x", Some("x"), "Loop")];
        assert_eq!(label_of(&build_paths(&nodes), "x"), "Loop");
    }

    #[test]
    fn test_parent_select_excludes_current_record() {
        let nodes = vec![
            PathNode { key: 1_i64, parent: None, name: "Elektronik".to_string() },
            PathNode { key: 2, parent: Some(1), name: "Laptop".to_string() },
        ];
        let options = parent_select_options(&nodes, Some(&2));

        assert_eq!(
            options,
            vec![
                SelectOption { value: None, label: "No Parent".to_string() },
                SelectOption { value: Some(1), label: "Elektronik".to_string() },
            ]
        );
    }
}
