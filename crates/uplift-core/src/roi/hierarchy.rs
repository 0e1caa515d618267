//! Customer hierarchy filter resolution and the cascading picker tree

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::fields;
use crate::models::{HierarchyTree, Record, RoiFilter};
use crate::normalize::{cell_text, field};

/// How a promotion passed (or failed) the hierarchy filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyMatch {
    /// Territory id equals an admitted level-6 code
    TerritoryCode,
    /// Code missed, but the resolved customer equals an admitted level-6 name
    CustomerName,
    Rejected,
}

impl HierarchyMatch {
    pub fn is_admitted(self) -> bool {
        self != Self::Rejected
    }
}

/// Admissible level-6 codes and names under the selected hierarchy nodes
///
/// All sets hold lower-cased values.
#[derive(Debug, Clone, Default)]
pub struct HierarchyScope {
    territory_codes: HashSet<String>,
    customer_names: HashSet<String>,
    /// Every level-6 code in the hierarchy, selected or not
    known_codes: HashSet<String>,
}

impl HierarchyScope {
    /// Resolve the filter against the hierarchy rows
    ///
    /// Returns `None` when the filter is inactive: no level selected, or no
    /// hierarchy rows to test against.
    pub fn resolve(rows: &[Record], filter: &RoiFilter) -> Option<Self> {
        if !filter.has_hierarchy() || rows.is_empty() {
            return None;
        }

        let mut scope = Self::default();
        for row in rows {
            let code = trimmed(row, fields::HIER6_CODE).to_lowercase();
            if !code.is_empty() {
                scope.known_codes.insert(code.clone());
            }

            let path = HierarchyPath::of(row);
            let selected = level_matches(filter.hier2.as_deref(), &path.level2)
                && level_matches(filter.hier3.as_deref(), &path.level3)
                && level_matches(filter.hier4.as_deref(), &path.level4);
            if !selected {
                continue;
            }

            if !code.is_empty() {
                scope.territory_codes.insert(code);
            }
            let name = trimmed(row, fields::HIER6_NAME);
            if !name.is_empty() {
                scope.customer_names.insert(name.to_lowercase());
            }
        }

        debug!(
            territory_codes = scope.territory_codes.len(),
            customer_names = scope.customer_names.len(),
            "Hierarchy filter resolved"
        );

        Some(scope)
    }

    /// Test a promotion; the territory code takes precedence over the name
    ///
    /// `customer` is the resolved (lower-cased) Nielsen customer, if any. The
    /// name is only consulted for territories the hierarchy does not place
    /// anywhere: a code found under another branch is rejected outright.
    pub fn admits(&self, territory_id: &str, customer: Option<&str>) -> HierarchyMatch {
        let code = territory_id.trim().to_lowercase();
        if !code.is_empty() {
            if self.territory_codes.contains(&code) {
                return HierarchyMatch::TerritoryCode;
            }
            if self.known_codes.contains(&code) {
                return HierarchyMatch::Rejected;
            }
        }
        match customer {
            Some(name) if !name.is_empty() && self.customer_names.contains(&name.to_lowercase()) => {
                HierarchyMatch::CustomerName
            }
            _ => HierarchyMatch::Rejected,
        }
    }
}

fn level_matches(selected: Option<&str>, value: &str) -> bool {
    selected.map_or(true, |wanted| wanted == value)
}

struct HierarchyPath {
    level2: String,
    level3: String,
    level4: String,
}

impl HierarchyPath {
    fn of(row: &Record) -> Self {
        Self {
            level2: trimmed(row, fields::HIER2_NAME),
            level3: trimmed(row, fields::HIER3_NAME),
            level4: trimmed(row, fields::HIER4_NAME),
        }
    }
}

fn trimmed(row: &Record, candidates: &[&str]) -> String {
    cell_text(field(row, candidates)).trim().to_string()
}

/// Levels 2 to 4 of the hierarchy as a tree for cascading pickers
///
/// A level-3 name is recorded only under a non-empty level 2, and a level-4
/// name only under a non-empty level 3.
pub fn hierarchy_tree(rows: &[Record]) -> HierarchyTree {
    let mut level2 = BTreeSet::new();
    let mut tree = HierarchyTree::default();

    for row in rows {
        let path = HierarchyPath::of(row);
        if path.level2.is_empty() {
            continue;
        }
        level2.insert(path.level2.clone());
        if path.level3.is_empty() {
            continue;
        }
        if !path.level4.is_empty() {
            tree.level3_to_level4
                .entry(path.level3.clone())
                .or_default()
                .insert(path.level4);
        }
        tree.level2_to_level3
            .entry(path.level2)
            .or_default()
            .insert(path.level3);
    }

    tree.level2 = level2.into_iter().collect();
    tree
}
