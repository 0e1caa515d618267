//! Promotion grouping: one header row and a material set per promotion id

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Datelike;
use tracing::debug;

use crate::fields;
use crate::models::Record;
use crate::normalize::{cell_text, field, material_of, parse_date};

use super::matching::MaterialSet;

/// Tactic whose promotions are never analysed
const EXCLUDED_TACTIC: &str = "EDLP";

/// One promotion id with its authoritative header row
#[derive(Debug, Clone)]
pub struct PromotionGroup<'a> {
    pub promotion_id: String,
    /// First row seen for the id; later rows never overwrite it
    pub header: &'a Record,
    /// Materials across every row of the id, in first-seen order
    pub materials: MaterialSet,
}

/// Promotions grouped by id, in first-seen order
#[derive(Debug, Default)]
pub struct GroupedPromotions<'a> {
    groups: Vec<PromotionGroup<'a>>,
    by_id: HashMap<String, usize>,
    excluded_ids: HashSet<String>,
}

impl<'a> GroupedPromotions<'a> {
    pub fn get(&self, promotion_id: &str) -> Option<&PromotionGroup<'a>> {
        self.by_id.get(promotion_id).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromotionGroup<'a>> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Whether any row of the id carries the excluded tactic
    pub fn is_excluded(&self, promotion_id: &str) -> bool {
        self.excluded_ids.contains(promotion_id)
    }
}

fn is_excluded_tactic(row: &Record) -> bool {
    cell_text(field(row, fields::TACTIC))
        .trim()
        .eq_ignore_ascii_case(EXCLUDED_TACTIC)
}

/// Group the flat promotion table by promotion id
///
/// Rows without an id are skipped. An id with an EDLP row anywhere in the
/// table is dropped entirely, whatever tactic its other rows carry.
pub fn group_promotions(rows: &[Record]) -> GroupedPromotions<'_> {
    let mut grouped = GroupedPromotions {
        excluded_ids: rows
            .iter()
            .filter(|row| is_excluded_tactic(row))
            .map(|row| cell_text(field(row, fields::PROMOTION_ID)))
            .filter(|id| !id.is_empty())
            .collect(),
        ..Default::default()
    };
    let mut skipped_rows = 0usize;

    for row in rows {
        let promotion_id = cell_text(field(row, fields::PROMOTION_ID));
        if promotion_id.is_empty() {
            continue;
        }
        if grouped.excluded_ids.contains(&promotion_id) {
            skipped_rows += 1;
            continue;
        }

        let index = match grouped.by_id.get(&promotion_id) {
            Some(&index) => index,
            None => {
                grouped.groups.push(PromotionGroup {
                    promotion_id: promotion_id.clone(),
                    header: row,
                    materials: MaterialSet::default(),
                });
                grouped.by_id.insert(promotion_id, grouped.groups.len() - 1);
                grouped.groups.len() - 1
            }
        };

        let material = material_of(field(row, fields::PROMOTION_PRODUCT));
        if !material.is_empty() {
            grouped.groups[index].materials.insert(material);
        }
    }

    debug!(
        rows = rows.len(),
        promotions = grouped.groups.len(),
        excluded_ids = grouped.excluded_ids.len(),
        excluded_rows = skipped_rows,
        "Promotions grouped"
    );

    grouped
}

/// Distinct start-date years across all promotion rows, newest first
pub fn available_years(rows: &[Record]) -> Vec<String> {
    let years: BTreeSet<i32> = rows
        .iter()
        .filter_map(|row| parse_date(field(row, fields::PLANNED_START)))
        .map(|date| date.year())
        .filter(|year| (1000..=9999).contains(year))
        .collect();

    years.into_iter().rev().map(|year| year.to_string()).collect()
}
