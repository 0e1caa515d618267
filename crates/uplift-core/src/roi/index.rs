//! Lookup indexes over the mapping and master tables
//!
//! Rows without a usable key are skipped silently. Duplicate keys resolve
//! last-write-wins, except spend which is summed per promotion.

use std::collections::HashMap;

use tracing::debug;

use crate::fields;
use crate::models::Workbook;
use crate::normalize::{
    cell_text, field, material_of, normalize_material, normalize_upc, parse_amount,
};

use super::matching::MaterialSet;

/// In-memory join indexes, rebuilt for every engine call
#[derive(Debug, Default)]
pub struct LookupIndex {
    /// Lower-cased territory id -> lower-cased Nielsen customer
    territory_to_customer: HashMap<String, String>,
    material_to_upc: HashMap<String, String>,
    upc_to_material: HashMap<String, String>,
    material_pack_size: HashMap<String, f64>,
    material_cost: HashMap<String, f64>,
    material_list_price: HashMap<String, f64>,
    /// Promotion id -> sum of FI document amounts
    actual_spend: HashMap<String, f64>,
    /// Promotion id -> materials referenced on its FI documents
    fi_materials: HashMap<String, MaterialSet>,
}

impl LookupIndex {
    pub fn build(workbook: &Workbook) -> Self {
        let mut index = Self::default();

        for mapping in &workbook.customer_mappings {
            if !mapping.territory_id.is_empty() && !mapping.nielsen_customer.is_empty() {
                index.territory_to_customer.insert(
                    mapping.territory_id.to_lowercase(),
                    mapping.nielsen_customer.to_lowercase(),
                );
            }
        }

        // UPC maps come from the same pass so both directions stay consistent
        for mapping in &workbook.material_mappings {
            let material = normalize_material(&mapping.matnr);
            if material.is_empty() {
                continue;
            }
            if !mapping.pack_size.is_empty() {
                let pack = parse_amount(&mapping.pack_size.as_str().into());
                index
                    .material_pack_size
                    .insert(material.clone(), if pack == 0.0 { 1.0 } else { pack });
            }
            let upc = normalize_upc(&mapping.upc);
            if !upc.is_empty() {
                index.material_to_upc.insert(material.clone(), upc.clone());
                index.upc_to_material.insert(upc, material);
            }
        }

        for row in &workbook.costs {
            let material = material_of(field(row, fields::MASTER_MATERIAL));
            if !material.is_empty() {
                index
                    .material_cost
                    .insert(material, parse_amount(field(row, fields::COST)));
            }
        }

        for row in &workbook.prices {
            let material = material_of(field(row, fields::MASTER_MATERIAL));
            if !material.is_empty() {
                index
                    .material_list_price
                    .insert(material, parse_amount(field(row, fields::LIST_PRICE)));
            }
        }

        for row in &workbook.financial_documents {
            let promotion_id = cell_text(field(row, fields::FI_PROMOTION_ID));
            if promotion_id.is_empty() {
                continue;
            }
            let amount = parse_amount(field(row, fields::FI_AMOUNT));
            *index
                .actual_spend
                .entry(promotion_id.clone())
                .or_insert(0.0) += amount;

            let material = material_of(field(row, fields::FI_MATERIAL));
            if !material.is_empty() {
                index
                    .fi_materials
                    .entry(promotion_id)
                    .or_default()
                    .insert(material);
            }
        }

        debug!(
            territories = index.territory_to_customer.len(),
            materials = index.material_to_upc.len(),
            costs = index.material_cost.len(),
            prices = index.material_list_price.len(),
            promotions_with_spend = index.actual_spend.len(),
            "Lookup indexes built"
        );

        index
    }

    /// Nielsen customer for a territory id (case-insensitive)
    pub fn customer_for_territory(&self, territory_id: &str) -> Option<&str> {
        self.territory_to_customer
            .get(&territory_id.to_lowercase())
            .map(String::as_str)
    }

    pub fn upc_for_material(&self, material: &str) -> Option<&str> {
        self.material_to_upc.get(material).map(String::as_str)
    }

    pub fn material_for_upc(&self, upc: &str) -> Option<&str> {
        self.upc_to_material.get(upc).map(String::as_str)
    }

    /// Consumer units per case; 1 when the mapping gives none
    pub fn pack_size(&self, material: &str) -> f64 {
        self.material_pack_size.get(material).copied().unwrap_or(1.0)
    }

    /// Cost of goods per case
    pub fn cost(&self, material: &str) -> Option<f64> {
        self.material_cost.get(material).copied()
    }

    /// List price per case
    pub fn list_price(&self, material: &str) -> Option<f64> {
        self.material_list_price.get(material).copied()
    }

    /// Total FI spend posted to a promotion; 0 when none
    pub fn actual_spend(&self, promotion_id: &str) -> f64 {
        self.actual_spend.get(promotion_id).copied().unwrap_or(0.0)
    }

    pub fn fi_materials(&self, promotion_id: &str) -> Option<&MaterialSet> {
        self.fi_materials.get(promotion_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerMapping, MaterialMapping, Record};

    #[test]
    fn test_territory_lookup_is_case_insensitive_last_write_wins() {
        let mut workbook = Workbook::new();
        workbook.customer_mappings = vec![
            CustomerMapping::new("T1", "North", "Acme"),
            CustomerMapping::new("t1", "North", "Globex"),
            CustomerMapping::new("T2", "South", ""),
        ];
        let index = LookupIndex::build(&workbook);

        assert_eq!(index.customer_for_territory("T1"), Some("globex"));
        assert_eq!(index.customer_for_territory("T2"), None);
    }

    #[test]
    fn test_material_maps_are_normalized_and_bidirectional() {
        let mut workbook = Workbook::new();
        workbook.material_mappings = vec![
            MaterialMapping::new("000200", "000100", "12"),
            MaterialMapping::new("300", "", ""),
            MaterialMapping::new("400", "500", "0"),
        ];
        let index = LookupIndex::build(&workbook);

        assert_eq!(index.upc_for_material("200"), Some("100"));
        assert_eq!(index.material_for_upc("100"), Some("200"));
        assert_eq!(index.pack_size("200"), 12.0);
        assert_eq!(index.upc_for_material("300"), None);
        assert_eq!(index.pack_size("300"), 1.0);
        assert_eq!(index.pack_size("400"), 1.0);
    }

    #[test]
    fn test_upc_reverse_map_last_write_wins() {
        let mut workbook = Workbook::new();
        workbook.material_mappings = vec![
            MaterialMapping::new("A1", "100", ""),
            MaterialMapping::new("A2", "100", ""),
        ];
        let index = LookupIndex::build(&workbook);
        assert_eq!(index.material_for_upc("100"), Some("a2"));
        assert_eq!(index.upc_for_material("a1"), Some("100"));
    }

    #[test]
    fn test_masters_skip_rows_without_material() {
        let mut workbook = Workbook::new();
        workbook.costs = vec![
            Record::from_pairs([("Material", "0042"), ("Cost", "$3.50")]),
            Record::from_pairs([("Cost", "9")]),
            Record::from_pairs([("Material", "42"), ("Cost", "4")]),
        ];
        workbook.prices = vec![Record::from_pairs([("matnr", "42"), ("List Price", "10")])];
        let index = LookupIndex::build(&workbook);

        assert_eq!(index.cost("42"), Some(4.0));
        assert_eq!(index.list_price("42"), Some(10.0));
        assert_eq!(index.cost("9"), None);
    }

    #[test]
    fn test_fi_spend_summed_per_promotion() {
        let mut workbook = Workbook::new();
        workbook.financial_documents = vec![
            Record::from_pairs([("PromotionID", "P1"), ("Amount", "1,000"), ("Material", "0200")]),
            Record::from_pairs([("Promotion ID", "P1"), ("AMOUNT", "250.50"), ("Matnr", "300")]),
            Record::from_pairs([("PromotionID", "P2"), ("Amount", "75")]),
            Record::from_pairs([("Amount", "999")]),
        ];
        let index = LookupIndex::build(&workbook);

        assert_eq!(index.actual_spend("P1"), 1250.5);
        assert_eq!(index.actual_spend("P2"), 75.0);
        assert_eq!(index.actual_spend("P3"), 0.0);

        let materials: Vec<&str> = index.fi_materials("P1").unwrap().iter().collect();
        assert_eq!(materials, vec!["200", "300"]);
        assert!(index.fi_materials("P2").is_none());
    }
}
