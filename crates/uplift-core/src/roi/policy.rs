//! Fallback policies as explicit decision tables
//!
//! | Decision | Condition | Outcome |
//! |---|---|---|
//! | spend | FI total > 0 | actual FI total |
//! | spend | otherwise | planned spend |
//! | price | material known, list price set | master list price / pack |
//! | price | material known, no list price | Nielsen unit price (case = price x pack) |
//! | price | no material | Nielsen unit price, zero cost |
//! | ROI | spend > 0 | (margin - spend) / spend x 100 |
//! | ROI | spend = 0, margin > 0 | exactly 100 |
//! | ROI | otherwise | 0 |

use serde::{Deserialize, Serialize};

use super::index::LookupIndex;

/// Where a promotion's final spend came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendSource {
    /// Sum of FI documents posted to the promotion
    Actual,
    /// Planned spend from the promotion calendar
    Planned,
}

/// The spend used for ROI, chosen once per promotion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendDecision {
    pub source: SpendSource,
    pub amount: f64,
}

impl SpendDecision {
    pub fn choose(actual: f64, planned: f64) -> Self {
        if actual > 0.0 {
            Self {
                source: SpendSource::Actual,
                amount: actual,
            }
        } else {
            Self {
                source: SpendSource::Planned,
                amount: planned,
            }
        }
    }
}

/// How a sales line's list price was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// Material master list price per case
    ListPrice,
    /// Material known but unpriced: Nielsen unit price scaled to a case
    SalesPriceCase,
    /// No material for the UPC: Nielsen unit price with zero cost
    SalesPriceUnmapped,
}

/// Per-unit list price and cost for one sales line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitEconomics {
    pub basis: PriceBasis,
    pub pack_size: f64,
    pub unit_list_price: f64,
    pub unit_cost: f64,
}

impl UnitEconomics {
    /// Resolve unit economics for a sales line priced at `sales_unit_price`
    pub fn resolve(material: Option<&str>, sales_unit_price: f64, index: &LookupIndex) -> Self {
        match material {
            Some(material) => {
                let pack_size = index.pack_size(material);
                let case_cost = index.cost(material).unwrap_or(0.0);
                match index.list_price(material).filter(|p| *p != 0.0) {
                    Some(case_list) => {
                        Self::from_case(PriceBasis::ListPrice, case_list, case_cost, pack_size)
                    }
                    None => Self::from_case(
                        PriceBasis::SalesPriceCase,
                        sales_unit_price * pack_size,
                        case_cost,
                        pack_size,
                    ),
                }
            }
            None => Self::from_case(PriceBasis::SalesPriceUnmapped, sales_unit_price, 0.0, 1.0),
        }
    }

    fn from_case(basis: PriceBasis, case_list: f64, case_cost: f64, pack_size: f64) -> Self {
        let per_unit = |case: f64| if pack_size > 0.0 { case / pack_size } else { 0.0 };
        Self {
            basis,
            pack_size,
            unit_list_price: per_unit(case_list),
            unit_cost: per_unit(case_cost),
        }
    }

    pub fn unit_margin(&self) -> f64 {
        self.unit_list_price - self.unit_cost
    }
}

/// ROI percent for one promotion
pub fn roi_percent(gross_margin: f64, final_spend: f64) -> f64 {
    if final_spend > 0.0 {
        (gross_margin - final_spend) / final_spend * 100.0
    } else if gross_margin > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// ROI percent of summed margin over summed spend; 0 without spend
pub fn pooled_roi_percent(total_gross_margin: f64, total_spend: f64) -> f64 {
    if total_spend > 0.0 {
        (total_gross_margin - total_spend) / total_spend * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaterialMapping, Record, Workbook};

    fn index_with_material(list_price: Option<&str>, cost: Option<&str>, pack: &str) -> LookupIndex {
        let mut workbook = Workbook::new();
        workbook
            .material_mappings
            .push(MaterialMapping::new("200", "100", pack));
        if let Some(price) = list_price {
            workbook
                .prices
                .push(Record::from_pairs([("MATNR", "200"), ("LISTPRICE", price)]));
        }
        if let Some(cost) = cost {
            workbook
                .costs
                .push(Record::from_pairs([("MATNR", "200"), ("COGS", cost)]));
        }
        LookupIndex::build(&workbook)
    }

    #[test]
    fn test_spend_prefers_positive_actual() {
        let decision = SpendDecision::choose(20.0, 50.0);
        assert_eq!(decision.source, SpendSource::Actual);
        assert_eq!(decision.amount, 20.0);
    }

    #[test]
    fn test_spend_falls_back_to_planned() {
        for actual in [0.0, -5.0] {
            let decision = SpendDecision::choose(actual, 50.0);
            assert_eq!(decision.source, SpendSource::Planned);
            assert_eq!(decision.amount, 50.0);
        }
    }

    #[test]
    fn test_roi_percent_table() {
        assert_eq!(roi_percent(60.0, 20.0), 200.0);
        assert_eq!(roi_percent(60.0, 0.0), 100.0);
        assert_eq!(roi_percent(0.0, 0.0), 0.0);
        assert_eq!(roi_percent(-10.0, 0.0), 0.0);
        assert_eq!(roi_percent(10.0, 40.0), -75.0);
        assert!(roi_percent(1e-300, 0.0).is_finite());
    }

    #[test]
    fn test_pooled_roi_without_spend_is_zero() {
        assert_eq!(pooled_roi_percent(500.0, 0.0), 0.0);
        assert_eq!(pooled_roi_percent(150.0, 100.0), 50.0);
    }

    #[test]
    fn test_list_price_basis() {
        let index = index_with_material(Some("96"), Some("24"), "12");
        let econ = UnitEconomics::resolve(Some("200"), 9.99, &index);
        assert_eq!(econ.basis, PriceBasis::ListPrice);
        assert_eq!(econ.unit_list_price, 8.0);
        assert_eq!(econ.unit_cost, 2.0);
        assert_eq!(econ.unit_margin(), 6.0);
    }

    #[test]
    fn test_missing_list_price_uses_sales_price_per_case() {
        let index = index_with_material(None, Some("24"), "12");
        let econ = UnitEconomics::resolve(Some("200"), 5.0, &index);
        assert_eq!(econ.basis, PriceBasis::SalesPriceCase);
        assert_eq!(econ.unit_list_price, 5.0);
        assert_eq!(econ.unit_cost, 2.0);
    }

    #[test]
    fn test_zero_list_price_counts_as_missing() {
        let index = index_with_material(Some("0"), None, "1");
        let econ = UnitEconomics::resolve(Some("200"), 5.0, &index);
        assert_eq!(econ.basis, PriceBasis::SalesPriceCase);
        assert_eq!(econ.unit_cost, 0.0);
    }

    #[test]
    fn test_unmapped_uses_sales_price_and_zero_cost() {
        let index = index_with_material(Some("96"), Some("24"), "12");
        let econ = UnitEconomics::resolve(None, 5.0, &index);
        assert_eq!(econ.basis, PriceBasis::SalesPriceUnmapped);
        assert_eq!(econ.pack_size, 1.0);
        assert_eq!(econ.unit_margin(), 5.0);
    }

    #[test]
    fn test_non_positive_pack_size_zeroes_unit_values() {
        let index = index_with_material(Some("96"), Some("24"), "-2");
        let econ = UnitEconomics::resolve(Some("200"), 5.0, &index);
        assert_eq!(econ.unit_list_price, 0.0);
        assert_eq!(econ.unit_cost, 0.0);
    }
}
