//! Candidate header names for each logical field
//!
//! Upstream spreadsheets are not header-standardized. Each list is tried in
//! order by [`crate::normalize::find_field`]: exact header first, then a
//! case- and punctuation-insensitive match.

// Promotions
pub const PROMOTION_ID: &[&str] = &["PromotionID", "ID", "PromoID"];
pub const PROMOTION_NAME: &[&str] = &["PromotionName", "Name"];
pub const TERRITORY_ID: &[&str] = &["TerritoryID", "Territory ID"];
pub const TACTIC: &[&str] = &["Tactic", "Strategy"];
pub const PLANNED_START: &[&str] = &["Planned_Start", "Start Date", "Start"];
pub const PLANNED_END: &[&str] = &["Planned_Finish", "End Date", "Finish", "End"];
pub const PLANNED_SPEND: &[&str] = &["Planned_Spend", "Planned Spend", "Spend"];
pub const PROMOTION_PRODUCT: &[&str] = &["ProductID", "Product ID", "Material", "SKU"];

// FI documents
pub const FI_PROMOTION_ID: &[&str] = &["PromotionID", "Promotion ID", "PromId"];
pub const FI_AMOUNT: &[&str] = &["AMOUNT", "Amount", "Amt"];
pub const FI_MATERIAL: &[&str] = &["MATERIAL", "Material", "Matnr"];
pub const FI_DATE: &[&str] = &["Date", "PostDate", "DocDate"];
pub const FI_DOCUMENT: &[&str] = &["FIDOCUMENT", "Document"];
pub const FI_GL_ACCOUNT: &[&str] = &["GL_ACCOUNT", "GL"];
pub const FI_DESCRIPTION: &[&str] = &["Desc", "Description", "Text"];

// Cost and price masters
pub const MASTER_MATERIAL: &[&str] = &["MATNR", "Material"];
pub const COST: &[&str] = &["COGS", "Cost"];
pub const LIST_PRICE: &[&str] = &["LISTPRICE", "List Price", "Price"];

// Nielsen sales
pub const SALES_CUSTOMER: &[&str] = &["Customer", "Cust"];
pub const SALES_DATE: &[&str] = &["Date", "Period"];
pub const SALES_UPC: &[&str] = &["UPC", "UPC Code", "Item"];
pub const INCREMENTAL_UNITS: &[&str] = &["Incremental U Vol", "Inc Vol", "Inc Units"];
pub const BASELINE_UNITS: &[&str] = &["Baseline U Vol", "Base Vol"];
pub const UNIT_PRICE: &[&str] = &["Avg Sgl Unit Price", "Unit Price", "Price"];

// Customer hierarchy
pub const HIER2_NAME: &[&str] = &["Hier2Name", "Hier2"];
pub const HIER3_NAME: &[&str] = &["Hier3Name", "Hier3"];
pub const HIER4_NAME: &[&str] = &["Hier4Name", "Hier4"];
pub const HIER6_CODE: &[&str] = &["Hier6", "Hier6Code"];
pub const HIER6_NAME: &[&str] = &["Hier6Name"];

// Mapping tables loaded from spreadsheets
pub const MAPPING_TERRITORY_ID: &[&str] = &["TerritoryID", "Territory ID"];
pub const MAPPING_TERRITORY_NAME: &[&str] = &["TerritoryName", "Territory Name"];
pub const MAPPING_NIELSEN_CUSTOMER: &[&str] =
    &["NielsenCustomer", "Nielsen Customer", "Customer"];
pub const MAPPING_MATNR: &[&str] = &["MATNR", "Material"];
pub const MAPPING_UPC: &[&str] = &["UPC", "UPC Code"];
pub const MAPPING_PACK_SIZE: &[&str] = &["PackSize", "Pack Size"];
