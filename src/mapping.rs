//! Column mapping and the per-row mapper.
//!
//! The mapper is the boundary where header-keyed text becomes a typed
//! [`CanonicalSalesRecord`]. Required fields are checked in order and the
//! first failure ends the row; optional fields are best-effort.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    dates::{DateFormatHint, parse_date},
    numbers::{DecimalSeparator, parse_count, parse_number},
    record::{CanonicalField, CanonicalSalesRecord, MappingFailure, RawRecord},
    yaml_provider,
};

/// Canonical field → source header, as declared by the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: String,
    pub product: String,
    pub quantity: String,
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<String>,
}

impl ColumnMapping {
    pub fn new(
        date: impl Into<String>,
        product: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            product: product.into(),
            quantity: quantity.into(),
            price: price.into(),
            category: None,
            sku: None,
            supplier: None,
            stock: None,
        }
    }

    /// Every canonical field read from a header of the same name.
    pub fn identity() -> Self {
        let mut mapping = Self::new("date", "product", "quantity", "price");
        mapping.category = Some("category".to_string());
        mapping.sku = Some("sku".to_string());
        mapping.supplier = Some("supplier".to_string());
        mapping.stock = Some("stock".to_string());
        mapping
    }

    pub fn with(mut self, field: CanonicalField, column: impl Into<String>) -> Self {
        let column = column.into();
        match field {
            CanonicalField::Date => self.date = column,
            CanonicalField::Product => self.product = column,
            CanonicalField::Quantity => self.quantity = column,
            CanonicalField::Price => self.price = column,
            CanonicalField::Category => self.category = Some(column),
            CanonicalField::Sku => self.sku = Some(column),
            CanonicalField::Supplier => self.supplier = Some(column),
            CanonicalField::Stock => self.stock = Some(column),
        }
        self
    }

    /// Source header for `field`; blank declarations count as unmapped.
    pub fn column(&self, field: CanonicalField) -> Option<&str> {
        let raw = match field {
            CanonicalField::Date => Some(self.date.as_str()),
            CanonicalField::Product => Some(self.product.as_str()),
            CanonicalField::Quantity => Some(self.quantity.as_str()),
            CanonicalField::Price => Some(self.price.as_str()),
            CanonicalField::Category => self.category.as_deref(),
            CanonicalField::Sku => self.sku.as_deref(),
            CanonicalField::Supplier => self.supplier.as_deref(),
            CanonicalField::Stock => self.stock.as_deref(),
        };
        raw.map(str::trim).filter(|c| !c.is_empty())
    }

    /// Mapped fields whose header is not among `headers` (or is blank, for
    /// required fields). Advisory only: the mapper tolerates both.
    pub fn missing_columns(&self, headers: &[String]) -> Vec<(CanonicalField, String)> {
        CanonicalField::REQUIRED
            .iter()
            .chain(CanonicalField::OPTIONAL.iter())
            .filter_map(|field| match self.column(*field) {
                Some(column) if !headers.iter().any(|h| h == column) => {
                    Some((*field, column.to_string()))
                }
                None if field.is_required() => Some((*field, String::new())),
                _ => None,
            })
            .collect()
    }

    pub fn load(path: &Path) -> Result<Self> {
        yaml_provider::load_from_path(path)
            .with_context(|| format!("Loading column mapping from {path:?}"))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        yaml_provider::to_string(self)
    }
}

fn header_aliases(field: CanonicalField) -> &'static [&'static str] {
    match field {
        CanonicalField::Date => &["date", "data", "fecha", "sale_date", "order_date", "dia"],
        CanonicalField::Product => &["product", "produto", "product_name", "nome_produto", "item", "producto"],
        CanonicalField::Quantity => &["quantity", "quantidade", "qty", "qtd", "cantidad", "units"],
        CanonicalField::Price => &["price", "preco", "preço", "unit_price", "valor", "precio"],
        CanonicalField::Category => &["category", "categoria"],
        CanonicalField::Sku => &["sku", "codigo", "código", "product_code"],
        CanonicalField::Supplier => &["supplier", "fornecedor", "vendor", "proveedor"],
        CanonicalField::Stock => &["stock", "estoque", "inventory", "on_hand"],
    }
}

fn normalize_header_token(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect()
}

/// Guess a mapping from header names. Required fields without a match map to
/// an empty column, which the mapper reports as a failure on every row.
pub fn suggest_mapping(headers: &[String]) -> ColumnMapping {
    let find = |field: CanonicalField| {
        let aliases = header_aliases(field);
        headers
            .iter()
            .find(|h| aliases.contains(&normalize_header_token(h).as_str()))
            .cloned()
    };
    ColumnMapping {
        date: find(CanonicalField::Date).unwrap_or_default(),
        product: find(CanonicalField::Product).unwrap_or_default(),
        quantity: find(CanonicalField::Quantity).unwrap_or_default(),
        price: find(CanonicalField::Price).unwrap_or_default(),
        category: find(CanonicalField::Category),
        sku: find(CanonicalField::Sku),
        supplier: find(CanonicalField::Supplier),
        stock: find(CanonicalField::Stock),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecheckPolicy {
    /// Rows that map but fail the semantic re-check become mapping failures.
    #[default]
    Report,
    /// Rows that map but fail the semantic re-check are only counted as skipped.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    pub mapping: ColumnMapping,
    pub date_format: DateFormatHint,
    pub decimal_separator: DecimalSeparator,
    pub recheck: RecheckPolicy,
}

impl TransformConfig {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self {
            mapping,
            date_format: DateFormatHint::default(),
            decimal_separator: DecimalSeparator::default(),
            recheck: RecheckPolicy::default(),
        }
    }

    pub fn with_date_format(mut self, hint: DateFormatHint) -> Self {
        self.date_format = hint;
        self
    }

    pub fn with_decimal_separator(mut self, separator: DecimalSeparator) -> Self {
        self.decimal_separator = separator;
        self
    }

    pub fn with_recheck(mut self, policy: RecheckPolicy) -> Self {
        self.recheck = policy;
        self
    }
}

fn cell<'a>(row: &'a RawRecord, mapping: &ColumnMapping, field: CanonicalField) -> Option<&'a str> {
    mapping.column(field).and_then(|column| row.get(column))
}

fn failure(
    row_number: usize,
    field: CanonicalField,
    value: Option<&str>,
    reason: &str,
) -> MappingFailure {
    MappingFailure {
        row: row_number,
        field,
        value: value.map(str::to_string),
        reason: reason.to_string(),
    }
}

/// Map one raw row onto a canonical record.
///
/// Stops at the first failing required field (date, product, quantity,
/// price). Does not check how far in the future the date lies; that is the
/// orchestrator's re-check.
pub fn map_row(
    row: &RawRecord,
    config: &TransformConfig,
    row_number: usize,
) -> Result<CanonicalSalesRecord, MappingFailure> {
    let mapping = &config.mapping;
    let separator = config.decimal_separator;

    let date_raw = cell(row, mapping, CanonicalField::Date);
    let date = date_raw
        .and_then(|raw| parse_date(raw, config.date_format))
        .ok_or_else(|| {
            failure(row_number, CanonicalField::Date, date_raw, "Missing or invalid date")
        })?;

    let product_raw = cell(row, mapping, CanonicalField::Product);
    let product = product_raw.map(str::trim).unwrap_or_default();
    if product.is_empty() {
        return Err(failure(
            row_number,
            CanonicalField::Product,
            product_raw,
            "Product name is missing",
        ));
    }

    let quantity_raw = cell(row, mapping, CanonicalField::Quantity);
    let quantity = quantity_raw
        .map(|raw| parse_number(raw, separator))
        .unwrap_or(f64::NAN);
    if quantity.is_nan() || quantity <= 0.0 {
        return Err(failure(
            row_number,
            CanonicalField::Quantity,
            quantity_raw,
            "Quantity must be a number greater than zero",
        ));
    }

    let price_raw = cell(row, mapping, CanonicalField::Price);
    let price = price_raw
        .map(|raw| parse_number(raw, separator))
        .unwrap_or(f64::NAN);
    if price.is_nan() || price < 0.0 {
        return Err(failure(
            row_number,
            CanonicalField::Price,
            price_raw,
            "Price must be a number greater than or equal to zero",
        ));
    }

    let text = |field| {
        mapping
            .column(field)
            .and_then(|column| row.non_blank(column))
            .map(str::to_string)
    };

    Ok(CanonicalSalesRecord {
        date,
        product: product.to_string(),
        quantity,
        price,
        category: text(CanonicalField::Category),
        sku: text(CanonicalField::Sku),
        supplier: text(CanonicalField::Supplier),
        stock: mapping
            .column(CanonicalField::Stock)
            .and_then(|column| row.non_blank(column))
            .and_then(|raw| parse_count(raw, separator)),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn widget_row() -> RawRecord {
        RawRecord::from_pairs([
            ("date", "2024-01-10"),
            ("product", " Widget "),
            ("quantity", "10"),
            ("price", "9,90"),
        ])
    }

    fn comma_config() -> TransformConfig {
        TransformConfig::new(ColumnMapping::identity())
            .with_decimal_separator(DecimalSeparator::Comma)
    }

    #[test]
    fn maps_required_fields_and_trims_product() {
        let record = map_row(&widget_row(), &comma_config(), 1).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(record.product, "Widget");
        assert_eq!(record.quantity, 10.0);
        assert_eq!(record.price, 9.9);
        assert_eq!(record.stock, None);
    }

    #[test]
    fn first_failing_required_field_wins() {
        let mut row = widget_row();
        row.insert("product", "");
        row.insert("quantity", "zero");
        let failure = map_row(&row, &comma_config(), 7).unwrap_err();
        assert_eq!(failure.row, 7);
        assert_eq!(failure.field, CanonicalField::Product);
        assert_eq!(failure.value.as_deref(), Some(""));
    }

    #[test]
    fn unmapped_required_header_is_a_failure_not_a_panic() {
        let config = TransformConfig::new(ColumnMapping::identity().with(CanonicalField::Date, "  "));
        let failure = map_row(&widget_row(), &config, 2).unwrap_err();
        assert_eq!(failure.field, CanonicalField::Date);
        assert_eq!(failure.value, None);

        let config =
            TransformConfig::new(ColumnMapping::identity().with(CanonicalField::Price, "Preço"));
        let failure = map_row(&widget_row(), &config, 2).unwrap_err();
        assert_eq!(failure.field, CanonicalField::Price);
    }

    #[test]
    fn zero_price_passes_but_negative_fails() {
        let mut row = widget_row();
        row.insert("price", "0");
        assert!(map_row(&row, &comma_config(), 1).is_ok());
        row.insert("price", "-1");
        let failure = map_row(&row, &comma_config(), 1).unwrap_err();
        assert_eq!(failure.field, CanonicalField::Price);
    }

    #[test]
    fn optional_fields_are_best_effort() {
        let mut row = widget_row();
        row.insert("category", "  Tools ");
        row.insert("sku", "   ");
        row.insert("supplier", "ACME");
        row.insert("stock", "many");
        let record = map_row(&row, &comma_config(), 1).unwrap();
        assert_eq!(record.category.as_deref(), Some("Tools"));
        assert_eq!(record.sku, None);
        assert_eq!(record.supplier.as_deref(), Some("ACME"));
        assert_eq!(record.stock, None);

        row.insert("stock", "12,7");
        let record = map_row(&row, &comma_config(), 1).unwrap();
        assert_eq!(record.stock, Some(12));
    }

    #[test]
    fn missing_columns_lists_unknown_and_blank_headers() {
        let headers = vec!["date".to_string(), "product".to_string(), "qty".to_string()];
        let mut mapping = ColumnMapping::new("date", "product", "qty", "");
        mapping.sku = Some("code".to_string());
        let missing = mapping.missing_columns(&headers);
        assert_eq!(
            missing,
            vec![
                (CanonicalField::Price, String::new()),
                (CanonicalField::Sku, "code".to_string()),
            ]
        );
    }

    #[test]
    fn suggest_mapping_matches_localized_headers() {
        let headers: Vec<String> = ["Data", "Nome Produto", "QTD", "Preço", "Fornecedor", "Obs"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let mapping = suggest_mapping(&headers);
        assert_eq!(mapping.date, "Data");
        assert_eq!(mapping.product, "Nome Produto");
        assert_eq!(mapping.quantity, "QTD");
        assert_eq!(mapping.price, "Preço");
        assert_eq!(mapping.supplier.as_deref(), Some("Fornecedor"));
        assert_eq!(mapping.stock, None);
    }

    #[test]
    fn mapping_deserializes_with_optional_fields_absent() {
        let mapping: ColumnMapping =
            serde_yaml::from_str("date: Data\nproduct: Produto\nquantity: Qtd\nprice: Preço\n")
                .unwrap();
        assert_eq!(mapping.column(CanonicalField::Price), Some("Preço"));
        assert_eq!(mapping.column(CanonicalField::Stock), None);
    }
}
