//! Corpus statistics and data-quality warnings over validated rows.
//!
//! [`Tally`] is fed one accepted record at a time by the validation
//! orchestrator; [`Tally::finish`] turns the running totals into
//! [`ValidationStats`] and applies the [`Thresholds`] heuristics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::{config::Thresholds, record::CanonicalSalesRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    PriceZero,
    DateRange,
    ProductLowData,
    HighValues,
    LowData,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::PriceZero => "price_zero",
            WarningKind::DateRange => "date_range",
            WarningKind::ProductLowData => "product_low_data",
            WarningKind::HighValues => "high_values",
            WarningKind::LowData => "low_data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub count: usize,
    pub message: String,
    pub severity: &'static str,
}

impl ValidationWarning {
    fn new(kind: WarningKind, count: usize, message: String) -> Self {
        Self {
            kind,
            count,
            message,
            severity: "warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
    /// Inclusive calendar days from `min` to `max`; zero when there are no dates.
    pub days: u32,
}

impl DateRange {
    pub fn empty(today: NaiveDate) -> Self {
        Self {
            min: today,
            max: today,
            days: 0,
        }
    }

    pub fn spanning(min: NaiveDate, max: NaiveDate) -> Self {
        let span = (max - min).num_days().max(0);
        Self {
            min,
            max,
            days: u32::try_from(span + 1).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Averages {
    pub quantity: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationStats {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub unique_products: usize,
    pub date_range: DateRange,
    pub averages: Averages,
}

impl ValidationStats {
    pub fn zeroed(today: NaiveDate) -> Self {
        Self {
            total_rows: 0,
            valid_rows: 0,
            invalid_rows: 0,
            unique_products: 0,
            date_range: DateRange::empty(today),
            averages: Averages::default(),
        }
    }
}

/// Running totals over the rows that passed every row check.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    rows_per_product: BTreeMap<String, usize>,
    dates: Vec<NaiveDate>,
    quantities: Vec<f64>,
    prices: Vec<f64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, record: &CanonicalSalesRecord) {
        *self
            .rows_per_product
            .entry(record.product.clone())
            .or_insert(0) += 1;
        self.dates.push(record.date);
        self.quantities.push(record.quantity);
        self.prices.push(record.price);
    }

    pub fn rows(&self) -> usize {
        self.dates.len()
    }

    pub fn unique_products(&self) -> usize {
        self.rows_per_product.len()
    }

    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        match self.dates.iter().copied().minmax() {
            MinMaxResult::NoElements => DateRange::empty(today),
            MinMaxResult::OneElement(only) => DateRange::spanning(only, only),
            MinMaxResult::MinMax(min, max) => DateRange::spanning(min, max),
        }
    }

    pub fn averages(&self) -> Averages {
        Averages {
            quantity: mean(&self.quantities),
            price: mean(&self.prices),
        }
    }

    /// Build corpus statistics and the warnings they trigger.
    pub fn finish(
        &self,
        total_rows: usize,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> (ValidationStats, Vec<ValidationWarning>) {
        let stats = ValidationStats {
            total_rows,
            valid_rows: self.rows(),
            invalid_rows: total_rows.saturating_sub(self.rows()),
            unique_products: self.unique_products(),
            date_range: self.date_range(today),
            averages: self.averages(),
        };
        let warnings = self.warnings(&stats, thresholds);
        (stats, warnings)
    }

    fn warnings(&self, stats: &ValidationStats, thresholds: &Thresholds) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let zero_priced = self.prices.iter().filter(|p| **p == 0.0).count();
        if zero_priced > 0 {
            warnings.push(ValidationWarning::new(
                WarningKind::PriceZero,
                zero_priced,
                format!(
                    "{zero_priced} row(s) have a zero price. Revenue analyses may be affected."
                ),
            ));
        }

        let days = stats.date_range.days;
        if days < thresholds.min_history_days {
            warnings.push(ValidationWarning::new(
                WarningKind::DateRange,
                1,
                format!(
                    "Only {days} day(s) of history. At least {} days are recommended for reliable forecasts.",
                    thresholds.min_history_days
                ),
            ));
        }

        let thin_products = self
            .rows_per_product
            .values()
            .filter(|count| **count < thresholds.min_rows_per_product)
            .count();
        if thin_products > 0 {
            warnings.push(ValidationWarning::new(
                WarningKind::ProductLowData,
                thin_products,
                format!(
                    "{thin_products} product(s) have fewer than {} data points. Forecasts for them may be less accurate.",
                    thresholds.min_rows_per_product
                ),
            ));
        }

        let multiplier = thresholds.high_value_multiplier;
        let averages = stats.averages;
        if averages.quantity > 0.0 {
            let high = count_above(&self.quantities, averages.quantity * multiplier);
            if high > 0 {
                warnings.push(ValidationWarning::new(
                    WarningKind::HighValues,
                    high,
                    format!(
                        "{high} row(s) have very high quantities (>{multiplier}x the average of {:.1}). Check for typing mistakes.",
                        averages.quantity
                    ),
                ));
            }
        }
        if averages.price > 0.0 {
            let high = count_above(&self.prices, averages.price * multiplier);
            if high > 0 {
                warnings.push(ValidationWarning::new(
                    WarningKind::HighValues,
                    high,
                    format!(
                        "{high} row(s) have very high prices (>{multiplier}x the average of {:.2}). Check for typing mistakes.",
                        averages.price
                    ),
                ));
            }
        }

        let unique = stats.unique_products;
        if unique < thresholds.min_unique_products {
            warnings.push(ValidationWarning::new(
                WarningKind::LowData,
                unique,
                format!(
                    "Only {unique} unique product(s) found. Data for several products gives a more complete analysis."
                ),
            ));
        }

        warnings
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn count_above(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|v| **v > threshold).count()
}
