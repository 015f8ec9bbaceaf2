use crate::coerce::normalize_text;
use crate::schema::{IntakeRecord, ValorizerConfig};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-material unit prices, keyed by normalized category.
///
/// Keys are normalized on insert with the same transform applied to record
/// materials, so a lookup never misses on case or stray whitespace. Prices
/// may be fractional in the source table; truncation happens at lookup time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    entries: BTreeMap<String, f64>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (material, price) in entries {
            table.insert(material.as_ref(), price);
        }
        table
    }

    pub fn insert(&mut self, material: &str, price_per_kg: f64) {
        self.entries.insert(normalize_text(material), price_per_kg);
    }

    pub fn get(&self, material: &str) -> Option<f64> {
        self.entries.get(material).copied()
    }

    pub fn contains(&self, material: &str) -> bool {
        self.entries.contains_key(material)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which price-table row a quote resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceResolution {
    Base,
    Bonus,
    /// No row matched, with or without the bonus suffix. The unit price is 0.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub unit_price: i64,
    pub resolution: PriceResolution,
}

/// Non-fatal events surfaced alongside a valorized batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValorizationWarning {
    UnknownMaterial { material: String, row: usize },
}

impl fmt::Display for ValorizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValorizationWarning::UnknownMaterial { material, row } => {
                write!(f, "Unknown material '{}' on row {}", material, row)
            }
        }
    }
}

/// An intake record with its resolved unit price and payable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValorizedRecord {
    pub record: IntakeRecord,
    pub unit_price: i64,
    /// `unit_price * weight_kg`; 0 when the weight failed coercion, with the
    /// missing marker still visible on the embedded record.
    pub value: i64,
    pub resolution: PriceResolution,
}

/// Output of [`Valorizer::valorize`]: every input record priced, plus the
/// warnings gathered along the way. Missing price data never aborts a batch.
#[derive(Debug, Clone, Default)]
pub struct ValorizedBatch {
    pub records: Vec<ValorizedRecord>,
    pub warnings: Vec<ValorizationWarning>,
}

pub struct Valorizer {
    config: ValorizerConfig,
}

impl Valorizer {
    pub fn new(config: ValorizerConfig) -> Self {
        Self { config }
    }

    /// Resolves the unit price for one record.
    ///
    /// Bonus eligibility is an explicit presence check on the monthly totals:
    /// a depositor absent from the map is simply not eligible, the same
    /// outcome as one below the threshold. When eligible and the table has a
    /// `material + suffix` row, that row's price wins; otherwise the base row
    /// is used. Fractional prices are truncated toward zero. A material with
    /// no row at all quotes 0 so the rest of the batch keeps going.
    pub fn price_for(
        &self,
        record: &IntakeRecord,
        price_table: &PriceTable,
        monthly_totals: &BTreeMap<u64, i64>,
    ) -> PriceQuote {
        let eligible = record
            .tax_id
            .and_then(|tax_id| monthly_totals.get(&tax_id))
            .map(|total| *total >= self.config.bonus_threshold_kg)
            .unwrap_or(false);

        let bonus_key = format!("{}{}", record.material, self.config.bonus_suffix);
        if eligible && price_table.contains(&bonus_key) {
            let price = price_table.get(&bonus_key).unwrap_or(0.0);
            return PriceQuote {
                unit_price: price.trunc() as i64,
                resolution: PriceResolution::Bonus,
            };
        }

        match price_table.get(&record.material) {
            Some(price) => PriceQuote {
                unit_price: price.trunc() as i64,
                resolution: PriceResolution::Base,
            },
            None => PriceQuote {
                unit_price: 0,
                resolution: PriceResolution::Unknown,
            },
        }
    }

    /// Prices a slice of records and computes each payable value.
    pub fn valorize(
        &self,
        records: &[IntakeRecord],
        price_table: &PriceTable,
        monthly_totals: &BTreeMap<u64, i64>,
    ) -> ValorizedBatch {
        let mut batch = ValorizedBatch::default();

        for (row, record) in records.iter().enumerate() {
            let quote = self.price_for(record, price_table, monthly_totals);

            if quote.resolution == PriceResolution::Unknown {
                warn!("Unknown material '{}' on row {}", record.material, row);
                batch.warnings.push(ValorizationWarning::UnknownMaterial {
                    material: record.material.clone(),
                    row,
                });
            }

            let value = quote.unit_price * record.weight_kg.unwrap_or(0);
            batch.records.push(ValorizedRecord {
                record: record.clone(),
                unit_price: quote.unit_price,
                value,
                resolution: quote.resolution,
            });
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(tax_id: Option<u64>, material: &str, weight: Option<i64>) -> IntakeRecord {
        IntakeRecord {
            date: NaiveDate::from_ymd_opt(2021, 3, 5),
            origin: String::new(),
            file_number: String::new(),
            last_name: String::new(),
            first_name: String::new(),
            nickname: String::new(),
            national_id: String::new(),
            tax_id,
            payment_frequency: String::new(),
            payment_method: String::new(),
            material: normalize_text(material),
            weight_kg: weight,
            notes: String::new(),
        }
    }

    fn table() -> PriceTable {
        PriceTable::from_entries([("Plastico", 10.0), ("Plastico_Bono", 15.0), ("Carton", 5.0)])
    }

    #[test]
    fn test_price_table_normalizes_keys() {
        let mut prices = PriceTable::new();
        prices.insert("  PLASTICO duro ", 12.0);
        assert_eq!(prices.get("Plastico Duro"), Some(12.0));
        assert!(!prices.contains("PLASTICO duro"));
    }

    #[test]
    fn test_bonus_at_threshold_boundary() {
        let valorizer = Valorizer::new(ValorizerConfig::default());
        let prices = table();
        let record = record(Some(1), "Plastico", Some(50));

        let at_threshold = BTreeMap::from([(1u64, 1000i64)]);
        let quote = valorizer.price_for(&record, &prices, &at_threshold);
        assert_eq!(quote.resolution, PriceResolution::Bonus);
        assert_eq!(quote.unit_price, 15);

        let below_threshold = BTreeMap::from([(1u64, 999i64)]);
        let quote = valorizer.price_for(&record, &prices, &below_threshold);
        assert_eq!(quote.resolution, PriceResolution::Base);
        assert_eq!(quote.unit_price, 10);
    }

    #[test]
    fn test_absent_depositor_is_not_eligible() {
        let valorizer = Valorizer::new(ValorizerConfig::default());
        let prices = table();

        let quote = valorizer.price_for(&record(Some(7), "Plastico", Some(50)), &prices, &BTreeMap::new());
        assert_eq!(quote.resolution, PriceResolution::Base);

        // No tax ID at all: same non-bonus outcome.
        let quote = valorizer.price_for(&record(None, "Plastico", Some(50)), &prices, &BTreeMap::new());
        assert_eq!(quote.resolution, PriceResolution::Base);
    }

    #[test]
    fn test_eligible_without_bonus_row_uses_base_price() {
        let valorizer = Valorizer::new(ValorizerConfig::default());
        let prices = table();
        let totals = BTreeMap::from([(1u64, 5000i64)]);

        let quote = valorizer.price_for(&record(Some(1), "Carton", Some(50)), &prices, &totals);
        assert_eq!(quote.resolution, PriceResolution::Base);
        assert_eq!(quote.unit_price, 5);
    }

    #[test]
    fn test_fractional_price_truncates_toward_zero() {
        let valorizer = Valorizer::new(ValorizerConfig::default());
        let prices = PriceTable::from_entries([("Vidrio", 7.9)]);

        let quote = valorizer.price_for(&record(Some(1), "Vidrio", Some(10)), &prices, &BTreeMap::new());
        assert_eq!(quote.unit_price, 7);
    }

    #[test]
    fn test_mixed_case_material_resolves_bonus_scenario() {
        // "PLASTICO " with monthly total 1200 and weight 50 must resolve to
        // the bonus price 15 and a value of 750.
        let valorizer = Valorizer::new(ValorizerConfig::default());
        let prices = table();
        let totals = BTreeMap::from([(1u64, 1200i64)]);
        let record = record(Some(1), "PLASTICO ", Some(50));
        assert_eq!(record.material, "Plastico");

        let batch = valorizer.valorize(std::slice::from_ref(&record), &prices, &totals);
        assert!(batch.warnings.is_empty());
        assert_eq!(batch.records[0].unit_price, 15);
        assert_eq!(batch.records[0].value, 750);
        assert_eq!(batch.records[0].resolution, PriceResolution::Bonus);
    }

    #[test]
    fn test_unknown_material_warns_and_continues() {
        let valorizer = Valorizer::new(ValorizerConfig::default());
        let prices = table();
        let records = vec![
            record(Some(1), "Vidrio", Some(30)),
            record(Some(1), "Carton", Some(10)),
        ];

        let batch = valorizer.valorize(&records, &prices, &BTreeMap::new());

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].unit_price, 0);
        assert_eq!(batch.records[0].value, 0);
        assert_eq!(batch.records[0].resolution, PriceResolution::Unknown);
        assert_eq!(batch.records[1].value, 50);

        assert_eq!(
            batch.warnings,
            vec![ValorizationWarning::UnknownMaterial {
                material: "Vidrio".to_string(),
                row: 0,
            }]
        );
    }

    #[test]
    fn test_missing_weight_valorizes_to_zero_but_stays_marked() {
        let valorizer = Valorizer::new(ValorizerConfig::default());
        let prices = table();

        let batch = valorizer.valorize(&[record(Some(1), "Carton", None)], &prices, &BTreeMap::new());
        assert_eq!(batch.records[0].value, 0);
        assert_eq!(batch.records[0].unit_price, 5);
        assert!(batch.records[0].record.weight_kg.is_none());
    }

    #[test]
    fn test_custom_suffix_and_threshold() {
        let config = ValorizerConfig {
            bonus_threshold_kg: 500,
            bonus_suffix: "_Plus".to_string(),
        };
        let valorizer = Valorizer::new(config);
        let prices = PriceTable::from_entries([("Plastico", 10.0), ("Plastico_Plus", 14.0)]);
        let totals = BTreeMap::from([(1u64, 500i64)]);

        let quote = valorizer.price_for(&record(Some(1), "Plastico", Some(10)), &prices, &totals);
        assert_eq!(quote.unit_price, 14);
        assert_eq!(quote.resolution, PriceResolution::Bonus);
    }
}
