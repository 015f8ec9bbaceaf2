//! # Intake Valorizer
//!
//! A library for normalizing raw material-intake spreadsheets and valorizing
//! deliveries against a tiered price table.
//!
//! ## Core Concepts
//!
//! - **Intake Record**: one material delivery — date, depositor identity
//!   (CUIT), material category, weight in kilograms
//! - **Coercion**: raw spreadsheet cells become typed values; a cell that
//!   cannot be parsed is marked missing instead of dropping the row
//! - **Monthly Total**: summed weight per depositor over one calendar month,
//!   recomputed on demand to decide bonus eligibility
//! - **Bonus Tier**: an alternate price-table row (`material + "_Bono"`)
//!   applied when a depositor's monthly total reaches the threshold
//! - **Valorization**: weight × resolved unit price, aggregated per
//!   depositor into payout totals for a report window
//!
//! ## Example
//!
//! ```rust,ignore
//! use intake_valorizer::*;
//! use chrono::NaiveDate;
//!
//! let rows = ingestion::load_intake_file("cargas.csv".as_ref())?;
//! let prices = ingestion::load_price_file("precios.csv".as_ref())?;
//!
//! let dataset = IntakeDataset::from_raw(&rows);
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
//! )?;
//!
//! let report = run_valorization(
//!     &dataset,
//!     &prices,
//!     &range,
//!     "2021-03".parse()?,
//!     &ValorizerConfig::default(),
//! )?;
//!
//! println!("{}", report.payout.to_markdown());
//! ```

pub mod coerce;
pub mod dataset;
pub mod error;
pub mod ingestion;
pub mod period;
pub mod pricing;
pub mod report;
pub mod schema;

pub use coerce::{coerce_column, normalize_text, CellValue, SemanticType};
pub use dataset::IntakeDataset;
pub use error::{Result, ValorizationError};
pub use period::{aggregate_period, DateRange, Period};
pub use pricing::{
    PriceQuote, PriceResolution, PriceTable, ValorizationWarning, ValorizedBatch, ValorizedRecord,
    Valorizer,
};
pub use report::{PayoutRow, PayoutSummary};
pub use schema::{IntakeRecord, RawRecord, ValorizerConfig};

use log::{debug, info};

/// Everything a report run produces: each in-window record priced and
/// valorized, the per-depositor payout totals, and any non-fatal warnings.
#[derive(Debug, Clone)]
pub struct ValorizationReport {
    pub records: Vec<ValorizedRecord>,
    pub payout: PayoutSummary,
    pub warnings: Vec<ValorizationWarning>,
}

pub struct ValorizationProcessor;

impl ValorizationProcessor {
    /// Runs the full pipeline over a normalized snapshot.
    ///
    /// Monthly totals for bonus eligibility are computed over the whole
    /// snapshot, not the report window — the two windows may differ, and a
    /// report cut mid-month must not strip a depositor of an earned bonus.
    pub fn run(
        dataset: &IntakeDataset,
        price_table: &PriceTable,
        range: &DateRange,
        bonus_period: Period,
        config: &ValorizerConfig,
    ) -> Result<ValorizationReport> {
        validate_config(config)?;

        info!(
            "Valorizing {} records for {} .. {}",
            dataset.len(),
            range.start(),
            range.end()
        );

        let window = dataset.filter_range(range);
        let monthly_totals = aggregate_period(dataset.records(), bonus_period);
        debug!(
            "{} records in window, {} depositors with {}-{:02} totals",
            window.len(),
            monthly_totals.len(),
            bonus_period.year,
            bonus_period.month
        );

        let valorizer = Valorizer::new(config.clone());
        let batch = valorizer.valorize(&window, price_table, &monthly_totals);
        let payout = PayoutSummary::from_records(&batch.records);

        Ok(ValorizationReport {
            records: batch.records,
            payout,
            warnings: batch.warnings,
        })
    }
}

/// Convenience wrapper over [`ValorizationProcessor::run`].
pub fn run_valorization(
    dataset: &IntakeDataset,
    price_table: &PriceTable,
    range: &DateRange,
    bonus_period: Period,
    config: &ValorizerConfig,
) -> Result<ValorizationReport> {
    ValorizationProcessor::run(dataset, price_table, range, bonus_period, config)
}

fn validate_config(config: &ValorizerConfig) -> Result<()> {
    if config.bonus_threshold_kg < 0 {
        return Err(ValorizationError::InvalidThreshold(
            config.bonus_threshold_kg,
        ));
    }
    Ok(())
}
