use crate::coerce::{coerce_column, SemanticType};
use crate::period::DateRange;
use crate::schema::{IntakeRecord, RawRecord};
use serde::{Deserialize, Serialize};

/// The normalized dataset, produced once per load and immutable thereafter.
///
/// The reference implementation kept a process-wide cached copy of the loaded
/// sheet; here the snapshot is an explicit handle the caller threads through
/// each pipeline call. Range filters hand out clones, so the canonical
/// records are never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeDataset {
    records: Vec<IntakeRecord>,
}

impl IntakeDataset {
    /// Normalizes raw rows column by column through the coercion engine.
    ///
    /// Date, tax ID, weight and material get canonical types; a cell that
    /// fails coercion leaves a `None` on its record instead of dropping the
    /// row. All other columns pass through untouched.
    pub fn from_raw(rows: &[RawRecord]) -> Self {
        let date_cells: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        let tax_id_cells: Vec<&str> = rows.iter().map(|r| r.tax_id.as_str()).collect();
        let weight_cells: Vec<&str> = rows.iter().map(|r| r.weight_kg.as_str()).collect();
        let material_cells: Vec<&str> = rows.iter().map(|r| r.material.as_str()).collect();

        let dates = coerce_column(&date_cells, SemanticType::Date);
        let tax_ids = coerce_column(&tax_id_cells, SemanticType::Integer);
        let weights = coerce_column(&weight_cells, SemanticType::Integer);
        let materials = coerce_column(&material_cells, SemanticType::Text);

        let records = rows
            .iter()
            .enumerate()
            .map(|(i, row)| IntakeRecord {
                date: dates[i].as_date(),
                origin: row.origin.clone(),
                file_number: row.file_number.clone(),
                last_name: row.last_name.clone(),
                first_name: row.first_name.clone(),
                nickname: row.nickname.clone(),
                national_id: row.national_id.clone(),
                tax_id: tax_ids[i].as_integer().and_then(|v| u64::try_from(v).ok()),
                payment_frequency: row.payment_frequency.clone(),
                payment_method: row.payment_method.clone(),
                material: materials[i].as_text().unwrap_or_default().to_string(),
                weight_kg: weights[i].as_integer(),
                notes: row.notes.clone(),
            })
            .collect();

        Self { records }
    }

    pub fn records(&self) -> &[IntakeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copies of the records whose date falls within `range` (inclusive).
    /// Records whose date failed coercion fall outside every range.
    pub fn filter_range(&self, range: &DateRange) -> Vec<IntakeRecord> {
        self.records
            .iter()
            .filter(|record| record.date.map(|d| range.contains(d)).unwrap_or(false))
            .cloned()
            .collect()
    }
}
