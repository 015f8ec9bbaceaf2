use crate::pricing::ValorizedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One payout line: what a depositor is owed for the reported window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRow {
    pub tax_id: u64,
    pub name: String,
    pub total_kg: i64,
    pub total_value: i64,
}

/// Per-depositor payout totals derived from a valorized batch, ordered by
/// tax ID. Records without a tax ID cannot be attributed and are excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayoutSummary {
    pub rows: Vec<PayoutRow>,
}

impl PayoutSummary {
    pub fn from_records(records: &[ValorizedRecord]) -> Self {
        let mut by_depositor: BTreeMap<u64, PayoutRow> = BTreeMap::new();

        for valorized in records {
            let Some(tax_id) = valorized.record.tax_id else {
                continue;
            };

            let row = by_depositor.entry(tax_id).or_insert_with(|| PayoutRow {
                tax_id,
                name: valorized.record.display_name(),
                total_kg: 0,
                total_value: 0,
            });

            if row.name.is_empty() {
                row.name = valorized.record.display_name();
            }
            row.total_kg += valorized.record.weight_kg.unwrap_or(0);
            row.total_value += valorized.value;
        }

        Self {
            rows: by_depositor.into_values().collect(),
        }
    }

    pub fn total_value(&self) -> i64 {
        self.rows.iter().map(|row| row.total_value).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("CUIT,Nombre,KG,KG Valorizado\n");

        for row in &self.rows {
            output.push_str(&format!(
                "{},{},{},{}\n",
                row.tax_id, row.name, row.total_kg, row.total_value
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("| CUIT | Nombre | KG | KG Valorizado |\n");
        output.push_str("|---|---|---|---|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.tax_id, row.name, row.total_kg, row.total_value
            ));
        }
        output.push_str(&format!("\n**Total:** {}\n", self.total_value()));

        output
    }
}
